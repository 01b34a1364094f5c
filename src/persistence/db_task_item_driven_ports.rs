use crate::domain::task_item::TaskItem;
use crate::domain::task_item::driven_ports::{TaskItemReader, TaskItemWriter};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::{AnyConnection, FromRow};
use uuid::Uuid;

#[derive(FromRow)]
struct TaskItemRow {
    id: String,
    title: String,
    description: String,
}

impl TryFrom<TaskItemRow> for TaskItem {
    type Error = anyhow::Error;

    fn try_from(row: TaskItemRow) -> Result<Self, Self::Error> {
        Ok(TaskItem {
            id: super::parse_id(&row.id)?,
            title: row.title,
            description: row.description,
        })
    }
}

pub struct DbReadTaskItems;

impl TaskItemReader for DbReadTaskItems {
    async fn find_by_id(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TaskItem>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let row = sqlx::query_as::<_, TaskItemRow>(
            "SELECT id, title, description FROM task_items WHERE id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("fetching a task item by id")?;

        row.map(TaskItem::try_from).transpose()
    }

    async fn select_all(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TaskItem>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let rows = sqlx::query_as::<_, TaskItemRow>(
            "SELECT id, title, description FROM task_items ORDER BY id",
        )
        .fetch_all(cxn_handle.borrow_connection())
        .await
        .context("fetching all task items")?;

        rows.into_iter().map(TaskItem::try_from).collect()
    }
}

async fn insert_task_item(
    task_item: &TaskItem,
    connection: &mut AnyConnection,
) -> Result<u64, anyhow::Error> {
    let result =
        sqlx::query("INSERT INTO task_items (id, title, description) VALUES ($1, $2, $3)")
            .bind(task_item.id.to_string())
            .bind(task_item.title.as_str())
            .bind(task_item.description.as_str())
            .execute(connection)
            .await
            .context("inserting a task item")?;

    Ok(result.rows_affected())
}

pub struct DbWriteTaskItems;

impl TaskItemWriter for DbWriteTaskItems {
    async fn add(
        &self,
        task_item: &TaskItem,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        insert_task_item(task_item, cxn_handle.borrow_connection()).await
    }

    async fn add_range(
        &self,
        task_items: &[TaskItem],
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let mut rows_affected = 0;
        for task_item in task_items {
            rows_affected += insert_task_item(task_item, &mut *connection).await?;
        }

        Ok(rows_affected)
    }

    async fn update(
        &self,
        task_item: &TaskItem,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let result = sqlx::query("UPDATE task_items SET title = $1, description = $2 WHERE id = $3")
            .bind(task_item.title.as_str())
            .bind(task_item.description.as_str())
            .bind(task_item.id.to_string())
            .execute(cxn_handle.borrow_connection())
            .await
            .context("updating a task item")?;
        if result.rows_affected() == 0 {
            anyhow::bail!("Update, task item {} not found", task_item.id);
        }

        Ok(result.rows_affected())
    }

    async fn remove(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let result = sqlx::query("DELETE FROM task_items WHERE id = $1")
            .bind(id.to_string())
            .execute(cxn_handle.borrow_connection())
            .await
            .context("deleting a task item")?;

        Ok(result.rows_affected())
    }

    async fn remove_all(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let result = sqlx::query("DELETE FROM task_items")
            .execute(cxn_handle.borrow_connection())
            .await
            .context("deleting all task items")?;

        Ok(result.rows_affected())
    }
}
