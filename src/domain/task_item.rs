use crate::domain;
use crate::domain::task_item::driven_ports::{TaskItemReader, TaskItemWriter};
use crate::domain::task_item::driving_ports::TaskItemError;
use crate::external_connections::{ExternalConnectivity, Transactable};
use anyhow::Context;
use tracing::info;
use uuid::Uuid;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

/// A task item to create. The id is generated when it is missing or nil.
#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewTaskItem {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: String,
}

/// Replacement content for an existing task item. When [UpdateTaskItem::id] is set it must match
/// the id of the task item being replaced.
#[cfg_attr(test, derive(Clone, Debug))]
pub struct UpdateTaskItem {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: String,
}

pub mod driven_ports {
    use super::*;

    pub trait TaskItemReader {
        async fn find_by_id(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TaskItem>, anyhow::Error>;
        async fn select_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TaskItem>, anyhow::Error>;
    }

    /// Stages writes on whatever connectivity it is handed. Every operation returns the number
    /// of rows it touched.
    pub trait TaskItemWriter {
        async fn add(
            &self,
            task_item: &TaskItem,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Adds every given task item, used to seed a store
        async fn add_range(
            &self,
            task_items: &[TaskItem],
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Overwrites every field of the stored task item with the same id. Fails if there is none.
        async fn update(
            &self,
            task_item: &TaskItem,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Removes the task item if it exists, does nothing otherwise
        async fn remove(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        async fn remove_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TaskItemError {
        #[error("task item {0} does not exist")]
        NotFound(Uuid),
        #[error("task item {0} already exists")]
        AlreadyExists(Uuid),
        #[error("route id {route_id} does not match task item id {body_id}")]
        IdMismatch { route_id: Uuid, body_id: Uuid },
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TaskItemPort {
        async fn task_item_by_id(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskItemReader,
        ) -> Result<Option<TaskItem>, anyhow::Error>;
        async fn all_task_items(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskItemReader,
        ) -> Result<Vec<TaskItem>, anyhow::Error>;
        async fn create_task_item(
            &self,
            new_task_item: &NewTaskItem,
            ext_cxn: &mut impl Transactable,
            task_read: &impl driven_ports::TaskItemReader,
            task_write: &impl driven_ports::TaskItemWriter,
        ) -> Result<TaskItem, TaskItemError>;
        async fn update_task_item(
            &self,
            id: Uuid,
            update: &UpdateTaskItem,
            ext_cxn: &mut impl Transactable,
            task_read: &impl driven_ports::TaskItemReader,
            task_write: &impl driven_ports::TaskItemWriter,
        ) -> Result<TaskItem, TaskItemError>;
        async fn delete_task_item(
            &self,
            id: Uuid,
            ext_cxn: &mut impl Transactable,
            task_read: &impl driven_ports::TaskItemReader,
            task_write: &impl driven_ports::TaskItemWriter,
        ) -> Result<(), TaskItemError>;
    }
}

pub struct TaskItemService;

impl driving_ports::TaskItemPort for TaskItemService {
    async fn task_item_by_id(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskItemReader,
    ) -> Result<Option<TaskItem>, anyhow::Error> {
        task_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("fetching a task item by id")
    }

    async fn all_task_items(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskItemReader,
    ) -> Result<Vec<TaskItem>, anyhow::Error> {
        task_read
            .select_all(&mut *ext_cxn)
            .await
            .context("fetching all task items")
    }

    async fn create_task_item(
        &self,
        new_task_item: &NewTaskItem,
        ext_cxn: &mut impl Transactable,
        task_read: &impl TaskItemReader,
        task_write: &impl TaskItemWriter,
    ) -> Result<TaskItem, TaskItemError> {
        let id = domain::assign_id(new_task_item.id);
        let existing = task_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("checking for an existing task item")?;
        if existing.is_some() {
            return Err(TaskItemError::AlreadyExists(id));
        }

        let task_item = TaskItem {
            id,
            title: new_task_item.title.clone(),
            description: new_task_item.description.clone(),
        };
        let mut txn = ext_cxn.start_transaction().await?;
        let rows_staged = task_write
            .add(&task_item, &mut txn)
            .await
            .context("adding a task item")?;
        domain::save_changes(txn, rows_staged).await?;
        info!(%id, "Created task item");

        Ok(task_item)
    }

    async fn update_task_item(
        &self,
        id: Uuid,
        update: &UpdateTaskItem,
        ext_cxn: &mut impl Transactable,
        task_read: &impl TaskItemReader,
        task_write: &impl TaskItemWriter,
    ) -> Result<TaskItem, TaskItemError> {
        if let Some(body_id) = update.id.filter(|body_id| !body_id.is_nil()) {
            if body_id != id {
                return Err(TaskItemError::IdMismatch {
                    route_id: id,
                    body_id,
                });
            }
        }

        let existing = task_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("looking up the task item to update")?;
        if existing.is_none() {
            return Err(TaskItemError::NotFound(id));
        }

        let task_item = TaskItem {
            id,
            title: update.title.clone(),
            description: update.description.clone(),
        };
        let mut txn = ext_cxn.start_transaction().await?;
        let rows_staged = task_write
            .update(&task_item, &mut txn)
            .await
            .context("updating a task item")?;
        domain::save_changes(txn, rows_staged).await?;

        Ok(task_item)
    }

    async fn delete_task_item(
        &self,
        id: Uuid,
        ext_cxn: &mut impl Transactable,
        task_read: &impl TaskItemReader,
        task_write: &impl TaskItemWriter,
    ) -> Result<(), TaskItemError> {
        let existing = task_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("looking up the task item to delete")?;
        if existing.is_none() {
            return Err(TaskItemError::NotFound(id));
        }

        let mut txn = ext_cxn.start_transaction().await?;
        let rows_staged = task_write
            .remove(id, &mut txn)
            .await
            .context("removing a task item")?;
        // Another request may have removed it in the meantime
        if !domain::save_changes(txn, rows_staged).await? {
            return Err(TaskItemError::NotFound(id));
        }

        Ok(())
    }
}
