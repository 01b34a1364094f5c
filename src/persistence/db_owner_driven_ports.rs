use crate::domain::owner::driven_ports::{OwnerReader, OwnerWriter};
use crate::domain::owner::{Address, Owner};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::{AnyConnection, FromRow};
use uuid::Uuid;

const SELECT_OWNERS: &str = "SELECT o.id, o.first_name, o.last_name, o.email, o.phone, \
    a.street, a.number, a.zip, a.city \
    FROM owners o LEFT JOIN owner_addresses a ON a.owner_id = o.id";

/// An owner joined with its address. The address columns are all NULL when there is no address.
#[derive(FromRow)]
struct OwnerRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    street: Option<String>,
    number: Option<String>,
    zip: Option<String>,
    city: Option<String>,
}

impl TryFrom<OwnerRow> for Owner {
    type Error = anyhow::Error;

    fn try_from(row: OwnerRow) -> Result<Self, Self::Error> {
        let address = match (row.street, row.number, row.zip, row.city) {
            (Some(street), Some(number), Some(zip), Some(city)) => Some(Address {
                street,
                number,
                zip,
                city,
            }),
            _ => None,
        };

        Ok(Owner {
            id: super::parse_id(&row.id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address,
        })
    }
}

pub struct DbReadOwners;

impl OwnerReader for DbReadOwners {
    async fn find_by_id(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Owner>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let row = sqlx::query_as::<_, OwnerRow>(&format!("{SELECT_OWNERS} WHERE o.id = $1"))
            .bind(id.to_string())
            .fetch_optional(cxn_handle.borrow_connection())
            .await
            .context("fetching an owner by id")?;

        row.map(Owner::try_from).transpose()
    }

    async fn select_all(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Owner>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let rows = sqlx::query_as::<_, OwnerRow>(&format!("{SELECT_OWNERS} ORDER BY o.id"))
            .fetch_all(cxn_handle.borrow_connection())
            .await
            .context("fetching all owners")?;

        rows.into_iter().map(Owner::try_from).collect()
    }
}

async fn insert_address(
    owner_id: Uuid,
    address: &Address,
    connection: &mut AnyConnection,
) -> Result<(), anyhow::Error> {
    sqlx::query(
        "INSERT INTO owner_addresses (owner_id, street, number, zip, city) \
        VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(owner_id.to_string())
    .bind(address.street.as_str())
    .bind(address.number.as_str())
    .bind(address.zip.as_str())
    .bind(address.city.as_str())
    .execute(connection)
    .await
    .context("inserting an owner address")?;

    Ok(())
}

async fn delete_address(
    owner_id: Uuid,
    connection: &mut AnyConnection,
) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM owner_addresses WHERE owner_id = $1")
        .bind(owner_id.to_string())
        .execute(connection)
        .await
        .context("deleting an owner address")?;

    Ok(())
}

/// Inserts the owner row followed by its address row, if any
async fn insert_owner(
    owner: &Owner,
    connection: &mut AnyConnection,
) -> Result<u64, anyhow::Error> {
    let result = sqlx::query(
        "INSERT INTO owners (id, first_name, last_name, email, phone) \
        VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(owner.id.to_string())
    .bind(owner.first_name.as_str())
    .bind(owner.last_name.as_str())
    .bind(owner.email.as_str())
    .bind(owner.phone.clone())
    .execute(&mut *connection)
    .await
    .context("inserting an owner")?;

    if let Some(address) = &owner.address {
        insert_address(owner.id, address, connection).await?;
    }

    Ok(result.rows_affected())
}

pub struct DbWriteOwners;

impl OwnerWriter for DbWriteOwners {
    async fn add(
        &self,
        owner: &Owner,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        insert_owner(owner, cxn_handle.borrow_connection()).await
    }

    async fn add_range(
        &self,
        owners: &[Owner],
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let mut rows_affected = 0;
        for owner in owners {
            rows_affected += insert_owner(owner, &mut *connection).await?;
        }

        Ok(rows_affected)
    }

    async fn update(
        &self,
        owner: &Owner,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let result = sqlx::query(
            "UPDATE owners SET first_name = $1, last_name = $2, email = $3, phone = $4 \
            WHERE id = $5",
        )
        .bind(owner.first_name.as_str())
        .bind(owner.last_name.as_str())
        .bind(owner.email.as_str())
        .bind(owner.phone.clone())
        .bind(owner.id.to_string())
        .execute(&mut *connection)
        .await
        .context("updating an owner")?;
        if result.rows_affected() == 0 {
            anyhow::bail!("Update, owner {} not found", owner.id);
        }

        delete_address(owner.id, &mut *connection).await?;
        if let Some(address) = &owner.address {
            insert_address(owner.id, address, connection).await?;
        }

        Ok(result.rows_affected())
    }

    async fn remove(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        delete_address(id, &mut *connection).await?;
        let result = sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id.to_string())
            .execute(connection)
            .await
            .context("deleting an owner")?;

        Ok(result.rows_affected())
    }

    async fn remove_all(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        sqlx::query("DELETE FROM owner_addresses")
            .execute(&mut *connection)
            .await
            .context("deleting all owner addresses")?;
        let result = sqlx::query("DELETE FROM owners")
            .execute(connection)
            .await
            .context("deleting all owners")?;

        Ok(result.rows_affected())
    }
}
