pub mod db_owner_driven_ports;
pub mod db_task_item_driven_ports;

use crate::external_connections;
use crate::external_connections::ConnectionHandle;
use anyhow::{Context, anyhow};
use sqlx::pool::PoolConnection;
use sqlx::{Acquire, Any, AnyConnection, AnyPool, Transaction};
use std::fmt::{Debug, Display};
use uuid::Uuid;

/// The shared database pool handed to every request. Services only see it through the
/// [external_connections] traits, so they run the same against the fakes in tests.
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: AnyPool,
}

impl ExternalConnectivity {
    /// Wraps an already connected pool
    pub fn new(db: AnyPool) -> Self {
        ExternalConnectivity { db }
    }
}

/// A connection checked out of the pool. It goes back to the pool when dropped.
pub struct PoolConnectionHandle {
    active_connection: PoolConnection<Any>,
}

impl ConnectionHandle for PoolConnectionHandle {
    fn borrow_connection(&mut self) -> &mut AnyConnection {
        &mut self.active_connection
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type DbHandle<'cxn_borrow> = PoolConnectionHandle;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error> {
        let handle = PoolConnectionHandle {
            active_connection: self
                .db
                .acquire()
                .await
                .context("acquiring connection from db pool")?,
        };

        Ok(handle)
    }
}

impl external_connections::Transactable for ExternalConnectivity {
    type Handle = ExternalConnectionsInTransaction;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error> {
        let transaction = self
            .db
            .begin()
            .await
            .context("Starting transaction from db pool")?;

        Ok(ExternalConnectionsInTransaction { txn: transaction })
    }
}

/// An open transaction on one pooled connection. Writes staged through it only land once
/// [commit][external_connections::TransactionHandle::commit] succeeds.
pub struct ExternalConnectionsInTransaction {
    txn: Transaction<'static, Any>,
}

/// Borrows the connection the transaction runs on
pub struct TransactionHandle<'tx> {
    active_transaction: &'tx mut AnyConnection,
}

impl external_connections::ExternalConnectivity for ExternalConnectionsInTransaction {
    type DbHandle<'tx_borrow>
        = TransactionHandle<'tx_borrow>
    where
        Self: 'tx_borrow;

    async fn database_cxn(&mut self) -> Result<TransactionHandle<'_>, anyhow::Error> {
        let handle = self
            .txn
            .acquire()
            .await
            .context("acquiring connection from database transaction")?;

        Ok(TransactionHandle {
            active_transaction: handle,
        })
    }
}

impl ConnectionHandle for TransactionHandle<'_> {
    fn borrow_connection(&mut self) -> &mut AnyConnection {
        &mut *self.active_transaction
    }
}

impl external_connections::TransactionHandle for ExternalConnectionsInTransaction {
    async fn commit(self) -> Result<(), anyhow::Error> {
        self.txn
            .commit()
            .await
            .context("Committing database transaction")?;

        Ok(())
    }
}

/// Parses an id column back into a [Uuid]. Ids are stored as text so every engine can hold them.
fn parse_id(raw_id: &str) -> Result<Uuid, anyhow::Error> {
    Uuid::parse_str(raw_id)
        .map_err(anyhowify)
        .with_context(|| format!("stored id \"{raw_id}\" is not a valid UUID"))
}

/// Converts anything implementing Debug and Display into an [anyhow::Error]
fn anyhowify<T: Debug + Display>(errorish: T) -> anyhow::Error {
    anyhow!(format!("{}", errorish))
}
