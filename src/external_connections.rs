use sqlx::AnyConnection;

/// A handle to a live database connection, either pooled or inside a transaction
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut AnyConnection;
}

/// Provides access to the external systems (currently just the database) that driven
/// adapters talk to, keeping business logic agnostic of where its data comes from
pub trait ExternalConnectivity: Send {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// An [ExternalConnectivity] whose database work is staged in a transaction until committed.
/// Dropping the handle without committing rolls the transaction back.
pub trait TransactionHandle: ExternalConnectivity {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

/// An [ExternalConnectivity] that can open a transaction
pub trait Transactable: ExternalConnectivity {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}
