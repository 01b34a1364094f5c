use anyhow::Context;
use tracing::debug;
use uuid::Uuid;

use crate::external_connections::TransactionHandle;

pub mod owner;
pub mod task_item;

#[cfg(test)]
mod test_util;

/// Resolves the id a new entity should be stored under. A missing or nil id is treated as unset
/// and replaced by a freshly generated one; any other id is kept as requested.
pub fn assign_id(requested: Option<Uuid>) -> Uuid {
    match requested {
        Some(id) if !id.is_nil() => id,
        _ => Uuid::new_v4(),
    }
}

/// Commits the operations staged in [txn]. Returns whether any row was affected by them.
pub(crate) async fn save_changes(
    txn: impl TransactionHandle,
    rows_staged: u64,
) -> Result<bool, anyhow::Error> {
    txn.commit().await.context("saving staged changes")?;
    debug!(rows_staged, "Saved changes");

    Ok(rows_staged > 0)
}
