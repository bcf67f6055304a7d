//! Capabilities of the external services the inventory delegates to.

use async_trait::async_trait;

use crate::{Direction, RecordId, ResultInventory, ShareableLink, TransactionRecord};

/// The system of record for transactions.
///
/// Implementations call the remote service synchronously per operation and
/// never retry: a failed call is reported as
/// [`RemoteWrite`](crate::InventoryError::RemoteWrite) or
/// [`RemoteRead`](crate::InventoryError::RemoteRead).
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn append(
        &self,
        direction: Direction,
        record: &TransactionRecord,
    ) -> ResultInventory<RecordId>;

    async fn list_all(&self, direction: Direction) -> ResultInventory<Vec<TransactionRecord>>;
}

/// File storage for receipts. Every upload creates a new remote object.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> ResultInventory<ShareableLink>;
}
