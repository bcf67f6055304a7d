//! In-process ledger and receipt store.
//!
//! Used when the service runs without Google credentials in development,
//! and by tests that need to count or fail remote calls.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    Direction, InventoryError, LedgerClient, ReceiptStore, RecordId, ResultInventory,
    ShareableLink, TransactionRecord,
};

#[derive(Debug, Default)]
pub struct MemoryLedger {
    rows: Mutex<HashMap<Direction, Vec<TransactionRecord>>>,
    appends: AtomicUsize,
    reads: AtomicUsize,
    fail_next_append: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-filled with `records` in `direction`.
    pub fn with_records(direction: Direction, records: Vec<TransactionRecord>) -> Self {
        let ledger = Self::default();
        ledger
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(direction, records);
        ledger
    }

    /// Make the next `append` fail with a write error.
    pub fn fail_next_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }

    /// Make every `list_all` fail with a read error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of `append` calls, failed ones included.
    pub fn append_calls(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn records(&self, direction: Direction) -> Vec<TransactionRecord> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&direction)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn append(
        &self,
        direction: Direction,
        record: &TransactionRecord,
    ) -> ResultInventory<RecordId> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(InventoryError::RemoteWrite(
                "simulated ledger outage".to_string(),
            ));
        }

        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let tab = rows.entry(direction).or_default();
        tab.push(record.clone());
        // Row 1 holds the header.
        let row = tab.len() + 1;
        Ok(RecordId(format!("{direction}!A{row}:H{row}")))
    }

    async fn list_all(&self, direction: Direction) -> ResultInventory<Vec<TransactionRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(InventoryError::RemoteRead(
                "simulated ledger outage".to_string(),
            ));
        }
        Ok(self.records(direction))
    }
}

#[derive(Debug, Default)]
pub struct MemoryReceiptStore {
    files: Mutex<Vec<(String, usize)>>,
    fail_uploads: AtomicBool,
}

impl MemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Names of the uploaded files, in upload order.
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ReceiptStore for MemoryReceiptStore {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> ResultInventory<ShareableLink> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(InventoryError::Upload("simulated quota exceeded".to_string()));
        }
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.push((file_name.to_string(), bytes.len()));
        Ok(ShareableLink(format!(
            "memory://receipts/{}/{file_name}",
            files.len()
        )))
    }
}
