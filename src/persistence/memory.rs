//! In-process leaderboard store
//!
//! Keeps the serialized document, so reads and writes go through the same
//! codec as the browser backends. Failures can be switched on for tests.

use std::cell::{Cell, RefCell};

use super::{LeaderboardStore, StoreError, document};
use crate::leaderboard::LeaderboardEntry;

#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RefCell<String>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document
    pub fn with_document(document: impl Into<String>) -> Self {
        let store = Self::new();
        store.document.replace(document.into());
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Successful writes so far
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn document(&self) -> String {
        self.document.borrow().clone()
    }
}

impl LeaderboardStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        if self.fail_reads.get() {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        document::decode(&self.document.borrow())
    }

    async fn replace_all(&self, entries: Vec<LeaderboardEntry>) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        let encoded = document::encode(&entries)?;
        self.document.replace(encoded);
        self.writes.set(self.writes.get() + 1);
        log::info!("Leaderboard saved ({} entries)", entries.len());
        Ok(())
    }
}
