//! Implements the storage traits using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this crate so that library users (and
//! any front end) can run the whole tracker, top-to-bottom, without touching the filesystem.

use crate::error::Res;
use crate::model::Row;
use crate::storage::{LedgerStorage, StateStorage};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An in-memory ledger. Clones share the same rows, so a test can keep one clone to inspect what a
/// `Tracker` wrote through the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    rows: Arc<Mutex<Option<Vec<Row>>>>,
}

impl MemoryLedger {
    /// An in-memory ledger that already exists and holds `rows`.
    pub fn with_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(Some(rows.into_iter().collect()))),
        }
    }

    /// A copy of the stored rows, or `None` if the ledger was never created.
    pub fn rows(&self) -> Option<Vec<Row>> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<Row>>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl LedgerStorage for MemoryLedger {
    async fn create(&self, seed: &Row) -> Res<bool> {
        let mut rows = self.lock();
        if rows.is_some() {
            return Ok(false);
        }
        *rows = Some(vec![seed.clone()]);
        Ok(true)
    }

    async fn read_all(&self) -> Res<Vec<Row>> {
        Ok(self.lock().clone().unwrap_or_default())
    }

    async fn append(&self, row: &Row) -> Res<()> {
        self.lock().get_or_insert_with(Vec::new).push(row.clone());
        Ok(())
    }
}

/// An in-memory run state. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryState {
    /// An in-memory run state that already holds `contents`, which need not be valid JSON.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// A copy of the stored text.
    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl StateStorage for MemoryState {
    async fn create(&self, contents: &str) -> Res<bool> {
        let mut stored = self.lock();
        if stored.is_some() {
            return Ok(false);
        }
        *stored = Some(contents.to_string());
        Ok(true)
    }

    async fn read(&self) -> Res<Option<Vec<u8>>> {
        Ok(self.contents().map(String::into_bytes))
    }

    async fn write(&self, contents: &str) -> Res<()> {
        *self.lock() = Some(contents.to_string());
        Ok(())
    }
}
