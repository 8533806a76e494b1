//! The persistence seam of the ledger.
//!
//! `LedgerStorage` and `StateStorage` are deliberately dumb: they move raw rows and raw bytes in
//! and out of some durable place. All interpretation (balances, fail-safe dates) happens in
//! `LedgerStore` and `RunStateStore`, so that the file-backed implementations and the in-memory
//! implementations behave identically.

mod csv_file;
mod json_file;
mod memory;

use crate::error::Res;
use crate::model::Row;
use crate::Config;

pub(crate) use csv_file::encode;
pub use csv_file::CsvLedgerFile;
pub use json_file::JsonStateFile;
pub use memory::{MemoryLedger, MemoryState};

/// Durable, ordered, append-only storage of ledger rows.
#[async_trait::async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Creates the store with a header and `seed` as its only row. Must never overwrite an
    /// existing store; returns `false` if one already exists.
    async fn create(&self, seed: &Row) -> Res<bool>;

    /// Returns every data row in append order. A store that does not exist has no rows.
    async fn read_all(&self) -> Res<Vec<Row>>;

    /// Appends `row` after the last existing row.
    async fn append(&self, row: &Row) -> Res<()>;
}

/// Durable storage of a single serialized run-state value.
#[async_trait::async_trait]
pub trait StateStorage: Send + Sync {
    /// Creates the value with `contents` unless one already exists; returns `false` if it did.
    async fn create(&self, contents: &str) -> Res<bool>;

    /// Returns the stored bytes, or `None` if nothing has been stored. The bytes may not be valid
    /// UTF-8.
    async fn read(&self) -> Res<Option<Vec<u8>>>;

    /// Replaces the stored text.
    async fn write(&self, contents: &str) -> Res<()>;
}

/// Constructs the file-backed storage described by `config`.
pub fn files(config: &Config) -> (Box<dyn LedgerStorage>, Box<dyn StateStorage>) {
    (
        Box::new(CsvLedgerFile::new(config.transactions_path())),
        Box::new(JsonStateFile::new(config.state_path())),
    )
}
