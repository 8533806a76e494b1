//! Implements `LedgerStorage` with a CSV file.
//!
//! The file layout is the one written by earlier versions of this tracker, so an existing
//! `transactions.csv` can be used in place:
//!
//! ```text
//! Date,Description,Amount,Balance
//! 2024-06-03,Starting Balance,0.0,0.0
//! 2024-06-04,Weekly Allowance,50.0,50.0
//! ```
//!
//! Records are terminated with CRLF and fields are quoted only when necessary.

use crate::error::Res;
use crate::model::{Row, HEADERS};
use crate::storage::LedgerStorage;
use crate::utils;
use anyhow::Context;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

const TERMINATOR: &[u8] = b"\r\n";

/// A ledger stored as a CSV file at `path`.
#[derive(Debug, Clone)]
pub struct CsvLedgerFile {
    path: PathBuf,
}

impl CsvLedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl LedgerStorage for CsvLedgerFile {
    async fn create(&self, seed: &Row) -> Res<bool> {
        let data = encode(true, std::slice::from_ref(seed))?;
        utils::create_new(&self.path, data)
            .await
            .context("Unable to create the ledger file")
    }

    async fn read_all(&self) -> Res<Vec<Row>> {
        match utils::read_if_exists(&self.path).await? {
            None => Ok(Vec::new()),
            Some(contents) => decode(&contents)
                .with_context(|| format!("Unable to parse the ledger file {}", self.path.display())),
        }
    }

    async fn append(&self, row: &Row) -> Res<()> {
        trace!("append {row:?} to {}", self.path.display());
        let existing = utils::read_if_exists(&self.path).await?.unwrap_or_default();
        let mut data = Vec::new();
        if existing.last().is_some_and(|&b| b != b'\n') {
            // A hand-edited file may lack the final newline; don't glue two records together.
            data.extend_from_slice(TERMINATOR);
        }
        data.extend(encode(existing.is_empty(), std::slice::from_ref(row))?);
        utils::append(&self.path, data)
            .await
            .context("Unable to append to the ledger file")
    }
}

/// Serializes `rows`, preceded by the header row when `header` is true.
pub(crate) fn encode(header: bool, rows: &[Row]) -> Res<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    if header {
        wtr.write_record(HEADERS)?;
    }
    for row in rows {
        wtr.write_record(row.fields())?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to serialize ledger rows: {e}"))
}

/// Parses the file contents into rows, skipping the header row. Rows with too few or too many
/// fields are kept; see `Row::from_fields`. Bytes that are not UTF-8 are replaced with U+FFFD.
fn decode(contents: &[u8]) -> Res<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(contents));

    let mut records = rdr.byte_records();
    match records.next() {
        None => return Ok(Vec::new()),
        Some(header) => {
            let header = header.context("Unable to read the header row")?;
            if !header.iter().eq(HEADERS.iter().map(|h| h.as_bytes())) {
                warn!("Unexpected ledger header row {header:?}, expected {HEADERS:?}");
            }
        }
    }

    let mut rows = Vec::new();
    for (ix, result) in records.enumerate() {
        let record = result.with_context(|| format!("Unable to read data row {}", ix + 1))?;
        rows.push(Row::from_fields(record.iter().map(String::from_utf8_lossy)));
    }
    Ok(rows)
}
