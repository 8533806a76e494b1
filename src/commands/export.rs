use crate::args::Order;
use crate::commands::{ordered, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Entry, Row};
use crate::{storage, utils, Result, Tracker};
use anyhow::Context;
use std::path::Path;

/// Writes the ledger history, header included, to a CSV file at `output`. Malformed rows are
/// written exactly as they were read. Returns the number of rows written.
pub async fn export(tracker: &Tracker, output: &Path, order: Order) -> Result<Out<usize>> {
    tracker.start().await?;
    let entries = tracker.history().await?;
    let rows: Vec<Row> = ordered(&entries, order).iter().map(Entry::to_row).collect();
    let data = storage::encode(true, &rows).pub_result(ErrorType::StorageUnavailable)?;
    utils::write(output, data)
        .await
        .context("Unable to write the export file")
        .pub_result(ErrorType::StorageUnavailable)?;
    Ok(Out::new(
        format!("Exported {} rows to '{}'", rows.len(), output.display()),
        rows.len(),
    ))
}
