use crate::args::Order;
use crate::commands::{ordered, Out};
use crate::model::{Amount, Entry, HEADERS};
use crate::{Result, Tracker};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ledger entries, in display order. Displays as a markdown table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryTable {
    entries: Vec<Entry>,
}

impl HistoryTable {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

impl Display for HistoryTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "| {} |", HEADERS.join(" | "))?;
        writeln!(f, "|{}", "---|".repeat(HEADERS.len()))?;
        for entry in &self.entries {
            let cells = match entry {
                Entry::Valid(t) => [
                    t.date().to_string(),
                    t.description().to_string(),
                    t.amount().display().to_string(),
                    t.balance().display().to_string(),
                ],
                // Shown as stored, with whatever still parses formatted like the others.
                Entry::Malformed { row, .. } => [
                    row.date.clone(),
                    format!("{} (malformed)", row.description),
                    money_or_raw(&row.amount),
                    money_or_raw(&row.balance),
                ],
            };
            let cells: Vec<String> = cells.iter().map(|c| c.replace('|', "\\|")).collect();
            writeln!(f, "| {} |", cells.join(" | "))?;
        }
        Ok(())
    }
}

fn money_or_raw(s: &str) -> String {
    Amount::from_str(s)
        .map(|a| a.display().to_string())
        .unwrap_or_else(|_| s.to_string())
}

/// Lists every entry in the ledger. `Order::Newest` reverses the listing only; the ledger itself is
/// always kept oldest first.
pub async fn history(tracker: &Tracker, order: Order) -> Result<Out<HistoryTable>> {
    tracker.start().await?;
    let entries = tracker.history().await?;
    let table = HistoryTable::new(ordered(&entries, order));
    Ok(Out::new(table.to_string(), table))
}
