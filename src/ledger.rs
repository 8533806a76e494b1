//! The ledger store: an append-only log of transactions with a running balance.

use crate::clock::Clock;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Entry, Row, Transaction};
use crate::storage::LedgerStorage;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Reads and appends ledger transactions through a `LedgerStorage`.
///
/// Appends are serialized with an async mutex so that two appends in this process can never read
/// the same "current" balance.
pub struct LedgerStore {
    storage: Box<dyn LedgerStorage>,
    clock: Arc<dyn Clock>,
    append_lock: Mutex<()>,
}

impl LedgerStore {
    pub fn new(storage: Box<dyn LedgerStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            append_lock: Mutex::new(()),
        }
    }

    /// Creates the ledger with its `Starting Balance` seed row if it does not exist yet. An
    /// existing ledger is never touched. Returns `true` if the ledger was created.
    pub async fn initialize_if_absent(&self) -> Result<bool> {
        let seed = Transaction::seed(self.clock.today());
        let created = self
            .storage
            .create(&seed.to_row())
            .await
            .pub_result(ErrorType::StorageUnavailable)?;
        if created {
            info!("Created a new ledger with a starting balance of {}", seed.balance().display());
        }
        Ok(created)
    }

    /// Returns the running balance of the last row, or zero if the ledger is empty.
    ///
    /// If the last row's balance cannot be parsed, this logs a data-integrity warning and returns
    /// zero rather than failing; the malformed row itself is left untouched.
    pub async fn current_balance(&self) -> Result<Amount> {
        let rows = self.rows().await?;
        Ok(balance_of(&rows))
    }

    /// Appends a transaction dated today whose running balance is the current balance plus
    /// `amount`, and returns it.
    pub async fn append(&self, description: &str, amount: Amount) -> Result<Transaction> {
        let _guard = self.append_lock.lock().await;
        let current = self.current_balance().await?;
        let balance = current.checked_add(amount).ok_or_else(|| {
            Error::invalid_input(format!(
                "Adding {} to a balance of {} is out of range",
                amount.display(),
                current.display()
            ))
        })?;
        let transaction = Transaction::new(self.clock.today(), description, amount, balance);
        self.storage
            .append(&transaction.to_row())
            .await
            .pub_result(ErrorType::StorageUnavailable)?;
        debug!("Appended {transaction:?}");
        Ok(transaction)
    }

    /// Returns every entry, oldest first, including the seed row. Rows that cannot be parsed are
    /// returned as `Entry::Malformed`.
    pub async fn all_transactions(&self) -> Result<Vec<Entry>> {
        let rows = self.rows().await?;
        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn rows(&self) -> Result<Vec<Row>> {
        self.storage
            .read_all()
            .await
            .pub_result(ErrorType::StorageUnavailable)
    }
}

/// The balance after the last row of `rows`.
fn balance_of(rows: &[Row]) -> Amount {
    let Some(last) = rows.last() else {
        return Amount::ZERO.plain();
    };
    match last.parse_balance() {
        Ok(balance) => balance.plain(),
        Err(e) => {
            warn!(
                "Data integrity: the last ledger row {:?} has a malformed balance ({e:#}); \
                treating the balance as zero",
                last.fields()
            );
            Amount::ZERO.plain()
        }
    }
}
