//! The `Tracker` is the single entry point that front ends use: it owns the ledger, the run state
//! and the allowance engine, and it applies the input rules for manual transactions.

use crate::allowance::{Allowance, AllowanceEngine, CatchUp};
use crate::clock::{Clock, SystemClock};
use crate::ledger::LedgerStore;
use crate::model::{Amount, Entry, Transaction};
use crate::state::RunStateStore;
use crate::storage::{self, LedgerStorage, StateStorage};
use crate::{Config, Error, Result};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Owns everything needed to read and change the ledger.
///
/// Catch-up runs and manual additions each hold a session lock for their whole read-modify-write,
/// so a `Tracker` shared between tasks (e.g. behind an `Arc`) never interleaves them.
pub struct Tracker {
    ledger: LedgerStore,
    state: RunStateStore,
    engine: AllowanceEngine,
    session: Mutex<()>,
}

impl Tracker {
    pub fn new(
        ledger_storage: Box<dyn LedgerStorage>,
        state_storage: Box<dyn StateStorage>,
        clock: Arc<dyn Clock>,
        allowance: Allowance,
    ) -> Self {
        Self {
            ledger: LedgerStore::new(ledger_storage, clock.clone()),
            state: RunStateStore::new(state_storage, clock.clone()),
            engine: AllowanceEngine::new(allowance, clock),
            session: Mutex::new(()),
        }
    }

    /// A `Tracker` over the files named in `config`, using the system's local date.
    pub fn from_config(config: &Config) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// A `Tracker` over the files named in `config`, using `clock` for today's date.
    pub fn from_config_with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let (ledger_storage, state_storage) = storage::files(config);
        Self::new(ledger_storage, state_storage, clock, config.allowance())
    }

    pub fn allowance(&self) -> &Allowance {
        self.engine.allowance()
    }

    /// Creates the ledger and the run state if they do not exist yet. Existing data is never
    /// touched.
    pub async fn ensure_initialized(&self) -> Result<()> {
        let _guard = self.session.lock().await;
        self.ledger.initialize_if_absent().await?;
        self.state.initialize_if_absent().await?;
        Ok(())
    }

    /// Credits any missed allowances. See `AllowanceEngine::run_catch_up`.
    pub async fn run_catch_up(&self) -> Result<CatchUp> {
        let _guard = self.session.lock().await;
        self.engine.run_catch_up(&self.ledger, &self.state).await
    }

    /// What a front end does at the start of every session or request: make sure storage exists,
    /// then catch up on missed allowances.
    pub async fn start(&self) -> Result<CatchUp> {
        self.ensure_initialized().await?;
        let catch_up = self.run_catch_up().await?;
        if catch_up.missed() > 0 {
            info!(
                "Added allowance for {} missed {}(s)",
                catch_up.missed(),
                self.allowance().weekday()
            );
        }
        Ok(catch_up)
    }

    /// The current balance.
    pub async fn balance(&self) -> Result<Amount> {
        self.ledger.current_balance().await
    }

    /// Every entry, oldest first.
    pub async fn history(&self) -> Result<Vec<Entry>> {
        self.ledger.all_transactions().await
    }

    /// Records a manual transaction. A negative `amount` is a subtraction.
    ///
    /// # Errors
    /// - `InvalidInput` if the description is blank or the amount is zero. Nothing is written.
    /// - `StorageUnavailable` if the ledger cannot be read or appended to.
    pub async fn add_transaction(&self, description: &str, amount: Amount) -> Result<Transaction> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::invalid_input("Please provide a description."));
        }
        if amount.is_zero() {
            return Err(Error::invalid_input("Amount cannot be zero."));
        }
        let _guard = self.session.lock().await;
        let transaction = self.ledger.append(description, amount).await?;
        debug!(
            "Recorded '{}' for {}, the balance is now {}",
            transaction.description(),
            transaction.amount().display(),
            transaction.balance().display()
        );
        Ok(transaction)
    }

    /// Like `add_transaction`, but takes the amount as text, as typed into a form.
    pub async fn add_transaction_str(
        &self,
        description: &str,
        amount: &str,
    ) -> Result<Transaction> {
        let amount = Amount::from_str(amount)
            .map_err(|e| Error::invalid_input(format!("Please enter a valid amount. {e}")))?;
        self.add_transaction(description, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::{MemoryLedger, MemoryState};
    use crate::test::date;
    use crate::ErrorType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    struct Fixture {
        clock: FixedClock,
        ledger: MemoryLedger,
        state: MemoryState,
        tracker: Tracker,
    }

    fn fixture(today: NaiveDate) -> Fixture {
        let clock = FixedClock::new(today);
        let ledger = MemoryLedger::default();
        let state = MemoryState::default();
        let tracker = Tracker::new(
            Box::new(ledger.clone()),
            Box::new(state.clone()),
            Arc::new(clock.clone()),
            Allowance::default(),
        );
        Fixture {
            clock,
            ledger,
            state,
            tracker,
        }
    }

    #[tokio::test]
    async fn test_first_start_seeds_and_credits_nothing() {
        let f = fixture(date(2024, 6, 4));
        let catch_up = f.tracker.start().await.unwrap();
        assert_eq!(catch_up.missed(), 0);

        let history = f.tracker.history().await.unwrap();
        assert_eq!(history, vec![Entry::Valid(Transaction::seed(date(2024, 6, 4)))]);
        assert!(f.tracker.balance().await.unwrap().is_zero());
        assert_eq!(
            f.state.contents().unwrap(),
            r#"{"last_run_date":"2024-06-04"}"#
        );
    }

    #[tokio::test]
    async fn test_ensure_initialized_never_overwrites() {
        let f = fixture(date(2024, 6, 3));
        f.tracker.start().await.unwrap();
        f.tracker.add_transaction("Gift", amount("20")).await.unwrap();
        f.clock.advance(1);
        f.tracker.ensure_initialized().await.unwrap();
        assert_eq!(f.ledger.rows().unwrap().len(), 2);
        assert_eq!(
            f.state.contents().unwrap(),
            r#"{"last_run_date":"2024-06-03"}"#
        );
    }

    #[tokio::test]
    async fn test_concrete_catch_up_through_the_facade() {
        let f = fixture(date(2024, 6, 3));
        f.tracker.start().await.unwrap();
        f.clock.set(date(2024, 6, 18));

        let catch_up = f.tracker.start().await.unwrap();
        assert_eq!(catch_up.missed(), 3);
        assert_eq!(
            f.tracker.balance().await.unwrap().value(),
            Decimal::from(150)
        );

        // A second start on the same day changes nothing.
        let again = f.tracker.start().await.unwrap();
        assert_eq!(again.missed(), 0);
        assert_eq!(f.tracker.history().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_add_transaction() {
        let f = fixture(date(2024, 6, 3));
        f.tracker.start().await.unwrap();

        let t = f.tracker.add_transaction("  Chores  ", amount("12.25")).await.unwrap();
        assert_eq!(t.description(), "Chores");
        let t = f.tracker.add_transaction_str("Candy", "-2.25").await.unwrap();
        assert_eq!(t.balance().value(), Decimal::from(10));
        assert_eq!(
            f.ledger.rows().unwrap()[2].fields(),
            ["2024-06-03", "Candy", "-2.25", "10.00"]
        );
    }

    #[tokio::test]
    async fn test_add_transaction_rejects_bad_input_without_writing() {
        let f = fixture(date(2024, 6, 3));
        f.tracker.start().await.unwrap();

        let err = f.tracker.add_transaction("   ", amount("1")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidInput);
        assert_eq!(err.to_string(), "Please provide a description.");

        let err = f.tracker.add_transaction("Nothing", amount("0.00")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidInput);
        assert_eq!(err.to_string(), "Amount cannot be zero.");

        for text in ["", "abc", "NaN", "inf", "1.2.3"] {
            let err = f.tracker.add_transaction_str("Thing", text).await.unwrap_err();
            assert_eq!(err.error_type(), ErrorType::InvalidInput, "{text}");
        }

        assert_eq!(f.ledger.rows().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_includes_allowances_and_manual_entries_in_order() {
        let f = fixture(date(2024, 6, 3));
        f.tracker.start().await.unwrap();
        f.tracker.add_transaction("Book", amount("-5")).await.unwrap();
        f.clock.set(date(2024, 6, 5));
        f.tracker.start().await.unwrap();
        f.tracker.add_transaction("Chores", amount("3")).await.unwrap();

        let descriptions: Vec<String> = f
            .tracker
            .history()
            .await
            .unwrap()
            .iter()
            .filter_map(Entry::transaction)
            .map(|t| t.description().to_string())
            .collect();
        assert_eq!(
            descriptions,
            ["Starting Balance", "Book", "Weekly Allowance", "Chores"]
        );
        assert_eq!(f.tracker.balance().await.unwrap().value(), Decimal::from(48));
    }

    #[tokio::test]
    async fn test_concurrent_adds_and_catch_up() {
        let f = fixture(date(2024, 6, 3));
        f.tracker.start().await.unwrap();
        f.clock.set(date(2024, 6, 18));
        let tracker = Arc::new(f.tracker);

        let mut handles = Vec::new();
        for i in 0..10 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    tracker.add_transaction("Coin", amount("1")).await.unwrap();
                } else {
                    tracker.start().await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Exactly one of the starts credits the three missed Tuesdays.
        assert_eq!(tracker.balance().await.unwrap().value(), Decimal::from(155));
        assert_eq!(f.ledger.rows().unwrap().len(), 1 + 3 + 5);
    }
}
