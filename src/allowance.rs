//! The weekly allowance catch-up.
//!
//! Each time a session starts, the engine looks at how many trigger weekdays (Tuesday by default)
//! have passed since the last run, appends one allowance credit per missed day, and records today
//! as the new last-run date. Running it twice on the same day credits nothing the second time.
//!
//! The count is recomputed from the last-run date every time. If the process dies after some
//! credits were appended but before the last-run date was saved, the next run credits the whole
//! window again. Tracking individual credited days would close that gap but would change the
//! stored format.

use crate::clock::Clock;
use crate::ledger::LedgerStore;
use crate::model::{Amount, Transaction};
use crate::state::RunStateStore;
use crate::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// The default amount credited for each trigger day.
pub const ALLOWANCE_AMOUNT: Decimal = Decimal::from_parts(5000, 0, 0, false, 2);

/// The default description of allowance credits.
pub const ALLOWANCE_DESCRIPTION: &str = "Weekly Allowance";

/// The default day of the week on which the allowance is due.
pub const TRIGGER_WEEKDAY: Weekday = Weekday::Tue;

/// What is credited, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowance {
    amount: Amount,
    weekday: Weekday,
    description: String,
}

impl Default for Allowance {
    fn default() -> Self {
        Self::new(
            Amount::new_plain(ALLOWANCE_AMOUNT),
            TRIGGER_WEEKDAY,
            ALLOWANCE_DESCRIPTION,
        )
    }
}

impl Allowance {
    pub fn new(amount: Amount, weekday: Weekday, description: impl Into<String>) -> Self {
        Self {
            amount: amount.plain(),
            weekday,
            description: description.into(),
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Counts the days `d` with `last_run < d <= today` that fall on `trigger`.
///
/// The last-run day itself is never counted, since it was already handled by that run. If `today`
/// is not after `last_run` (same day, a clock that moved backwards, a bogus future date) the count
/// is zero.
pub fn missed_trigger_days(last_run: NaiveDate, today: NaiveDate, trigger: Weekday) -> u32 {
    let count = last_run
        .iter_days()
        .skip(1)
        .take_while(|day| *day <= today)
        .filter(|day| day.weekday() == trigger)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// The outcome of a catch-up run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatchUp {
    last_run_date: NaiveDate,
    today: NaiveDate,
    credits: Vec<Transaction>,
}

impl CatchUp {
    /// The number of allowance credits that were appended.
    pub fn missed(&self) -> u32 {
        u32::try_from(self.credits.len()).unwrap_or(u32::MAX)
    }

    /// The last-run date the missed days were counted from.
    pub fn last_run_date(&self) -> NaiveDate {
        self.last_run_date
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The appended credits, in the order they were appended.
    pub fn credits(&self) -> &[Transaction] {
        &self.credits
    }
}

/// Applies missed allowance credits to a ledger.
#[derive(Debug, Clone)]
pub struct AllowanceEngine {
    allowance: Allowance,
    clock: Arc<dyn Clock>,
}

impl AllowanceEngine {
    pub fn new(allowance: Allowance, clock: Arc<dyn Clock>) -> Self {
        Self { allowance, clock }
    }

    pub fn allowance(&self) -> &Allowance {
        &self.allowance
    }

    /// Credits one allowance per trigger day missed since the last run, then records today as the
    /// last run, even when nothing was missed.
    ///
    /// Credits are appended one at a time so each one stacks on the balance left by the previous
    /// one. If an append fails the error is returned and the last-run date is left alone.
    pub async fn run_catch_up(
        &self,
        ledger: &LedgerStore,
        state: &RunStateStore,
    ) -> Result<CatchUp> {
        let last_run_date = state.last_run_date().await?;
        let today = self.clock.today();
        let missed = missed_trigger_days(last_run_date, today, self.allowance.weekday);
        debug!("{missed} allowance day(s) missed between {last_run_date} and {today}");

        let mut credits = Vec::new();
        for _ in 0..missed {
            let credit = ledger
                .append(&self.allowance.description, self.allowance.amount)
                .await?;
            credits.push(credit);
        }
        state.set_last_run_date(today).await?;

        if missed > 0 {
            debug!(
                "Credited {missed} x {} '{}' for the {}(s) since {last_run_date}",
                self.allowance.amount.display(),
                self.allowance.description,
                self.allowance.weekday
            );
        }

        Ok(CatchUp {
            last_run_date,
            today,
            credits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::Res;
    use crate::model::{Entry, Row};
    use crate::storage::{LedgerStorage, MemoryLedger, MemoryState};
    use crate::test::date;

    struct Fixture {
        clock: FixedClock,
        memory: MemoryLedger,
        state_memory: MemoryState,
        ledger: LedgerStore,
        state: RunStateStore,
        engine: AllowanceEngine,
    }

    async fn fixture(last_run: NaiveDate, today: NaiveDate) -> Fixture {
        let clock = FixedClock::new(last_run);
        let memory = MemoryLedger::default();
        let state_memory = MemoryState::default();
        let ledger = LedgerStore::new(Box::new(memory.clone()), Arc::new(clock.clone()));
        let state = RunStateStore::new(Box::new(state_memory.clone()), Arc::new(clock.clone()));
        ledger.initialize_if_absent().await.unwrap();
        state.initialize_if_absent().await.unwrap();
        clock.set(today);
        let engine = AllowanceEngine::new(Allowance::default(), Arc::new(clock.clone()));
        Fixture {
            clock,
            memory,
            state_memory,
            ledger,
            state,
            engine,
        }
    }

    #[test]
    fn test_missed_concrete_case() {
        // Monday 2024-06-03 to Tuesday 2024-06-18: 06-04, 06-11, 06-18.
        assert_eq!(
            missed_trigger_days(date(2024, 6, 3), date(2024, 6, 18), Weekday::Tue),
            3
        );
    }

    #[test]
    fn test_missed_excludes_last_run_day() {
        // Last run on a Tuesday; that Tuesday was already handled.
        assert_eq!(
            missed_trigger_days(date(2024, 6, 4), date(2024, 6, 10), Weekday::Tue),
            0
        );
        assert_eq!(
            missed_trigger_days(date(2024, 6, 4), date(2024, 6, 11), Weekday::Tue),
            1
        );
    }

    #[test]
    fn test_missed_same_day_and_backwards() {
        assert_eq!(
            missed_trigger_days(date(2024, 6, 4), date(2024, 6, 4), Weekday::Tue),
            0
        );
        assert_eq!(
            missed_trigger_days(date(2024, 6, 18), date(2024, 6, 3), Weekday::Tue),
            0
        );
    }

    #[test]
    fn test_missed_other_weekday_and_long_gap() {
        assert_eq!(
            missed_trigger_days(date(2024, 6, 3), date(2024, 6, 18), Weekday::Sun),
            2
        );
        // 2023-01-01 is a Sunday; 2023 has 53 Sundays, 52 of them after Jan 1.
        assert_eq!(
            missed_trigger_days(date(2023, 1, 1), date(2023, 12, 31), Weekday::Sun),
            52
        );
    }

    #[tokio::test]
    async fn test_catch_up_concrete_case() {
        let f = fixture(date(2024, 6, 3), date(2024, 6, 18)).await;
        let catch_up = f.engine.run_catch_up(&f.ledger, &f.state).await.unwrap();

        assert_eq!(catch_up.missed(), 3);
        assert_eq!(catch_up.last_run_date(), date(2024, 6, 3));
        let balances: Vec<String> = catch_up
            .credits()
            .iter()
            .map(|t| t.balance().to_string())
            .collect();
        assert_eq!(balances, ["50.00", "100.00", "150.00"]);

        let rows = f.memory.rows().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[3].fields(),
            ["2024-06-18", "Weekly Allowance", "50.00", "150.00"]
        );
        assert_eq!(f.state.last_run_date().await.unwrap(), date(2024, 6, 18));
        assert_eq!(
            f.state_memory.contents().unwrap(),
            r#"{"last_run_date":"2024-06-18"}"#
        );
    }

    #[tokio::test]
    async fn test_catch_up_twice_same_day() {
        let f = fixture(date(2024, 6, 3), date(2024, 6, 18)).await;
        f.engine.run_catch_up(&f.ledger, &f.state).await.unwrap();
        let before = f.memory.rows().unwrap();

        let again = f.engine.run_catch_up(&f.ledger, &f.state).await.unwrap();
        assert_eq!(again.missed(), 0);
        assert_eq!(f.memory.rows().unwrap(), before);
    }

    #[tokio::test]
    async fn test_catch_up_advances_state_even_when_nothing_missed() {
        let f = fixture(date(2024, 6, 4), date(2024, 6, 10)).await;
        let catch_up = f.engine.run_catch_up(&f.ledger, &f.state).await.unwrap();
        assert_eq!(catch_up.missed(), 0);
        assert_eq!(f.state.last_run_date().await.unwrap(), date(2024, 6, 10));

        // The next day is a Tuesday, counted from 06-10 rather than 06-04.
        f.clock.advance(1);
        let catch_up = f.engine.run_catch_up(&f.ledger, &f.state).await.unwrap();
        assert_eq!(catch_up.missed(), 1);
    }

    #[tokio::test]
    async fn test_catch_up_with_corrupt_state_credits_nothing() {
        let f = fixture(date(2024, 6, 3), date(2024, 6, 18)).await;
        let state = RunStateStore::new(
            Box::new(MemoryState::with_contents("{{{")),
            Arc::new(f.clock.clone()),
        );
        let catch_up = f.engine.run_catch_up(&f.ledger, &state).await.unwrap();
        assert_eq!(catch_up.missed(), 0);
        assert_eq!(f.memory.rows().unwrap().len(), 1);
        assert_eq!(state.last_run_date().await.unwrap(), date(2024, 6, 18));
    }

    #[tokio::test]
    async fn test_catch_up_stacks_on_existing_balance() {
        let f = fixture(date(2024, 6, 3), date(2024, 6, 3)).await;
        f.ledger
            .append("Birthday", "20.00".parse().unwrap())
            .await
            .unwrap();
        f.clock.set(date(2024, 6, 11));
        let catch_up = f.engine.run_catch_up(&f.ledger, &f.state).await.unwrap();
        assert_eq!(catch_up.missed(), 2);
        assert_eq!(
            f.ledger.current_balance().await.unwrap().to_string(),
            "120.00"
        );
    }

    #[tokio::test]
    async fn test_custom_allowance() {
        let f = fixture(date(2024, 6, 3), date(2024, 6, 18)).await;
        let engine = AllowanceEngine::new(
            Allowance::new("7.5".parse().unwrap(), Weekday::Fri, "Pocket Money"),
            Arc::new(f.clock.clone()),
        );
        let catch_up = engine.run_catch_up(&f.ledger, &f.state).await.unwrap();
        assert_eq!(catch_up.missed(), 2);
        let history = f.ledger.all_transactions().await.unwrap();
        assert_eq!(
            history.last().and_then(Entry::transaction).unwrap().description(),
            "Pocket Money"
        );
        assert_eq!(
            f.ledger.current_balance().await.unwrap().to_string(),
            "15.00"
        );
    }

    /// A ledger whose appends start failing after a number of successes.
    struct FlakyLedger {
        inner: MemoryLedger,
        remaining: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LedgerStorage for FlakyLedger {
        async fn create(&self, seed: &Row) -> Res<bool> {
            self.inner.create(seed).await
        }

        async fn read_all(&self) -> Res<Vec<Row>> {
            self.inner.read_all().await
        }

        async fn append(&self, row: &Row) -> Res<()> {
            use std::sync::atomic::Ordering;
            let ok = self
                .remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !ok {
                anyhow::bail!("disk full");
            }
            self.inner.append(row).await
        }
    }

    #[tokio::test]
    async fn test_partial_failure_leaves_state_unchanged() {
        let f = fixture(date(2024, 6, 3), date(2024, 6, 18)).await;
        let flaky = FlakyLedger {
            inner: f.memory.clone(),
            remaining: std::sync::atomic::AtomicUsize::new(2),
        };
        let ledger = LedgerStore::new(Box::new(flaky), Arc::new(f.clock.clone()));

        let err = f.engine.run_catch_up(&ledger, &f.state).await.unwrap_err();
        assert_eq!(err.error_type(), crate::ErrorType::StorageUnavailable);
        assert_eq!(f.memory.rows().unwrap().len(), 3);
        assert_eq!(f.state.last_run_date().await.unwrap(), date(2024, 6, 3));

        // The next run counts the same window again.
        let catch_up = f.engine.run_catch_up(&f.ledger, &f.state).await.unwrap();
        assert_eq!(catch_up.missed(), 3);
        assert_eq!(f.memory.rows().unwrap().len(), 6);
    }
}
