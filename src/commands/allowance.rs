use crate::allowance::CatchUp;
use crate::commands::Out;
use crate::{Result, Tracker};

/// Credits any allowances that are due and reports how many there were.
pub async fn allowance(tracker: &Tracker) -> Result<Out<CatchUp>> {
    let catch_up = tracker.start().await?;
    let weekday = tracker.allowance().weekday();
    let message = match catch_up.missed() {
        0 => format!(
            "No allowance is due, it was last updated {}",
            catch_up.last_run_date()
        ),
        n => format!(
            "Added {} for {n} missed {weekday}(s), the balance is now {}",
            tracker.allowance().amount().display(),
            tracker.balance().await?.display()
        ),
    };
    Ok(Out::new(message, catch_up))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{date, TestEnv};

    #[tokio::test]
    async fn test_allowance() {
        let env = TestEnv::new(date(2024, 6, 3)).await;
        let out = allowance(&env.tracker()).await.unwrap();
        assert_eq!(out.structure().unwrap().missed(), 0);

        env.clock().set(date(2024, 6, 18));
        let out = allowance(&env.tracker()).await.unwrap();
        assert_eq!(
            out.message(),
            "Added $50.00 for 3 missed Tue(s), the balance is now $150.00"
        );
        assert_eq!(env.state_text().await, r#"{"last_run_date":"2024-06-18"}"#);

        let out = allowance(&env.tracker()).await.unwrap();
        assert_eq!(
            out.message(),
            "No allowance is due, it was last updated 2024-06-18"
        );
    }
}
