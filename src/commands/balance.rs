use crate::commands::Out;
use crate::model::Amount;
use crate::{Result, Tracker};

/// Reports the current balance.
pub async fn balance(tracker: &Tracker) -> Result<Out<Amount>> {
    tracker.start().await?;
    let balance = tracker.balance().await?;
    Ok(Out::new(
        format!("Current balance: {}", balance.display()),
        balance,
    ))
}
