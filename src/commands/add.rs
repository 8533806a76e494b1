use crate::commands::Out;
use crate::model::Transaction;
use crate::{Result, Tracker};

/// Records a manual transaction. `amount` is the text as typed, e.g. `20` or `-12.50`.
pub async fn add(tracker: &Tracker, description: &str, amount: &str) -> Result<Out<Transaction>> {
    tracker.start().await?;
    let transaction = tracker.add_transaction_str(description, amount).await?;
    let verb = if transaction.amount().is_negative() {
        "Subtracted"
    } else {
        "Added"
    };
    Ok(Out::new(
        format!(
            "{verb} {} for '{}', the balance is now {}",
            transaction.amount().display(),
            transaction.description(),
            transaction.balance().display()
        ),
        transaction,
    ))
}
