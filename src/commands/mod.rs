//! Command handlers for the allowance CLI.
//!
//! Every handler except `init` starts by calling `Tracker::start`, so missed allowances are always
//! credited before a balance is shown or a transaction is recorded.

mod add;
mod allowance;
mod balance;
mod export;
mod history;
mod init;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use allowance::allowance;
pub use balance::balance;
pub use export::export;
pub use history::{history, HistoryTable};
pub use init::{init, Initialized};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line or any other front end.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Puts `items` in the requested order without touching the caller's copy.
fn ordered<T: Clone>(items: &[T], order: crate::args::Order) -> Vec<T> {
    let mut items = items.to_vec();
    if order == crate::args::Order::Newest {
        items.reverse();
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Order;

    #[test]
    fn test_out() {
        let out = Out::new("with data", vec![1, 2]);
        assert_eq!(out.message(), "with data");
        assert_eq!(out.structure(), Some(&vec![1, 2]));
    }

    #[test]
    fn test_ordered() {
        let items = [1, 2, 3];
        assert_eq!(ordered(&items, Order::Oldest), vec![1, 2, 3]);
        assert_eq!(ordered(&items, Order::Newest), vec![3, 2, 1]);
        assert_eq!(items, [1, 2, 3]);
    }
}
