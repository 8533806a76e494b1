//! A personal ledger with a running balance and a weekly allowance.
//!
//! The ledger is an append-only CSV file of dated transactions. A weekly allowance is credited
//! for every trigger day (Tuesday by default) that passed since the program last ran, so the
//! balance catches up no matter how long it has been since the last session. Use `Tracker` as
//! the entry point.

pub mod allowance;
pub mod args;
pub mod clock;
pub mod commands;
mod config;
mod error;
mod ledger;
pub mod model;
mod state;
pub mod storage;
mod tracker;
mod utils;

#[cfg(test)]
mod test;

pub use allowance::{Allowance, CatchUp};
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use ledger::LedgerStore;
pub use state::RunStateStore;
pub use tracker::Tracker;
