//! Types that represent the core data model: `Amount`, `Transaction`, the raw `Row` it is stored
//! as, and the allowance `RunState`.
mod amount;
mod run_state;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat};
pub use run_state::RunState;
pub use transaction::{Entry, Row, Transaction, DATE_FORMAT, HEADERS, STARTING_BALANCE};
