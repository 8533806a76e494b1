//! These structs provide the CLI interface for the allowance CLI.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// allowance: A command-line ledger with a weekly allowance.
///
/// The ledger is a CSV file of dated transactions with a running balance. Every Tuesday (or the
/// day of your choosing) an allowance is due. Whenever you run this program, it first credits any
/// allowances that were missed since the last time it ran, then does what you asked.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file, the ledger and the run state.
    ///
    /// This is the first command you should run. By default everything is kept in
    /// $HOME/allowance; pass --allowance-home to keep it somewhere else. If you already have a
    /// transactions.csv and state.json, point --transactions-path and --state-path at them and
    /// they will be used as they are.
    Init(InitArgs),
    /// Show the current balance.
    Balance,
    /// Show every transaction.
    History(HistoryArgs),
    /// Add a transaction. Use a negative amount to subtract.
    Add(AddArgs),
    /// Credit any allowances that are due and report how many there were.
    Allowance,
    /// Write the transaction history to a CSV file.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and configuration are held. Defaults to ~/allowance
    #[arg(long, env = "ALLOWANCE_HOME", default_value_t = default_allowance_home())]
    allowance_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, allowance_home: PathBuf) -> Self {
        Self {
            log_level,
            allowance_home: allowance_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn allowance_home(&self) -> &DisplayPath {
        &self.allowance_home
    }
}

/// (Not shown): Args for the `allowance init` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct InitArgs {
    /// Where to keep the ledger CSV, absolute or relative to the allowance home. Defaults to
    /// transactions.csv
    #[arg(long)]
    transactions_path: Option<PathBuf>,

    /// Where to keep the run-state JSON, absolute or relative to the allowance home. Defaults to
    /// state.json
    #[arg(long)]
    state_path: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(transactions_path: Option<PathBuf>, state_path: Option<PathBuf>) -> Self {
        Self {
            transactions_path,
            state_path,
        }
    }

    pub fn transactions_path(&self) -> Option<&Path> {
        self.transactions_path.as_deref()
    }

    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }
}

/// The order in which history is listed.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Oldest first, the order in which transactions were recorded.
    #[default]
    Oldest,
    /// Newest first.
    Newest,
}

serde_plain::derive_display_from_serialize!(Order);
serde_plain::derive_fromstr_from_deserialize!(Order);

/// (Not shown): Args for the `allowance history` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct HistoryArgs {
    /// Which end of the history to list first.
    #[arg(long, value_enum, default_value_t = Order::Oldest)]
    order: Order,
}

impl HistoryArgs {
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

/// (Not shown): Args for the `allowance add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// What the transaction was for, e.g. "Birthday money" or "Video game".
    #[arg(long)]
    description: String,

    /// The amount, e.g. 20 or -12.50. Negative amounts are subtracted from the balance.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
}

impl AddArgs {
    pub fn new(description: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// (Not shown): Args for the `allowance export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The CSV file to write. It is replaced if it exists.
    #[arg(long)]
    output: PathBuf,

    /// Which end of the history to write first.
    #[arg(long, value_enum, default_value_t = Order::Oldest)]
    order: Order,
}

impl ExportArgs {
    pub fn new(output: impl Into<PathBuf>, order: Order) -> Self {
        Self {
            output: output.into(),
            order,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

fn default_allowance_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("allowance"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --allowance-home or ALLOWANCE_HOME instead of relying on the \
                default allowance home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("allowance")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
