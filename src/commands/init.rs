use crate::commands::Out;
use crate::{Config, Result, Tracker};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where `init` put things.
#[derive(Debug, Clone, Serialize)]
pub struct Initialized {
    pub config_path: PathBuf,
    pub transactions_path: PathBuf,
    pub state_path: PathBuf,
}

/// Creates the data directory and `config.json`, then creates the ledger and the run state if they
/// do not exist yet.
///
/// # Arguments
/// - `allowance_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/allowance`
/// - `transactions_path` - An optional location for the ledger CSV. An existing ledger at this
///   location is used as it is.
/// - `state_path` - An optional location for the run-state JSON. An existing run state at this
///   location is used as it is.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(
    allowance_home: &Path,
    transactions_path: Option<&Path>,
    state_path: Option<&Path>,
) -> Result<Out<Initialized>> {
    let config = Config::create(
        allowance_home,
        transactions_path.map(Path::to_path_buf),
        state_path.map(Path::to_path_buf),
    )
    .await?;
    Tracker::from_config(&config).ensure_initialized().await?;

    let initialized = Initialized {
        config_path: config.config_path().to_path_buf(),
        transactions_path: config.transactions_path(),
        state_path: config.state_path(),
    };
    Ok(Out::new(
        format!(
            "Successfully set up '{}', the ledger is '{}'",
            config.root().display(),
            initialized.transactions_path.display()
        ),
        initialized,
    ))
}
