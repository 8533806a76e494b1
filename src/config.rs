//! Configuration file handling for the allowance tracker.
//!
//! The configuration file is stored at `$ALLOWANCE_HOME/config.json`. It says where the ledger and
//! run-state files live and what the weekly allowance is.

use crate::allowance::{Allowance, ALLOWANCE_AMOUNT, ALLOWANCE_DESCRIPTION, TRIGGER_WEEKDAY};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::Amount;
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const APP_NAME: &str = "allowance";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const TRANSACTIONS_CSV: &str = "transactions.csv";
const STATE_JSON: &str = "state.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$ALLOWANCE_HOME` and from there it loads `$ALLOWANCE_HOME/config.json`. It provides
/// the paths of the ledger and run-state files, which are either configured or expected in a
/// certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and an initial `config.json` if there is none.
    ///
    /// An existing `config.json` is loaded and left as is, in which case `transactions_path` and
    /// `state_path` are ignored.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/allowance`
    /// - `transactions_path` - Where to keep the ledger CSV, absolute or relative to `dir`.
    ///   Defaults to `transactions.csv`. Pointing this at a ledger that already exists adopts it.
    /// - `state_path` - Where to keep the run-state JSON, absolute or relative to `dir`. Defaults
    ///   to `state.json`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        transactions_path: Option<PathBuf>,
        state_path: Option<PathBuf>,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), transactions_path, state_path)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        transactions_path: Option<PathBuf>,
        state_path: Option<PathBuf>,
    ) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the allowance home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        if config_path.is_file() {
            if transactions_path.is_some() || state_path.is_some() {
                warn!(
                    "A config file already exists at '{}', the requested paths are ignored",
                    config_path.display()
                );
            }
            return Self::load_inner(root).await;
        }

        let config_file = ConfigFile {
            transactions_path,
            state_path,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;
        info!("Created the config file '{}'", config_path.display());

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `allowance_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(allowance_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(allowance_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative).await.with_context(|| {
            format!(
                "The allowance home '{}' is missing, run `allowance init` to create it",
                maybe_relative.display()
            )
        })?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run `allowance init` to create it",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        debug!("Loaded the config file '{}'", config_path.display());

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the stored `transactions_path` if it is absolute, otherwise resolves the relative
    /// path against the home directory.
    pub fn transactions_path(&self) -> PathBuf {
        self.resolve(self.config_file.transactions_path())
    }

    /// Returns the stored `state_path` if it is absolute, otherwise resolves the relative path
    /// against the home directory.
    pub fn state_path(&self) -> PathBuf {
        self.resolve(self.config_file.state_path())
    }

    /// The configured allowance, with defaults for anything not set.
    pub fn allowance(&self) -> Allowance {
        Allowance::new(
            self.config_file
                .allowance_amount
                .unwrap_or(Amount::new_plain(ALLOWANCE_AMOUNT)),
            self.config_file.allowance_weekday.unwrap_or(TRIGGER_WEEKDAY),
            self.config_file
                .allowance_description
                .as_deref()
                .unwrap_or(ALLOWANCE_DESCRIPTION),
        )
    }

    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "allowance",
///   "config_version": 1,
///   "transactions_path": "transactions.csv",
///   "state_path": "state.json",
///   "allowance_amount": "50.00",
///   "allowance_weekday": "Tue",
///   "allowance_description": "Weekly Allowance"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "allowance"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the ledger CSV (optional, relative to the home directory or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transactions_path: Option<PathBuf>,

    /// Path to the run-state JSON (optional, relative to the home directory or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_path: Option<PathBuf>,

    /// The amount credited for each missed trigger day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allowance_amount: Option<Amount>,

    /// The trigger day, e.g. "Tue"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allowance_weekday: Option<Weekday>,

    /// The description written on allowance credits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allowance_description: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            transactions_path: None,
            state_path: None,
            allowance_amount: None,
            allowance_weekday: None,
            allowance_description: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: &Path) -> Res<Self> {
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        if let Some(description) = &config.allowance_description {
            anyhow::ensure!(
                !description.trim().is_empty(),
                "Invalid allowance_description in config file: it must not be blank"
            );
        }

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: &Path) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn transactions_path(&self) -> PathBuf {
        self.transactions_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(TRANSACTIONS_CSV))
    }

    fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(STATE_JSON))
    }
}
