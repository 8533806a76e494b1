//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::clock::FixedClock;
use crate::{Config, Tracker};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test environment that sets up an allowance home directory with a Config and a clock that only
/// moves when told to. Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    clock: FixedClock,
}

impl TestEnv {
    /// Creates a test environment with default settings. Nothing but `config.json` exists until a
    /// `Tracker` is started.
    pub async fn new(today: NaiveDate) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("allowance");
        let config = Config::create(&root, None, None).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
            clock: FixedClock::new(today),
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// The clock used by every `Tracker` from this environment.
    pub fn clock(&self) -> &FixedClock {
        &self.clock
    }

    /// A file-backed `Tracker` using this environment's clock.
    pub fn tracker(&self) -> Tracker {
        Tracker::from_config_with_clock(&self.config, Arc::new(self.clock.clone()))
    }

    /// The raw text of the ledger file.
    pub async fn ledger_text(&self) -> String {
        crate::utils::read(&self.config.transactions_path())
            .await
            .unwrap()
    }

    /// The raw text of the run-state file.
    pub async fn state_text(&self) -> String {
        crate::utils::read(&self.config.state_path()).await.unwrap()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
