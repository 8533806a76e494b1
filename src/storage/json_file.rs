//! Implements `StateStorage` with a small JSON file.

use crate::error::Res;
use crate::storage::StateStorage;
use crate::utils;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// The run state stored at `path`, e.g. `state.json`.
#[derive(Debug, Clone)]
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl StateStorage for JsonStateFile {
    async fn create(&self, contents: &str) -> Res<bool> {
        utils::create_new(&self.path, contents)
            .await
            .context("Unable to create the run-state file")
    }

    async fn read(&self) -> Res<Option<Vec<u8>>> {
        utils::read_if_exists(&self.path).await
    }

    async fn write(&self, contents: &str) -> Res<()> {
        utils::write_atomic(&self.path, contents)
            .await
            .context("Unable to write the run-state file")
    }
}
