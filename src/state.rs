//! The run-state store: remembers the date through which the allowance catch-up has been applied.

use crate::clock::Clock;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::RunState;
use crate::storage::StateStorage;
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RunStateStore {
    storage: Box<dyn StateStorage>,
    clock: Arc<dyn Clock>,
}

impl RunStateStore {
    pub fn new(storage: Box<dyn StateStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Returns the persisted last-run date.
    ///
    /// A missing or unparsable state is treated as today, which yields zero missed allowances
    /// instead of over-crediting. Failing to read the storage at all is still an error.
    pub async fn last_run_date(&self) -> Result<NaiveDate> {
        let contents = self
            .storage
            .read()
            .await
            .pub_result(ErrorType::StorageUnavailable)?;
        let today = self.clock.today();
        let Some(contents) = contents else {
            warn!("No allowance run state was found, using today ({today})");
            return Ok(today);
        };
        match serde_json::from_slice::<RunState>(&contents) {
            Ok(state) => Ok(state.last_run_date),
            Err(e) => {
                let contents = String::from_utf8_lossy(&contents);
                warn!("The allowance run state {contents:?} is unreadable ({e}), using today ({today})");
                Ok(today)
            }
        }
    }

    /// Overwrites the persisted last-run date.
    pub async fn set_last_run_date(&self, date: NaiveDate) -> Result<()> {
        let contents = serialize(date).pub_result(ErrorType::StorageUnavailable)?;
        self.storage
            .write(&contents)
            .await
            .pub_result(ErrorType::StorageUnavailable)?;
        debug!("Allowance last run date set to {date}");
        Ok(())
    }

    /// Seeds the run state with today's date if there is none. Returns `true` if it was created.
    pub async fn initialize_if_absent(&self) -> Result<bool> {
        let today = self.clock.today();
        let contents = serialize(today).pub_result(ErrorType::StorageUnavailable)?;
        let created = self
            .storage
            .create(&contents)
            .await
            .pub_result(ErrorType::StorageUnavailable)?;
        if created {
            info!("Created a new allowance run state starting {today}");
        }
        Ok(created)
    }
}

fn serialize(date: NaiveDate) -> Res<String> {
    serde_json::to_string(&RunState::new(date)).context("Unable to serialize the run state")
}
