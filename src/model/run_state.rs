use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The persisted marker of the date through which the weekly allowance has been applied.
///
/// Serializes as `{"last_run_date":"YYYY-MM-DD"}`. Unknown fields are ignored when reading.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunState {
    pub last_run_date: NaiveDate,
}

impl RunState {
    pub fn new(last_run_date: NaiveDate) -> Self {
        Self { last_run_date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_spaced_json() {
        let state: RunState = serde_json::from_str(r#"{"last_run_date": "2024-06-03"}"#).unwrap();
        assert_eq!(
            state.last_run_date,
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
    }

    #[test]
    fn test_writes_single_key() {
        let state = RunState::new(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"last_run_date":"2024-06-18"}"#
        );
    }

    #[test]
    fn test_missing_key_is_an_error() {
        assert!(serde_json::from_str::<RunState>(r#"{"other": 1}"#).is_err());
        assert!(serde_json::from_str::<RunState>(r#"{"last_run_date": null}"#).is_err());
    }
}
