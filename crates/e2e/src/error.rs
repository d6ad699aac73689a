//! Error types for AdminWeb E2E verification

use thiserror::Error;

use crate::indicator::IndicatorSnapshot;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error(
        "Expected transition did not happen within {timeout_ms} ms\n  before: {}\n  after:  {}",
        .baseline.describe(),
        describe_last(.last)
    )]
    TransitionTimeout {
        baseline: IndicatorSnapshot,
        last: Option<IndicatorSnapshot>,
        timeout_ms: u64,
    },

    #[error("Indicators could not be read after {attempts} attempts")]
    StaleIndicators { attempts: usize },

    #[error("Fixture '{business_key}' did not appear in the list within {waited_ms} ms")]
    FixtureNotVisible {
        business_key: String,
        waited_ms: u64,
    },

    #[error("Fixture '{business_key}' was still listed after {waited_ms} ms")]
    FixtureStillVisible {
        business_key: String,
        waited_ms: u64,
    },

    #[error("Record API {op} failed with status {status}: {body}")]
    WriteApi {
        op: &'static str,
        status: u16,
        body: String,
    },

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Whether this failure invalidates the premise of the running test.
    ///
    /// Cleanup-only failures are the record API delete and UI errors raised
    /// while looking rows up for teardown; the lifecycle manager logs those
    /// instead of returning them.
    pub fn is_premise_failure(&self) -> bool {
        matches!(
            self,
            E2eError::TransitionTimeout { .. }
                | E2eError::FixtureNotVisible { .. }
                | E2eError::FixtureStillVisible { .. }
                | E2eError::WriteApi { op: "create", .. }
        )
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

fn describe_last(last: &Option<IndicatorSnapshot>) -> String {
    last.as_ref()
        .map(IndicatorSnapshot::describe)
        .unwrap_or_else(|| "none observed".to_string())
}
