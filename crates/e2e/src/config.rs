//! Harness configuration

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::expectation::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "ADMINWEB_E2E_CONFIG";

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Admin console entry URL
    pub base_url: String,

    /// Base URL of the side-channel record API
    pub api_base_url: String,

    /// Transition oracle timing
    pub oracle: OracleConfig,

    /// Fixture lifecycle timing and key range
    pub fixtures: FixtureConfig,

    /// Record API endpoints and headers
    pub api: ApiConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://admin-web-dev.itguru.am/home".to_string(),
            api_base_url: "https://adminopenapi-dev.itguru.am".to_string(),
            oracle: OracleConfig::default(),
            fixtures: FixtureConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Wait for a seeded record to show up in the list
    pub visible_timeout_ms: u64,

    /// Wait for a deleted record to leave the list
    pub gone_timeout_ms: u64,

    /// Wait for a row during primary key resolution
    pub resolve_timeout_ms: u64,

    pub poll_interval_ms: u64,

    /// Inclusive range business keys are drawn from
    pub key_min: u64,
    pub key_max: u64,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            visible_timeout_ms: 10_000,
            gone_timeout_ms: 10_000,
            resolve_timeout_ms: 15_000,
            poll_interval_ms: 250,
            key_min: 10_000_000,
            key_max: 99_999_999,
        }
    }
}

impl FixtureConfig {
    pub fn visible_timeout(&self) -> Duration {
        Duration::from_millis(self.visible_timeout_ms)
    }

    pub fn gone_timeout(&self) -> Duration {
        Duration::from_millis(self.gone_timeout_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub create_path: String,
    pub delete_path: String,

    /// Sent as the `Origin` header when set
    pub origin: Option<String>,

    /// Sent as `Authorization: Bearer <token>` when set
    pub bearer_token: Option<String>,

    /// Extra headers added to every request
    pub headers: BTreeMap<String, String>,

    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            create_path: "/api/CommunicationDictionary/addDictionaries".to_string(),
            delete_path: "/api/CommunicationDictionary/deleteDictionaries".to_string(),
            origin: Some("https://admin-web-dev.itguru.am".to_string()),
            bearer_token: None,
            headers: BTreeMap::new(),
            request_timeout_ms: 30_000,
        }
    }
}

impl HarnessConfig {
    pub fn from_toml_str(content: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// File from `ADMINWEB_E2E_CONFIG` (or defaults), then env overrides
    pub fn load() -> E2eResult<Self> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                debug!("Loading harness config from {:?}", path);
                Self::from_file(Path::new(&path))?
            }
            None => Self::default(),
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BASE_URL`, `API_BASE_URL`, `API_TOKEN` and
    /// `E2E_TRANSITION_TIMEOUT_MS` as read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = lookup("API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(token) = lookup("API_TOKEN") {
            let token = token.trim().to_string();
            if !token.is_empty() && token != "null" {
                self.api.bearer_token = Some(token);
            }
        }
        if let Some(ms) = lookup("E2E_TRANSITION_TIMEOUT_MS") {
            self.oracle.timeout_ms = ms.trim().parse().map_err(|_| {
                E2eError::Config(format!("E2E_TRANSITION_TIMEOUT_MS is not a number: {}", ms))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.oracle.poll_interval_ms == 0 || self.fixtures.poll_interval_ms == 0 {
            return Err(E2eError::Config("poll interval must be non-zero".to_string()));
        }
        if self.oracle.poll_interval_ms > self.oracle.timeout_ms {
            return Err(E2eError::Config(format!(
                "oracle poll interval {} ms exceeds timeout {} ms",
                self.oracle.poll_interval_ms, self.oracle.timeout_ms
            )));
        }
        let f = &self.fixtures;
        let shortest = f.visible_timeout_ms.min(f.gone_timeout_ms).min(f.resolve_timeout_ms);
        if f.poll_interval_ms > shortest {
            return Err(E2eError::Config(format!(
                "fixture poll interval {} ms exceeds timeout {} ms",
                f.poll_interval_ms, shortest
            )));
        }
        if f.key_min > f.key_max {
            return Err(E2eError::Config(format!(
                "empty business key range {}..={}",
                f.key_min, f.key_max
            )));
        }
        Ok(())
    }
}
