//! List-view contract consumed from the UI driver
//!
//! A list screen renders one row per record with a visible business key
//! column and a visible identifier column. The driver only has to read
//! rows; the bounded waits are provided on top of that read.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::E2eResult;
use crate::indicator::StaleRead;

/// Text of the two columns the harness cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub business_key: String,
    pub identifier: String,
}

impl ListRow {
    pub fn new(business_key: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            business_key: business_key.into(),
            identifier: identifier.into(),
        }
    }

    /// The business key cell holds exactly `key`
    pub fn has_key(&self, key: &str) -> bool {
        self.business_key.trim() == key.trim()
    }

    /// Identifier cell parsed as a primary key
    pub fn primary_key(&self) -> Option<i64> {
        self.identifier.trim().parse().ok()
    }
}

#[async_trait]
pub trait ListView: Send + Sync {
    /// Navigate to (or refresh) the list screen
    async fn open(&self) -> E2eResult<()>;

    /// Rows as currently rendered
    async fn rows(&self) -> Result<Vec<ListRow>, StaleRead>;

    /// Wait until a row with `key` is rendered; `None` once `timeout` passes
    async fn wait_row_visible(
        &self,
        key: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Option<ListRow> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.rows().await {
                Ok(rows) => {
                    if let Some(row) = rows.into_iter().find(|r| r.has_key(key)) {
                        return Some(row);
                    }
                }
                Err(e) => debug!("Row scan for '{}' was stale: {}", key, e),
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            sleep(poll.min(deadline - now)).await;
        }
    }

    /// Wait until no row with `key` is rendered; `false` once `timeout` passes
    async fn wait_row_gone(&self, key: &str, timeout: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.rows().await {
                Ok(rows) if !rows.iter().any(|r| r.has_key(key)) => return true,
                Ok(_) => {}
                Err(e) => debug!("Row scan for '{}' was stale: {}", key, e),
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep(poll.min(deadline - now)).await;
        }
    }
}
