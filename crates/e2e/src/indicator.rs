//! Observable UI state used as proxies for "the action worked"
//!
//! The UI driver exposes three reads (location, page heading, dialog
//! heading). Any of them can fail spuriously while the page re-renders;
//! that failure is [`StaleRead`] and callers retry it on the next tick.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An element vanished between its visibility check and the text read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stale read of {what}: {detail}")]
pub struct StaleRead {
    pub what: &'static str,
    pub detail: String,
}

impl StaleRead {
    pub fn new(what: &'static str, detail: impl Into<String>) -> Self {
        Self {
            what,
            detail: detail.into(),
        }
    }
}

/// Read-only view of the UI under test
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Current route or URL
    async fn current_location(&self) -> Result<String, StaleRead>;

    /// Text of the rendered page heading, if one is visible
    async fn primary_heading_text(&self) -> Result<Option<String>, StaleRead>;

    /// Text of the heading of an open dialog/overlay, if one is visible
    async fn overlay_heading_text(&self) -> Result<Option<String>, StaleRead>;
}

/// Point-in-time capture of all indicators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub location: String,
    pub primary_heading: Option<String>,
    pub overlay_heading: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    pub fn new(
        location: impl Into<String>,
        primary_heading: Option<&str>,
        overlay_heading: Option<&str>,
    ) -> Self {
        Self {
            location: location.into(),
            primary_heading: primary_heading.map(str::to_string),
            overlay_heading: overlay_heading.map(str::to_string),
            captured_at: Utc::now(),
        }
    }

    /// Capture every indicator; any stale read fails the whole capture
    pub async fn capture<S: IndicatorSource + ?Sized>(source: &S) -> Result<Self, StaleRead> {
        let location = source.current_location().await?;
        let primary_heading = normalize(source.primary_heading_text().await?);
        let overlay_heading = normalize(source.overlay_heading_text().await?);

        Ok(Self {
            location,
            primary_heading,
            overlay_heading,
            captured_at: Utc::now(),
        })
    }

    /// Headings present in this snapshot, page heading first
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.primary_heading
            .as_deref()
            .into_iter()
            .chain(self.overlay_heading.as_deref())
    }

    /// One-line rendering for failure messages
    pub fn describe(&self) -> String {
        format!(
            "location={} heading={} overlay={}",
            self.location,
            quote(self.primary_heading.as_deref()),
            quote(self.overlay_heading.as_deref()),
        )
    }
}

/// Trim heading text; blank text counts as no heading
pub(crate) fn normalize(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn quote(text: Option<&str>) -> String {
    match text {
        Some(t) => format!("{:?}", t),
        None => "-".to_string(),
    }
}
