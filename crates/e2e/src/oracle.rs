//! Transition oracle
//!
//! Decides whether a UI action produced one of the expected outcomes.
//! The console offers no "done" signal, so the oracle races two weak
//! signals under one deadline:
//!
//! ```text
//!   baseline ──► action ──► poll every `poll_interval` until `timeout`
//!                             ├── location accepted?        ──► Succeeded(Location)
//!                             ├── page/dialog heading match? ──► Succeeded(Heading)
//!                             ├── stale read                ──► retry next tick
//!                             └── deadline passed           ──► TimedOut(last snapshot)
//! ```

use std::future::Future;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::OracleConfig;
use crate::error::{E2eError, E2eResult};
use crate::expectation::TransitionExpectation;
use crate::indicator::{normalize, IndicatorSnapshot, IndicatorSource, StaleRead};

/// Which signal resolved the wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Location,
    Heading,
}

/// Result of waiting for a transition
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Succeeded {
        matched: IndicatorSnapshot,
        signal: Signal,
    },
    TimedOut {
        last: Option<IndicatorSnapshot>,
    },
}

impl TransitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransitionOutcome::Succeeded { .. })
    }

    /// Turn a timeout into [`E2eError::TransitionTimeout`]
    pub fn into_result(
        self,
        baseline: &IndicatorSnapshot,
        expectation: &TransitionExpectation,
    ) -> E2eResult<IndicatorSnapshot> {
        match self {
            TransitionOutcome::Succeeded { matched, .. } => Ok(matched),
            TransitionOutcome::TimedOut { last } => Err(E2eError::TransitionTimeout {
                baseline: baseline.clone(),
                last,
                timeout_ms: expectation.timeout.as_millis() as u64,
            }),
        }
    }
}

/// Classification of one poll tick
#[derive(Debug)]
enum Tick {
    Match(IndicatorSnapshot, Signal),
    NoMatch(IndicatorSnapshot),
    Transient(StaleRead),
}

pub struct TransitionOracle<'a, S: ?Sized> {
    source: &'a S,
    config: OracleConfig,
}

impl<'a, S: IndicatorSource + ?Sized> TransitionOracle<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, OracleConfig::default())
    }

    pub fn with_config(source: &'a S, config: OracleConfig) -> Self {
        Self { source, config }
    }

    /// Snapshot taken before an action, retrying stale reads
    pub async fn capture_baseline(&self) -> E2eResult<IndicatorSnapshot> {
        let deadline = Instant::now() + self.config.timeout();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match IndicatorSnapshot::capture(self.source).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => debug!("Baseline read {} was stale: {}", attempts, e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(E2eError::StaleIndicators { attempts });
            }
            sleep(self.config.poll_interval().min(deadline - now)).await;
        }
    }

    /// Poll until an acceptable outcome shows up or the deadline passes
    pub async fn await_transition(
        &self,
        baseline: &IndicatorSnapshot,
        expectation: &TransitionExpectation,
    ) -> TransitionOutcome {
        let start = Instant::now();
        let deadline = start + expectation.timeout;
        let mut last: Option<IndicatorSnapshot> = None;
        let mut ticks = 0usize;

        loop {
            ticks += 1;
            match self.check_once(baseline, expectation).await {
                Tick::Match(matched, signal) => {
                    info!(
                        "Transition observed via {:?} after {} ms: {}",
                        signal,
                        start.elapsed().as_millis(),
                        matched.describe()
                    );
                    return TransitionOutcome::Succeeded { matched, signal };
                }
                Tick::NoMatch(snapshot) => last = Some(snapshot),
                Tick::Transient(e) => debug!("Tick {}: {}", ticks, e),
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "No transition after {} ms ({} polls); before: {}",
                    expectation.timeout.as_millis(),
                    ticks,
                    baseline.describe()
                );
                return TransitionOutcome::TimedOut { last };
            }
            sleep(expectation.poll_interval.min(deadline - now)).await;
        }
    }

    /// Capture a baseline, run `action`, then wait for the transition
    pub async fn perform<F, Fut, T>(
        &self,
        expectation: &TransitionExpectation,
        action: F,
    ) -> E2eResult<IndicatorSnapshot>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = E2eResult<T>>,
    {
        let baseline = self.capture_baseline().await?;
        action().await?;
        self.await_transition(&baseline, expectation)
            .await
            .into_result(&baseline, expectation)
    }

    async fn check_once(
        &self,
        baseline: &IndicatorSnapshot,
        expectation: &TransitionExpectation,
    ) -> Tick {
        let location = match self.source.current_location().await {
            Ok(location) => location,
            Err(e) => return Tick::Transient(e),
        };

        // Heading reads are independent: a detached page title must not
        // hide a matching dialog title in the same tick.
        let mut stale = None;
        let primary_heading = match self.source.primary_heading_text().await {
            Ok(text) => normalize(text),
            Err(e) => {
                stale = Some(e);
                None
            }
        };
        let overlay_heading = match self.source.overlay_heading_text().await {
            Ok(text) => normalize(text),
            Err(e) => {
                stale = Some(e);
                None
            }
        };

        let location_accepted = expectation.accepts_location(&baseline.location, &location);
        let snapshot = IndicatorSnapshot {
            location,
            primary_heading,
            overlay_heading,
            captured_at: Utc::now(),
        };

        if location_accepted {
            return Tick::Match(snapshot, Signal::Location);
        }
        if snapshot.headings().any(|h| expectation.accepts_heading(h)) {
            return Tick::Match(snapshot, Signal::Heading);
        }
        match stale {
            Some(e) => Tick::Transient(e),
            None => Tick::NoMatch(snapshot),
        }
    }
}
