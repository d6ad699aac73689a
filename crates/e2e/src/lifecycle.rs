//! Fixture lifecycle: seed, verify, rekey, tear down
//!
//! ```text
//!   seed ──► Created ──verify_visible──► VerifiedInUi ──teardown──► Deleted
//!              ▲                              │
//!              └────────── rekey ─────────────┘
//!   confirm_absent (after a UI delete) ─────────────────────────► Deleted
//! ```
//!
//! Teardown never fails the calling test. Problems are logged and
//! summarised in the returned [`TeardownReport`].

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::FixtureConfig;
use crate::error::{E2eError, E2eResult};
use crate::fixture::{Fixture, FixtureSet, RecordTemplate};
use crate::keys::{BusinessKeyIndex, KeyGenerator, Resolution};
use crate::list::ListView;
use crate::records::RecordWriteApi;

/// What a teardown did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    /// Primary keys removed by the batch delete
    pub deleted: Vec<i64>,
    /// Business keys that no longer had a row
    pub absent: Vec<String>,
    /// Primary keys whose delete request failed
    pub failed: Vec<i64>,
    /// Business keys left live because their primary key could not be determined
    pub unresolved: Vec<String>,
    pub error: Option<String>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unresolved.is_empty() && self.error.is_none()
    }

    fn note_error(&mut self, message: String) {
        self.error = Some(match self.error.take() {
            Some(earlier) => format!("{}; {}", earlier, message),
            None => message,
        });
    }
}

/// Fixture set handed to a [`FixtureManager::bracket`] body
pub type SharedFixtureSet = Arc<Mutex<FixtureSet>>;

pub struct FixtureManager<'a> {
    api: &'a dyn RecordWriteApi,
    list: &'a dyn ListView,
    keys: KeyGenerator,
    config: FixtureConfig,
}

impl<'a> FixtureManager<'a> {
    pub fn new(api: &'a dyn RecordWriteApi, list: &'a dyn ListView, config: FixtureConfig) -> Self {
        Self {
            api,
            list,
            keys: KeyGenerator::new(&config),
            config,
        }
    }

    pub fn with_key_generator(mut self, keys: KeyGenerator) -> Self {
        self.keys = keys;
        self
    }

    /// Create `count` records in one API call
    pub async fn seed<R>(&self, count: usize, template: &R) -> E2eResult<FixtureSet>
    where
        R: RecordTemplate + ?Sized,
    {
        let mut set = FixtureSet::new();
        if count == 0 {
            return Ok(set);
        }

        let mut keys = Vec::with_capacity(count);
        let mut payloads = Vec::with_capacity(count);
        for ordinal in 1..=count {
            let key = self.keys.next_key()?;
            payloads.push(template.render(&key, ordinal));
            keys.push(key);
        }

        self.api.create(&payloads).await?;

        for (key, payload) in keys.into_iter().zip(payloads) {
            set.push(Fixture::created(key, payload));
        }
        info!("Seeded {} fixture(s): {:?}", set.len(), set.business_keys());
        Ok(set)
    }

    /// Wait for every live fixture to be listed; the first missing one fails
    pub async fn verify_visible(&self, set: &mut FixtureSet) -> E2eResult<()> {
        if set.surviving().next().is_none() {
            return Ok(());
        }
        self.list.open().await?;

        for fixture in set.iter_mut().filter(|f| !f.is_deleted()) {
            let row = self
                .list
                .wait_row_visible(
                    fixture.business_key(),
                    self.config.visible_timeout(),
                    self.config.poll_interval(),
                )
                .await
                .ok_or_else(|| E2eError::FixtureNotVisible {
                    business_key: fixture.business_key().to_string(),
                    waited_ms: self.config.visible_timeout_ms,
                })?;

            if let Some(id) = row.primary_key() {
                if !fixture.resolve_primary_key(id) {
                    warn!(
                        "Fixture '{}' listed with id {} but {:?} was resolved earlier",
                        fixture.business_key(),
                        id,
                        fixture.primary_key()
                    );
                }
            }
            fixture.mark_verified();
            debug!(
                "Fixture '{}' visible (id {:?})",
                fixture.business_key(),
                fixture.primary_key()
            );
        }
        Ok(())
    }

    /// Follow a rename done through the UI
    pub fn rekey(&self, fixture: &mut Fixture, new_business_key: impl Into<String>) {
        let new_key = new_business_key.into();
        if fixture.is_deleted() {
            warn!(
                "Ignoring rekey of deleted fixture '{}' to '{}'",
                fixture.business_key(),
                new_key
            );
            return;
        }
        if fixture.business_key() == new_key {
            return;
        }
        info!("Fixture '{}' renamed to '{}'", fixture.business_key(), new_key);
        fixture.rekey(new_key);
    }

    /// Wait for the fixture's row to leave the current list, then mark it deleted
    pub async fn confirm_absent(&self, fixture: &mut Fixture) -> E2eResult<()> {
        let gone = self
            .list
            .wait_row_gone(
                fixture.business_key(),
                self.config.gone_timeout(),
                self.config.poll_interval(),
            )
            .await;

        if !gone {
            return Err(E2eError::FixtureStillVisible {
                business_key: fixture.business_key().to_string(),
                waited_ms: self.config.gone_timeout_ms,
            });
        }
        fixture.mark_deleted();
        debug!("Fixture '{}' confirmed absent", fixture.business_key());
        Ok(())
    }

    /// Delete every surviving fixture with a single batch call
    ///
    /// A fixture is only marked `Deleted` once the delete succeeded or its
    /// row was proven missing. Fixtures whose primary key could not be
    /// determined stay live and are listed in [`TeardownReport::unresolved`].
    pub async fn teardown(&self, set: &mut FixtureSet) -> TeardownReport {
        let mut report = TeardownReport::default();
        if set.surviving().next().is_none() {
            return report;
        }

        let mut list_open = true;
        if set.surviving().any(|f| f.primary_key().is_none()) {
            if let Err(e) = self.list.open().await {
                error!("Could not open list for key resolution: {}", e);
                report.note_error(e.to_string());
                list_open = false;
            }
        }

        let index = BusinessKeyIndex::new(self.list, &self.config);
        let mut batch: Vec<usize> = Vec::new();
        for (i, fixture) in set.iter_mut().enumerate() {
            if fixture.is_deleted() {
                continue;
            }
            if fixture.primary_key().is_some() {
                batch.push(i);
                continue;
            }
            if !list_open {
                report.unresolved.push(fixture.business_key().to_string());
                continue;
            }
            match index.resolve_primary_key(fixture.business_key()).await {
                Resolution::Found(id) => {
                    fixture.resolve_primary_key(id);
                    batch.push(i);
                }
                Resolution::NotFound => {
                    warn!(
                        "No row for fixture '{}' during cleanup; treating it as already deleted",
                        fixture.business_key()
                    );
                    fixture.mark_deleted();
                    report.absent.push(fixture.business_key().to_string());
                }
                Resolution::Unreadable => {
                    error!(
                        "Fixture '{}' listed without a readable id; left for a later cleanup",
                        fixture.business_key()
                    );
                    report.note_error(format!(
                        "id of fixture '{}' could not be read",
                        fixture.business_key()
                    ));
                    report.unresolved.push(fixture.business_key().to_string());
                }
            }
        }

        let ids: Vec<i64> = batch
            .iter()
            .filter_map(|&i| set.get(i).and_then(Fixture::primary_key))
            .collect();
        if ids.is_empty() {
            return report;
        }

        match self.api.delete(&ids).await {
            Ok(()) => {
                for &i in &batch {
                    if let Some(fixture) = set.get_mut(i) {
                        fixture.mark_deleted();
                    }
                }
                info!("Cleaned up fixture id(s) {:?}", ids);
                report.deleted = ids;
            }
            Err(e) => {
                error!("Cleanup delete of {:?} failed: {}", ids, e);
                report.failed = ids;
                report.note_error(e.to_string());
            }
        }
        report
    }

    /// Seed, verify, run `body`, and always tear down
    ///
    /// `body` gets a handle to the set, so cleanup sees every rekey and
    /// confirmed UI deletion it made, even when it panics. Its result is
    /// returned untouched by cleanup; a panic resumes after cleanup.
    pub async fn bracket<T, R, F, Fut>(&self, count: usize, template: &R, body: F) -> E2eResult<T>
    where
        R: RecordTemplate + ?Sized,
        F: FnOnce(SharedFixtureSet) -> Fut,
        Fut: Future<Output = E2eResult<T>>,
    {
        let mut set = self.seed(count, template).await?;
        if let Err(e) = self.verify_visible(&mut set).await {
            self.teardown(&mut set).await;
            return Err(e);
        }

        let shared = Arc::new(Mutex::new(set));
        let handle = Arc::clone(&shared);
        let outcome = AssertUnwindSafe(async move { body(handle).await })
            .catch_unwind()
            .await;
        if outcome.is_err() {
            warn!("Test body panicked; cleaning up fixtures");
        }

        let mut set = std::mem::take(&mut *shared.lock());
        self.teardown(&mut set).await;

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
