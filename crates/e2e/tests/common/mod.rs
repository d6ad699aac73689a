//! In-memory stand-in for the admin console and its record API
//!
//! Records become visible in the list only `render_lag` after creation,
//! UI clicks take effect after a scheduled delay, and reads can be made
//! to fail as stale a number of times.

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

use adminweb_e2e::config::FixtureConfig;
use adminweb_e2e::{
    E2eError, E2eResult, IndicatorSource, KeyGenerator, ListRow, ListView, RecordWriteApi,
    StaleRead,
};

pub const DICTIONARY_LIST_URL: &str = "https://admin.test/payment/dictionary/list";
pub const PROVIDER_LIST_URL: &str = "https://admin.test/payment/provider/list";
pub const MERCHANT_LIST_URL: &str = "https://admin.test/payment/merchant/list";

#[derive(Debug, Clone)]
pub enum UiChange {
    Navigate(String),
    Heading(Option<String>),
    Overlay(Option<String>),
}

#[derive(Debug, Clone)]
struct Record {
    id: i64,
    entry_id: String,
    visible_from: Instant,
}

struct State {
    records: Vec<Record>,
    next_id: i64,
    location: String,
    heading: Option<String>,
    overlay: Option<String>,
    pending: Vec<(Instant, UiChange)>,
    create_calls: Vec<Vec<Value>>,
    delete_calls: Vec<Vec<i64>>,
    fail_create: Option<u16>,
    fail_delete: Option<u16>,
    fail_open: bool,
    unreadable_ids: bool,
    stale_reads: usize,
}

pub struct AdminApp {
    render_lag: Duration,
    state: Mutex<State>,
}

impl AdminApp {
    pub fn new(render_lag: Duration) -> Self {
        adminweb_e2e::logging::init_tracing();
        Self {
            render_lag,
            state: Mutex::new(State {
                records: Vec::new(),
                next_id: 1001,
                location: DICTIONARY_LIST_URL.to_string(),
                heading: Some("Payment Dictionary List".to_string()),
                overlay: None,
                pending: Vec::new(),
                create_calls: Vec::new(),
                delete_calls: Vec::new(),
                fail_create: None,
                fail_delete: None,
                fail_open: false,
                unreadable_ids: false,
                stale_reads: 0,
            }),
        }
    }

    pub fn show_page(&self, location: &str, heading: &str) {
        let mut s = self.state.lock();
        s.location = location.to_string();
        s.heading = Some(heading.to_string());
        s.overlay = None;
    }

    /// A click whose effect renders after `delay`
    pub fn click(&self, delay: Duration, changes: Vec<UiChange>) {
        let at = Instant::now() + delay;
        let mut s = self.state.lock();
        for change in changes {
            s.pending.push((at, change));
        }
    }

    /// The next `n` indicator or row reads fail as stale
    pub fn fail_next_reads(&self, n: usize) {
        self.state.lock().stale_reads = n;
    }

    pub fn fail_create_with(&self, status: u16) {
        self.state.lock().fail_create = Some(status);
    }

    pub fn fail_delete_with(&self, status: u16) {
        self.state.lock().fail_delete = Some(status);
    }

    /// Navigation to the list fails, e.g. the session expired
    pub fn fail_list_open(&self, fail: bool) {
        self.state.lock().fail_open = fail;
    }

    /// Identifier cells render as a placeholder instead of the id
    pub fn hide_identifiers(&self, hide: bool) {
        self.state.lock().unreadable_ids = hide;
    }

    /// Trash icon + confirm, or "Delete selected", for these entry ids
    pub fn ui_delete(&self, entry_ids: &[&str]) {
        self.state
            .lock()
            .records
            .retain(|r| !entry_ids.contains(&r.entry_id.as_str()));
    }

    /// "Edit Selected" changing the entry id of one row
    pub fn ui_edit_entry_id(&self, old: &str, new: &str) {
        let mut s = self.state.lock();
        if let Some(r) = s.records.iter_mut().find(|r| r.entry_id == old) {
            r.entry_id = new.to_string();
        }
    }

    pub fn has_record(&self, entry_id: &str) -> bool {
        self.state.lock().records.iter().any(|r| r.entry_id == entry_id)
    }

    pub fn id_of(&self, entry_id: &str) -> Option<i64> {
        self.state
            .lock()
            .records
            .iter()
            .find(|r| r.entry_id == entry_id)
            .map(|r| r.id)
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn create_calls(&self) -> Vec<Vec<Value>> {
        self.state.lock().create_calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<Vec<i64>> {
        self.state.lock().delete_calls.clone()
    }

    fn read<T>(&self, what: &'static str, f: impl FnOnce(&State) -> T) -> Result<T, StaleRead> {
        let mut s = self.state.lock();
        let now = Instant::now();
        let (due, later): (Vec<_>, Vec<_>) = s.pending.drain(..).partition(|(at, _)| *at <= now);
        s.pending = later;
        for (_, change) in due {
            match change {
                UiChange::Navigate(location) => s.location = location,
                UiChange::Heading(text) => s.heading = text,
                UiChange::Overlay(text) => s.overlay = text,
            }
        }

        if s.stale_reads > 0 {
            s.stale_reads -= 1;
            return Err(StaleRead::new(what, "element detached during read"));
        }
        Ok(f(&s))
    }
}

#[async_trait]
impl IndicatorSource for AdminApp {
    async fn current_location(&self) -> Result<String, StaleRead> {
        self.read("location", |s| s.location.clone())
    }

    async fn primary_heading_text(&self) -> Result<Option<String>, StaleRead> {
        self.read("page heading", |s| s.heading.clone())
    }

    async fn overlay_heading_text(&self) -> Result<Option<String>, StaleRead> {
        self.read("dialog heading", |s| s.overlay.clone())
    }
}

#[async_trait]
impl ListView for AdminApp {
    async fn open(&self) -> E2eResult<()> {
        if self.state.lock().fail_open {
            return Err(E2eError::Ui("login page shown instead of list".to_string()));
        }
        self.show_page(DICTIONARY_LIST_URL, "Payment Dictionary List");
        Ok(())
    }

    async fn rows(&self) -> Result<Vec<ListRow>, StaleRead> {
        let now = Instant::now();
        self.read("table", |s| {
            s.records
                .iter()
                .filter(|r| r.visible_from <= now)
                .map(|r| {
                    let identifier = if s.unreadable_ids {
                        "-".to_string()
                    } else {
                        r.id.to_string()
                    };
                    ListRow::new(r.entry_id.clone(), identifier)
                })
                .collect()
        })
    }
}

#[async_trait]
impl RecordWriteApi for AdminApp {
    async fn create(&self, records: &[Value]) -> E2eResult<()> {
        let mut s = self.state.lock();
        s.create_calls.push(records.to_vec());
        if let Some(status) = s.fail_create {
            return Err(E2eError::WriteApi {
                op: "create",
                status,
                body: "rejected".to_string(),
            });
        }

        let visible_from = Instant::now() + self.render_lag;
        for record in records {
            let entry_id = match &record["entryId"] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let id = s.next_id;
            s.next_id += 1;
            s.records.push(Record {
                id,
                entry_id,
                visible_from,
            });
        }
        Ok(())
    }

    async fn delete(&self, ids: &[i64]) -> E2eResult<()> {
        let mut s = self.state.lock();
        s.delete_calls.push(ids.to_vec());
        if let Some(status) = s.fail_delete {
            return Err(E2eError::WriteApi {
                op: "delete",
                status,
                body: "rejected".to_string(),
            });
        }
        s.records.retain(|r| !ids.contains(&r.id));
        Ok(())
    }
}

/// Short waits so paused-clock tests stay readable
pub fn fast_config() -> FixtureConfig {
    FixtureConfig {
        visible_timeout_ms: 2_000,
        gone_timeout_ms: 2_000,
        resolve_timeout_ms: 1_500,
        poll_interval_ms: 100,
        ..FixtureConfig::default()
    }
}

/// Generator whose range holds exactly one key
pub fn fixed_key(key: u64) -> KeyGenerator {
    let config = FixtureConfig {
        key_min: key,
        key_max: key,
        ..FixtureConfig::default()
    };
    KeyGenerator::seeded(&config, 0)
}
