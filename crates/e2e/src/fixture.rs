//! Disposable backend records owned by one test

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Lifecycle position of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureState {
    /// Accepted by the record API, not yet seen in the UI
    Created,
    /// Observed as a row in the list view
    VerifiedInUi,
    /// Deleted, or proven absent from the list
    Deleted,
}

/// One seeded record
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    business_key: String,
    retired_keys: Vec<String>,
    primary_key: Option<i64>,
    payload: Value,
    state: FixtureState,
}

impl Fixture {
    pub(crate) fn created(business_key: String, payload: Value) -> Self {
        Self {
            business_key,
            retired_keys: Vec::new(),
            primary_key: None,
            payload,
            state: FixtureState::Created,
        }
    }

    /// Key cleanup and lookups use
    pub fn business_key(&self) -> &str {
        &self.business_key
    }

    /// Keys this fixture had before being renamed; never used for cleanup
    pub fn retired_keys(&self) -> &[String] {
        &self.retired_keys
    }

    pub fn primary_key(&self) -> Option<i64> {
        self.primary_key
    }

    /// Payload sent to the record API at creation
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn state(&self) -> FixtureState {
        self.state
    }

    pub fn is_deleted(&self) -> bool {
        self.state == FixtureState::Deleted
    }

    /// Set the primary key unless one is already resolved.
    /// Returns whether the stored key is now `id`.
    pub(crate) fn resolve_primary_key(&mut self, id: i64) -> bool {
        match self.primary_key {
            None => {
                self.primary_key = Some(id);
                true
            }
            Some(existing) => existing == id,
        }
    }

    pub(crate) fn mark_verified(&mut self) {
        if self.state == FixtureState::Created {
            self.state = FixtureState::VerifiedInUi;
        }
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.state = FixtureState::Deleted;
    }

    /// Adopt `new_key`; the old key is retired and the primary key cleared
    pub(crate) fn rekey(&mut self, new_key: String) {
        let old = std::mem::replace(&mut self.business_key, new_key);
        self.retired_keys.push(old);
        self.primary_key = None;
        self.state = FixtureState::Created;
    }
}

/// Fixtures of one test, in creation order
#[derive(Debug, Clone, Default, Serialize)]
pub struct FixtureSet {
    fixtures: Vec<Fixture>,
}

impl FixtureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, fixture: Fixture) {
        self.fixtures.push(fixture);
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Fixture> {
        self.fixtures.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Fixture> {
        self.fixtures.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fixture> {
        self.fixtures.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Fixture> {
        self.fixtures.iter_mut()
    }

    /// Fixture currently known by `business_key`
    pub fn find(&self, business_key: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.business_key == business_key)
    }

    pub fn find_mut(&mut self, business_key: &str) -> Option<&mut Fixture> {
        self.fixtures.iter_mut().find(|f| f.business_key == business_key)
    }

    /// Current business keys, in creation order
    pub fn business_keys(&self) -> Vec<&str> {
        self.fixtures.iter().map(Fixture::business_key).collect()
    }

    /// Fixtures not yet deleted
    pub fn surviving(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(|f| !f.is_deleted())
    }

    pub fn all_deleted(&self) -> bool {
        self.fixtures.iter().all(Fixture::is_deleted)
    }
}

impl<'a> IntoIterator for &'a FixtureSet {
    type Item = &'a Fixture;
    type IntoIter = std::slice::Iter<'a, Fixture>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixtures.iter()
    }
}

/// Renders the create payload for a fixture
pub trait RecordTemplate: Send + Sync {
    /// `ordinal` counts from 1 within one seed call
    fn render(&self, business_key: &str, ordinal: usize) -> Value;
}

impl<F> RecordTemplate for F
where
    F: Fn(&str, usize) -> Value + Send + Sync,
{
    fn render(&self, business_key: &str, ordinal: usize) -> Value {
        self(business_key, ordinal)
    }
}

/// Payment dictionary item; the business key is the entry id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryItemTemplate {
    pub key_id: String,
    pub lang_id: i64,
    pub behavior: i64,
    pub value_prefix: String,
}

impl Default for DictionaryItemTemplate {
    fn default() -> Self {
        Self {
            key_id: "ProviderType".to_string(),
            lang_id: 2, // English
            behavior: 1,
            value_prefix: "autotest data".to_string(),
        }
    }
}

impl DictionaryItemTemplate {
    /// Values tagged with the name of the test that seeds them
    pub fn for_test(test_name: &str) -> Self {
        Self {
            value_prefix: format!("autotest data for {}", test_name),
            ..Self::default()
        }
    }
}

impl RecordTemplate for DictionaryItemTemplate {
    fn render(&self, business_key: &str, ordinal: usize) -> Value {
        let entry_id = business_key
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(business_key));

        json!({
            "keyId": self.key_id,
            "entryId": entry_id,
            "langId": self.lang_id,
            "value": format!("{} #{}", self.value_prefix, ordinal),
            "behavior": self.behavior,
        })
    }
}
