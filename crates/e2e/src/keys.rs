//! Business keys: generation and lookup of the matching primary key

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::FixtureConfig;
use crate::error::{E2eError, E2eResult};
use crate::list::ListView;

/// Outcome of a primary key lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(i64),
    /// No row for the key rendered within the timeout
    NotFound,
    /// The row is listed but its identifier cell is not a primary key
    Unreadable,
}

/// Resolves backend primary keys by scanning the rendered list
pub struct BusinessKeyIndex<'a, L: ?Sized> {
    list: &'a L,
    timeout: Duration,
    poll_interval: Duration,
}

impl<'a, L: ListView + ?Sized> BusinessKeyIndex<'a, L> {
    pub fn new(list: &'a L, config: &FixtureConfig) -> Self {
        Self {
            list,
            timeout: config.resolve_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    pub async fn resolve_primary_key(&self, business_key: &str) -> Resolution {
        let row = match self
            .list
            .wait_row_visible(business_key, self.timeout, self.poll_interval)
            .await
        {
            Some(row) => row,
            None => {
                debug!("No row for business key '{}'", business_key);
                return Resolution::NotFound;
            }
        };

        match row.primary_key() {
            Some(id) => Resolution::Found(id),
            None => {
                warn!(
                    "Row for business key '{}' has a non-numeric identifier '{}'",
                    business_key, row.identifier
                );
                Resolution::Unreadable
            }
        }
    }
}

/// Draws business keys from a wide random range
///
/// Concurrent runs against the shared backend rely on the range being
/// wide; a single generator additionally never repeats a key.
pub struct KeyGenerator {
    min: u64,
    max: u64,
    state: Mutex<KeyState>,
}

struct KeyState {
    rng: StdRng,
    issued: HashSet<u64>,
}

impl KeyGenerator {
    pub fn new(config: &FixtureConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Deterministic sequence, for tests
    pub fn seeded(config: &FixtureConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: &FixtureConfig, rng: StdRng) -> Self {
        Self {
            min: config.key_min,
            max: config.key_max,
            state: Mutex::new(KeyState {
                rng,
                issued: HashSet::new(),
            }),
        }
    }

    pub fn next_key(&self) -> E2eResult<String> {
        let capacity = self.max.saturating_sub(self.min).saturating_add(1);
        let mut state = self.state.lock();
        if state.issued.len() as u64 >= capacity {
            return Err(E2eError::Config(format!(
                "business key range {}..={} exhausted",
                self.min, self.max
            )));
        }

        loop {
            let candidate = state.rng.gen_range(self.min..=self.max);
            if state.issued.insert(candidate) {
                return Ok(candidate.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::StaleRead;
    use crate::list::ListRow;
    use async_trait::async_trait;

    struct StaticList(Vec<ListRow>);

    #[async_trait]
    impl ListView for StaticList {
        async fn open(&self) -> E2eResult<()> {
            Ok(())
        }

        async fn rows(&self) -> Result<Vec<ListRow>, StaleRead> {
            Ok(self.0.clone())
        }
    }

    fn config() -> FixtureConfig {
        FixtureConfig {
            resolve_timeout_ms: 500,
            poll_interval_ms: 100,
            ..FixtureConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_identifier_column() {
        let list = StaticList(vec![ListRow::new("11111111", "17"), ListRow::new("22222222", "18")]);
        let index = BusinessKeyIndex::new(&list, &config());
        assert_eq!(index.resolve_primary_key("22222222").await, Resolution::Found(18));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_row_is_not_found() {
        let list = StaticList(vec![ListRow::new("111111110", "17")]);
        let index = BusinessKeyIndex::new(&list, &config());

        let started = tokio::time::Instant::now();
        assert_eq!(index.resolve_primary_key("11111111").await, Resolution::NotFound);
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn garbage_identifier_is_unreadable_not_missing() {
        let list = StaticList(vec![ListRow::new("11111111", "n/a")]);
        let index = BusinessKeyIndex::new(&list, &config());
        assert_eq!(index.resolve_primary_key("11111111").await, Resolution::Unreadable);
    }

    #[test]
    fn keys_stay_in_range_and_never_repeat() {
        let gen = KeyGenerator::seeded(&FixtureConfig::default(), 7);
        let keys: Vec<String> = (0..500).map(|_| gen.next_key().unwrap()).collect();
        let unique: HashSet<&String> = keys.iter().collect();

        assert_eq!(unique.len(), keys.len());
        for key in &keys {
            assert_eq!(key.len(), 8);
            let n: u64 = key.parse().unwrap();
            assert!((10_000_000..=99_999_999).contains(&n));
        }
    }

    #[test]
    fn tiny_range_is_exhausted() {
        let config = FixtureConfig {
            key_min: 1,
            key_max: 3,
            ..FixtureConfig::default()
        };
        let gen = KeyGenerator::seeded(&config, 1);
        let mut keys: Vec<String> = (0..3).map(|_| gen.next_key().unwrap()).collect();
        keys.sort();
        assert_eq!(keys, vec!["1", "2", "3"]);
        assert!(matches!(gen.next_key(), Err(E2eError::Config(_))));
    }
}
