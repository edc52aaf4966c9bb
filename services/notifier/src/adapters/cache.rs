//! services/notifier/src/adapters/cache.rs
//!
//! Tracks a generation counter per cached query key. Invalidating a key bumps
//! its generation, which is how readers of the cache notice stale data.

use roster_notify_core::ports::CacheInvalidator;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Default)]
pub struct QueryCache {
    generations: Mutex<HashMap<String, u64>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self, key: &str) -> u64 {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

impl CacheInvalidator for QueryCache {
    fn invalidate(&self, key: &str) {
        let mut generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = generations.entry(key.to_string()).or_insert(0);
        *generation += 1;
        debug!("Cache key '{}' invalidated (generation {})", key, generation);
    }
}
