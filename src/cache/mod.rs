//! Response caching for validation requests.
//!
//! Successful response bodies are cached under a request fingerprint with
//! an absolute TTL and least-recently-used eviction. Expiry is checked on
//! access; there is no background sweeper. With caching disabled the
//! cache degrades to no-ops.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::ConfigStore;

/// Default maximum number of cached responses.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default time-to-live for a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Tuning for the response cache.
#[derive(Debug, Clone)]
pub struct CacheTuning {
    /// Maximum number of entries retained.
    pub capacity: usize,
    /// Absolute lifetime of an entry, measured from insertion.
    pub ttl: Duration,
}

impl Default for CacheTuning {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl CacheTuning {
    /// Creates tuning with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Computes the cache fingerprint for a request.
///
/// The endpoint and payload are digested together, so equal payloads sent
/// to different endpoints never collide.
pub fn request_fingerprint(endpoint: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(b":");
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    // Keys ordered most-recently-used first; always mirrors `entries`.
    recency: VecDeque<String>,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        if let Some(position) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(position);
        }
        self.recency.push_front(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(position) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(position);
        }
    }
}

/// LRU cache of successful validation responses.
pub struct ResponseCache {
    config: Arc<ConfigStore>,
    tuning: CacheTuning,
    state: Mutex<CacheState>,
}

impl ResponseCache {
    /// Creates an empty cache.
    pub fn new(config: Arc<ConfigStore>, tuning: CacheTuning) -> Self {
        Self {
            config,
            tuning,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Looks up a fresh entry, promoting it to most recently used.
    ///
    /// An expired entry is removed on the spot and reported as a miss.
    /// Returns `None` whenever caching is disabled.
    pub fn lookup(&self, key: &str) -> Option<String> {
        if !self.config.current().enable_caching {
            return None;
        }

        let mut state = self.state.lock().ok()?;
        let entry = state.entries.get(key)?.clone();
        if entry.is_expired() {
            state.remove(key);
            debug!(key, "Cache entry expired");
            return None;
        }

        state.touch(key);
        debug!(key, "Cache hit");
        Some(entry.value)
    }

    /// Stores a response body, evicting least-recently-used entries when
    /// the cache is over capacity. A no-op while caching is disabled.
    pub fn store(&self, key: &str, value: String) {
        if !self.config.current().enable_caching {
            return;
        }

        if let Ok(mut state) = self.state.lock() {
            let entry = CacheEntry {
                value,
                expires_at: Utc::now()
                    + chrono::Duration::from_std(self.tuning.ttl)
                        .unwrap_or_else(|_| chrono::Duration::seconds(i64::MAX / 1_000)),
            };
            state.entries.insert(key.to_string(), entry);
            state.touch(key);

            while state.entries.len() > self.tuning.capacity {
                if let Some(oldest) = state.recency.pop_back() {
                    state.entries.remove(&oldest);
                    debug!(key = %oldest, "Evicted least recently used cache entry");
                } else {
                    break;
                }
            }
        }
    }

    /// Number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.entries.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
            state.recency.clear();
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("tuning", &self.tuning)
            .field("len", &self.len())
            .finish()
    }
}
