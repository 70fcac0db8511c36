//! Suggestion cache storage.
//!
//! [`CacheStore`] is the seam for plugging in a shared cache. The bundled
//! [`MemoryStore`] keeps entries in a process-local map with per-entry TTL
//! and oldest-first eviction once full.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::key::SuggestionKey;

/// Storage for cached suggestion lists. Last write wins.
pub trait CacheStore: Send + Sync {
    /// Get a live entry.
    fn get(&self, key: &SuggestionKey) -> Option<Vec<String>>;

    /// Store an entry for `ttl`.
    fn set(&self, key: &SuggestionKey, values: Vec<String>, ttl: Duration);

    /// Remove an entry.
    fn delete(&self, key: &SuggestionKey) -> bool;

    /// Remove everything.
    fn clear(&self);

    /// Usage counters.
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

/// A snapshot of cache usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that returned an entry.
    pub hits: u64,
    /// Reads that found nothing live.
    pub misses: u64,
    /// Entries written.
    pub writes: u64,
    /// Entries dropped because their TTL passed.
    pub expirations: u64,
    /// Entries currently stored.
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    values: Vec<String>,
    created_at: Instant,
    // `None` when the TTL is too large to represent; such entries never expire.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process suggestion store.
#[derive(Debug)]
pub struct MemoryStore {
    max_capacity: usize,
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    expirations: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl MemoryStore {
    /// Create a store holding at most `max_capacity` entries.
    pub fn new(max_capacity: usize) -> Self {
        tracing::info!(max_capacity, "Suggestion MemoryStore initialized");
        Self {
            max_capacity: max_capacity.max(1),
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop expired entries, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let evicted = before - entries.len();
        self.expirations.fetch_add(evicted as u64, Ordering::Relaxed);
        evicted
    }

    fn evict_oldest(entries: &mut HashMap<String, Entry>, count: usize) {
        let mut by_age: Vec<_> = entries
            .iter()
            .map(|(k, e)| (k.clone(), e.created_at))
            .collect();
        by_age.sort_by_key(|(_, t)| *t);
        for (key, _) in by_age.into_iter().take(count) {
            entries.remove(&key);
        }
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &SuggestionKey) -> Option<Vec<String>> {
        let key_str = key.as_str();
        let now = Instant::now();

        let expired = {
            let entries = self.entries.read();
            match entries.get(&key_str) {
                Some(entry) if !entry.is_expired(now) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key = %key_str, "Suggestion cache hit");
                    return Some(entry.values.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut entries = self.entries.write();
            if entries.get(&key_str).is_some_and(|e| e.is_expired(now)) {
                entries.remove(&key_str);
                self.expirations.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key_str, "Suggestion cache miss");
        None
    }

    fn set(&self, key: &SuggestionKey, values: Vec<String>, ttl: Duration) {
        let key_str = key.as_str();
        let now = Instant::now();
        let entry = Entry {
            values,
            created_at: now,
            expires_at: now.checked_add(ttl),
        };

        let mut entries = self.entries.write();
        if !entries.contains_key(&key_str) && entries.len() >= self.max_capacity {
            let before = entries.len();
            entries.retain(|_, e| !e.is_expired(now));
            self.expirations
                .fetch_add((before - entries.len()) as u64, Ordering::Relaxed);
            if entries.len() >= self.max_capacity {
                Self::evict_oldest(&mut entries, (self.max_capacity / 10).max(1));
            }
        }
        entries.insert(key_str, entry);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn delete(&self, key: &SuggestionKey) -> bool {
        self.entries.write().remove(&key.as_str()).is_some()
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
