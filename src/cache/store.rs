//! Page cache
//!
//! In-memory map from surface path to rendered body, with TTL, ETag and
//! exact-path invalidation.
//!
//! Each path has a generation that [`PageCache::invalidate`] bumps. A render
//! reads the generation first and fills the cache through
//! [`PageCache::set_if_current`], so a render that overlapped an
//! invalidation never stores its older snapshot.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::CacheConfig;

/// A cached surface with metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Vec<u8>,
    /// ETag for HTTP caching (SHA256 of data)
    pub etag: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        let etag = Self::compute_etag(&data);
        let now = Instant::now();
        Self {
            data,
            etag,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    fn compute_etag(data: &[u8]) -> String {
        let hash = Sha256::digest(data);
        format!("\"{}\"", hex::encode(&hash[..16]))
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

impl CacheStats {
    /// Hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

pub struct PageCache {
    entries: DashMap<String, CacheEntry>,
    /// Lock order: a `generations` guard may be held while touching
    /// `entries`, never the reverse
    generations: DashMap<String, u64>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl PageCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            generations: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn get(&self, path: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.entries.get(path) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(path = path, "Page cache hit");
                return Some(entry.clone());
            }
            drop(entry);
            self.entries.remove(path);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(path = path, "Page cache miss");
        None
    }

    /// Store a rendered surface using the configured TTL
    pub fn set(&self, path: &str, data: Vec<u8>) -> CacheEntry {
        self.set_with_ttl(path, data, self.config.page_ttl)
    }

    pub fn set_with_ttl(&self, path: &str, data: Vec<u8>, ttl: Duration) -> CacheEntry {
        let entry = CacheEntry::new(data, ttl);
        self.entries.insert(path.to_string(), entry.clone());
        self.maybe_evict();
        entry
    }

    /// Current generation of `path`. Read it before rendering.
    pub fn generation(&self, path: &str) -> u64 {
        *self.generations.entry(path.to_string()).or_insert(0)
    }

    /// Store a render made at `generation`, unless `path` has been
    /// invalidated since. The entry is returned either way so the caller can
    /// serve it.
    pub fn set_if_current(&self, path: &str, data: Vec<u8>, generation: u64) -> CacheEntry {
        let entry = CacheEntry::new(data, self.config.page_ttl);
        let stored = match self.generations.get(path) {
            Some(current) if *current == generation => {
                self.entries.insert(path.to_string(), entry.clone());
                true
            }
            _ => false,
        };

        if stored {
            self.maybe_evict();
        } else {
            debug!(path = path, "Render overlapped an invalidation, not caching");
        }
        entry
    }

    /// Drop one surface. Returns whether anything was cached.
    pub fn invalidate(&self, path: &str) -> bool {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        let mut generation = self.generations.entry(path.to_string()).or_insert(0);
        *generation += 1;
        let removed = self.entries.remove(path).is_some();
        drop(generation);
        debug!(path = path, removed = removed, "Invalidated page");
        removed
    }

    pub fn clear(&self) {
        for mut generation in self.generations.iter_mut() {
            *generation += 1;
        }
        self.entries.clear();
        info!("Page cache cleared");
    }

    /// Remove expired entries
    pub fn cleanup(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Evict oldest entries when over capacity
    fn maybe_evict(&self) {
        if self.entries.len() <= self.config.max_entries {
            return;
        }
        let to_evict = self.entries.len() - self.config.max_entries;

        let mut entries: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.created_at))
            .collect();
        entries.sort_by_key(|(_, created)| *created);

        for (key, _) in entries.into_iter().take(to_evict) {
            self.entries.remove(&key);
        }
        debug!(evicted = to_evict, "Evicted pages");
    }
}

/// Spawn background task to drop expired pages
pub fn spawn_cleanup_task(cache: Arc<PageCache>) {
    let interval = cache.config.cleanup_interval;

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = cache.cleanup();
            let stats = cache.stats();
            debug!(
                removed = removed,
                entries = stats.entries,
                hit_rate = format!("{:.1}%", stats.hit_rate()),
                "Page cache cleanup completed"
            );
        }
    });

    info!("Page cache cleanup task started");
}
