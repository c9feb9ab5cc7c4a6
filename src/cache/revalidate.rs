//! Invalidation signaling
//!
//! Fire-and-forget: callers mark a path stale after the store write has
//! completed and do not wait on anyone reacting to it.

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::debug;

use super::PageCache;

pub trait Revalidator: Send + Sync {
    fn revalidate_path(&self, path: &str);
}

/// Drops the cached page and announces the path on a broadcast channel
pub struct PageRevalidator {
    cache: Arc<PageCache>,
    tx: broadcast::Sender<String>,
}

impl PageRevalidator {
    pub fn new(cache: Arc<PageCache>) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { cache, tx }
    }

    /// Receive every invalidated path from now on
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Revalidator for PageRevalidator {
    fn revalidate_path(&self, path: &str) {
        self.cache.invalidate(path);
        // No subscribers is fine
        let receivers = self.tx.send(path.to_string()).unwrap_or(0);
        debug!(path = path, receivers = receivers, "Revalidated path");
    }
}

/// Records invalidated paths in order
#[derive(Debug, Default)]
pub struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.clear();
        }
    }
}

impl Revalidator for RecordingRevalidator {
    fn revalidate_path(&self, path: &str) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_string());
        }
    }
}
