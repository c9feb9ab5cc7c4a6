//! Rendered dashboard surfaces and their invalidation
//!
//! Dashboard views are cached by path. A successful mutation marks the
//! affected paths stale through a [`Revalidator`]; the next view of that path
//! rebuilds it from the store.

pub mod revalidate;
pub mod store;

pub use revalidate::{PageRevalidator, RecordingRevalidator, Revalidator};
pub use store::{spawn_cleanup_task, CacheEntry, CacheStats, PageCache};

use std::time::Duration;

use crate::models::ContentKind;

/// Dashboard overview surface
pub const DASHBOARD_PATH: &str = "/dashboard";

/// List page for one content type
pub fn list_path(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Resources => "/dashboard/resources",
        ContentKind::Announcements => "/dashboard/announcements",
        ContentKind::Events => "/dashboard/events",
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached surfaces
    pub max_entries: usize,
    /// TTL for a rendered surface
    pub page_ttl: Duration,
    /// Cleanup interval
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            page_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Create config from environment or defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_entries = std::env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_entries);

        let page_ttl = std::env::var("CACHE_PAGE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.page_ttl);

        Self {
            max_entries,
            page_ttl,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 256);
        assert_eq!(config.page_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_list_paths_sit_under_dashboard() {
        for kind in ContentKind::ALL {
            let path = list_path(kind);
            assert_eq!(path, format!("{}/{}", DASHBOARD_PATH, kind.segment()));
        }
    }
}
