//! Health check endpoint

use chrono::Utc;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::{json_response, FullBody};
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    /// "mongodb" or "memory"
    pub storage: &'static str,
    pub demo_mode: bool,
    pub cache: CacheHealth,
    pub mode: &'static str,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheHealth {
    pub entries: usize,
    pub hit_rate: f64,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let stats = state.cache.stats();
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("GIT_COMMIT_SHORT"),
        build_time: env!("BUILD_TIMESTAMP"),
        storage: state.storage.as_str(),
        demo_mode: state.content.demo_gate().is_enabled(),
        cache: CacheHealth {
            entries: stats.entries,
            hit_rate: stats.hit_rate(),
        },
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// Liveness check
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(StatusCode::OK, &build_health_response(state))
}
