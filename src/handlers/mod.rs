pub mod webhook;

use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub default_provider: String,
    pub providers: Vec<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        default_provider: state.analyzer.default_provider().to_string(),
        providers: state
            .analyzer
            .configured_providers()
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}
