pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod middleware;
pub mod services;
pub mod startup;
pub mod utils;
pub mod validation;

use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::{AuthCredentials, Config};
use crate::middleware::request_logger::RequestLogConfig;
use crate::services::{AdminNotifier, RiskAnalyzer};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: RiskAnalyzer,
    pub notifier: AdminNotifier,
    pub auth: AuthCredentials,
    pub request_log: RequestLogConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            analyzer: RiskAnalyzer::from_config(config)?,
            notifier: AdminNotifier::new(
                config.notify_admin_url.clone(),
                config.notify_risk_threshold,
            )?,
            auth: config.auth.clone(),
            request_log: RequestLogConfig {
                log_body: config.log_request_body,
            },
            start_time: Instant::now(),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let webhook_routes = Router::new()
        .route(
            "/webhook/transaction",
            post(handlers::webhook::transaction_webhook),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            middleware::auth::basic_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(webhook_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.request_log,
            middleware::request_logger::request_logger_middleware,
        ))
        .with_state(state)
}
