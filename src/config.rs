use crate::llm::ProviderName;
use anyhow::Context;
use dotenvy::dotenv;
use std::collections::BTreeMap;
use std::env;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_PROVIDER: &str = "claude";
pub const DEFAULT_NOTIFY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Endpoint, credentials and model for one LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl ProviderSettings {
    pub fn with_defaults(provider: ProviderName, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: provider.default_api_url().to_string(),
            model: provider.default_model().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub default_provider: ProviderName,
    /// Only providers with an API key are present.
    pub providers: BTreeMap<ProviderName, ProviderSettings>,
    pub auth: AuthCredentials,
    pub notify_admin_url: String,
    pub notify_risk_threshold: f64,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub log_request_body: bool,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| var(key).with_context(|| format!("{} must be set", key));

        let mut providers = BTreeMap::new();
        for provider in ProviderName::ALL {
            let prefix = provider.env_prefix();
            if let Some(api_key) = var(&format!("{}_API_KEY", prefix)) {
                let mut settings = ProviderSettings::with_defaults(provider, api_key);
                if let Some(url) = var(&format!("{}_API_URL", prefix)) {
                    settings.api_url = url;
                }
                if let Some(model) = var(&format!("{}_MODEL", prefix)) {
                    settings.model = model;
                }
                providers.insert(provider, settings);
            }
        }

        let default_provider = var("LLM_PROVIDER")
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
            .parse::<ProviderName>()
            .context("LLM_PROVIDER must name a supported provider")?;

        Ok(Config {
            server_port: var("SERVER_PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("SERVER_PORT must be a port number")?
                .unwrap_or(DEFAULT_SERVER_PORT),
            default_provider,
            providers,
            auth: AuthCredentials {
                username: required("AUTH_USERNAME")?,
                password: required("AUTH_PASSWORD")?,
            },
            notify_admin_url: required("NOTIFY_ADMIN_API_URL")?,
            notify_risk_threshold: var("NOTIFY_RISK_THRESHOLD")
                .map(|v| v.parse::<f64>())
                .transpose()
                .context("NOTIFY_RISK_THRESHOLD must be a number")?
                .unwrap_or(DEFAULT_NOTIFY_THRESHOLD),
            request_timeout_secs: var("LLM_REQUEST_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("LLM_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: var("LLM_MAX_ATTEMPTS")
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("LLM_MAX_ATTEMPTS must be a positive integer")?
                .unwrap_or(crate::llm::retry::DEFAULT_MAX_ATTEMPTS),
            log_request_body: parse_flag(var("LOG_REQUEST_BODY")),
            log_json: var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn provider(&self, provider: ProviderName) -> Option<&ProviderSettings> {
        self.providers.get(&provider)
    }
}

fn parse_flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
