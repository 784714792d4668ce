use crate::config::Config;
use anyhow::{Context, Result};

pub struct ValidationReport {
    pub environment: bool,
    pub providers: bool,
    pub notifier: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.providers && self.notifier
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        println!("LLM Providers:         {}", status(self.providers));
        println!("Admin Notifier:        {}", status(self.notifier));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!("\nOverall Status: {}", if self.is_valid() { "✅ PASS" } else { "❌ FAIL" });
        println!("=================================\n");
    }

    /// Turns a failed report into a startup error.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        anyhow::bail!("invalid configuration: {}", self.errors.join("; "))
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "✅ OK" } else { "❌ FAIL" }
}

pub fn validate_config(config: &Config) -> ValidationReport {
    let mut report = ValidationReport {
        environment: true,
        providers: true,
        notifier: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {:#}", e));
    }

    if let Err(e) = validate_providers(config) {
        report.providers = false;
        report.errors.push(format!("Providers: {:#}", e));
    }

    if let Err(e) = validate_notifier(config) {
        report.notifier = false;
        report.errors.push(format!("Notifier: {:#}", e));
    }

    report
}

fn validate_env_vars(config: &Config) -> Result<()> {
    if config.server_port == 0 {
        anyhow::bail!("SERVER_PORT must be greater than 0");
    }
    if config.auth.username.trim().is_empty() || config.auth.password.is_empty() {
        anyhow::bail!("AUTH_USERNAME and AUTH_PASSWORD must not be empty");
    }
    if config.max_attempts == 0 {
        anyhow::bail!("LLM_MAX_ATTEMPTS must be at least 1");
    }
    if config.request_timeout_secs == 0 {
        anyhow::bail!("LLM_REQUEST_TIMEOUT_SECS must be greater than 0");
    }

    Ok(())
}

fn validate_providers(config: &Config) -> Result<()> {
    if config.providers.is_empty() {
        anyhow::bail!("no LLM provider has an API key configured");
    }
    if config.provider(config.default_provider).is_none() {
        anyhow::bail!(
            "default provider '{}' has no API key configured",
            config.default_provider
        );
    }

    for (provider, settings) in &config.providers {
        url::Url::parse(&settings.api_url)
            .with_context(|| format!("{} API URL is not a valid URL", provider))?;
        if settings.model.trim().is_empty() {
            anyhow::bail!("{} model must not be empty", provider);
        }
    }

    Ok(())
}

fn validate_notifier(config: &Config) -> Result<()> {
    url::Url::parse(&config.notify_admin_url)
        .context("NOTIFY_ADMIN_API_URL is not a valid URL")?;

    if !(0.0..=1.0).contains(&config.notify_risk_threshold) {
        anyhow::bail!("NOTIFY_RISK_THRESHOLD must be between 0.0 and 1.0");
    }

    Ok(())
}
