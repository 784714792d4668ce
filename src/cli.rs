use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::domain::{RiskVerdict, Transaction};
use crate::handlers::webhook::parse_transaction;
use crate::services::RiskAnalyzer;
use crate::startup;

#[derive(Parser)]
#[command(name = "risk-sentinel")]
#[command(about = "Risk Sentinel - LLM-backed transaction fraud screening", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Configuration validation
    Config,

    /// Analyze a transaction JSON file and print the verdict
    Analyze {
        /// Path to a transaction JSON document
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Provider to use instead of the configured default
        #[arg(short, long)]
        provider: Option<String>,
    },
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Default Provider: {}", config.default_provider);
    for (provider, settings) in &config.providers {
        println!(
            "  {}: {} (model {}, key {})",
            provider,
            settings.api_url,
            settings.model,
            mask_secret(&settings.api_key)
        );
    }
    println!("  Auth Username: {}", config.auth.username);
    println!("  Admin Notify URL: {}", config.notify_admin_url);
    println!("  Notify Threshold: {}", config.notify_risk_threshold);
    println!("  Request Timeout: {}s", config.request_timeout_secs);
    println!("  Max Attempts: {}", config.max_attempts);

    let report = startup::validate_config(config);
    report.print();
    report.into_result()?;

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

pub fn load_transaction(path: &Path) -> anyhow::Result<Transaction> {
    let raw = std::fs::read(path)
        .with_context(|| format!("Failed to read transaction file {}", path.display()))?;
    parse_transaction(&raw)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
}

pub async fn handle_analyze(
    config: &Config,
    file: &Path,
    provider: Option<&str>,
) -> anyhow::Result<RiskVerdict> {
    startup::validate_config(config).into_result()?;

    let transaction = load_transaction(file)?;
    let analyzer = RiskAnalyzer::from_config(config)?;
    let provider = provider
        .map(str::to_string)
        .unwrap_or_else(|| analyzer.default_provider().to_string());

    let verdict = analyzer.analyze_transaction(&transaction, &provider).await?;

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(verdict)
}

/// Keeps the first four characters of a secret.
fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}
