use std::net::SocketAddr;

use clap::Parser;
use risk_sentinel::cli::{self, Cli, Commands};
use risk_sentinel::config::Config;
use risk_sentinel::{create_app, startup, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // for .with() on registry

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_json);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::Analyze { file, provider } => {
            cli::handle_analyze(&config, &file, provider.as_deref()).await?;
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let report = startup::validate_config(&config);
    if !report.is_valid() {
        report.print();
    }
    report.into_result()?;

    let state = AppState::from_config(&config)?;
    tracing::info!(
        default_provider = %config.default_provider,
        providers = ?state.analyzer.configured_providers(),
        "Risk analyzer initialized"
    );

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
