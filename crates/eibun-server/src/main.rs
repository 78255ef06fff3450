//! eibun server binary.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use eibun_providers::GeminiClient;
use eibun_server::{config, routes};

#[derive(Parser)]
#[command(name = "eibun", version, about = "English sentence correction service")]
struct Cli {
    /// Config file path (default: eibun.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }

    let state = routes::AppState {
        model: Arc::new(GeminiClient::new(config.gemini.clone())),
        policy: config.generation.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        model = %config.gemini.model,
        "listening"
    );

    axum::serve(listener, routes::app(state)).await?;
    Ok(())
}
