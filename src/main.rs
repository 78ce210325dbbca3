use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rate_proxy::config::{self, ApiBase};
use rate_proxy::proxy::handler::resolve_payment_rate;
use rate_proxy::AppState;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "rate_proxy=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            if let Some(port) = port {
                cfg.port = port;
            }
            run_server(cfg).await
        }
        Some(cli::Commands::Check { base }) => {
            if base.is_some() {
                cfg.api_base = ApiBase::Fixed(base);
            }
            run_check(cfg).await
        }
        None => run_server(cfg).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config) -> anyhow::Result<()> {
    let port = cfg.port;
    let state = Arc::new(AppState::new(cfg).context("failed to build upstream client")?);
    let app = rate_proxy::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("rate-proxy listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_check(cfg: config::Config) -> anyhow::Result<()> {
    let state = AppState::new(cfg).context("failed to build upstream client")?;
    let base = state.config.api_base.resolve();
    let payload = resolve_payment_rate(&state.upstream_client, &base).await;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
