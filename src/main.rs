use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clipforge_api::auth::TokenCodec;
use clipforge_api::config::AppConfig;
use clipforge_api::database::PgStore;
use clipforge_api::services::{AnthropicClient, SqsQueue};
use clipforge_api::{AppState, ChatSettings};

#[derive(Parser, Debug)]
#[command(name = "clipforge-api")]
#[command(about = "Clipforge API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Do not run database migrations on startup")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting Clipforge API in {:?} mode", config.environment);

    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if !args.skip_migrations {
        store.migrate().await.context("failed to run migrations")?;
    }

    let llm = AnthropicClient::new(&config.llm).context("failed to build LLM client")?;
    let queue = SqsQueue::from_config(&config.queue).await;
    let tokens = TokenCodec::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)
        .context("failed to build token codec")?;

    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(llm),
        Arc::new(queue),
        tokens,
        ChatSettings::from_config(&config),
    );
    let app = clipforge_api::app(state, &config.security);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Clipforge API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
