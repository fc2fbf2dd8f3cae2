//! Journal API Server
//!
//! Loads `.env`, parses configuration, and serves the journal API. A missing
//! or unusable `JWT_SECRET` stops startup.

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use journal_api::{router, AppState, Config};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::parse();

    // Initialize logging
    let log_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    info!("Initializing journal API...");
    let state = AppState::new(&config)?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Session lifetime: {}s", config.session_ttl_secs);

    axum::serve(listener, app).await?;

    Ok(())
}
