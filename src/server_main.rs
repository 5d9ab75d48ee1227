use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mentor_cli::config::ServerConfig;
use mentor_cli::server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    if config.api_key.is_none() {
        warn!("MENTOR_API_KEY is not set; /api/chat will answer 500 until it is configured");
    }

    let addr = config.listen_addr.clone();
    let app = server::router(config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "AI Mentor proxy listening");
    axum::serve(listener, app).await?;

    Ok(())
}
