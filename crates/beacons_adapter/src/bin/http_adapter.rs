#![forbid(unsafe_code)]

use beacons_adapter::{app_state_from_config, build_router, AdapterConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AdapterConfig::from_env()?;
    if config.api_url.is_none() {
        warn!("BEACONS_API_URL not set; final submissions will fail");
    }
    let app = build_router(app_state_from_config(&config)?);

    info!(
        bind = %config.bind,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "beacons_adapter_http listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
