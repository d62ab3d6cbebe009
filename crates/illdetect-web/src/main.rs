//! IllDetect prediction server.
//!
//! Run with: cargo run -p illdetect-web

use std::net::SocketAddr;

use illdetect_common::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let state = illdetect_web::state::AppState::from_config(config)?;
    let app = illdetect_web::router::build_router(state);

    info!("IllDetect server listening on http://{addr}");
    info!("  POST /api/predict      - cardiovascular prediction");
    info!("  GET  /api/predictions  - prediction history");
    info!("  GET  /api/statistics   - prediction statistics");
    info!("  GET  /api/health       - health check");
    info!("  GET  /api/ml-health    - ML service connectivity");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
