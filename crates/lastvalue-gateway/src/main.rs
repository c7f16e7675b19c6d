//! lastvalue gateway
//!
//! - Config: `LASTVALUE_CONFIG` (default `lastvalue.yaml`), strict YAML
//! - HTTP: management queries, sample ingestion, `/healthz`, `/metrics`
//! - Ctrl-C: graceful shutdown, then the registry is cleared

use tracing_subscriber::{fmt, EnvFilter};

use lastvalue_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("LASTVALUE_CONFIG").unwrap_or_else(|_| "lastvalue.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.gateway.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "lastvalue-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let removed = state.shutdown();
    tracing::info!(removed, "lastvalue-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed; shutting down");
    }
}
