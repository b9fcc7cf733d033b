use anyhow::Context;
use jobboard::PoolClient;
use jobboard_server::{AppConfig, AppState, app, routes};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    match &config.source {
        Some(path) => tracing::info!(path = %path.display(), "loaded config file"),
        None => tracing::info!("loaded config from environment"),
    }

    let pool = jobboard::connect_pool(&config.database)
        .await
        .context("database unreachable")?;

    let router = routes::build::<PoolClient>();
    for route in router.routes() {
        tracing::debug!(
            method = route.method(),
            pattern = route.pattern().as_str(),
            "route registered"
        );
    }
    tracing::info!(routes = router.len(), "router ready");

    let state = Arc::new(AppState::new(router, pool));
    let listener = TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;
    tracing::info!(listen = %config.server.listen, "jobboard listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
