use anyhow::Context;
use greenline_api::{app, payment_dev::DevPaymentAdapter, worker, AppState};
use greenline_catalog::TripCatalog;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "greenline_api=debug,greenline_inventory=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = greenline_store::Config::load().context("failed to load config")?;
    tracing::info!("starting Greenline API on port {}", config.server.port);

    let catalog = Arc::new(TripCatalog::new());
    let trips = greenline_store::load_seed_file(&config.catalog.seed_path)
        .context("failed to load trip catalog seed")?;
    let seeded = greenline_store::seed_catalog(&catalog, trips)
        .context("failed to publish trip catalog seed")?;
    tracing::info!(trips = seeded, "trip catalog ready");

    let state = AppState::new(
        catalog,
        Arc::new(DevPaymentAdapter),
        config.business_rules.clone(),
    );

    let _sweeper = worker::spawn_expiry_sweeper(
        state.inventory.clone(),
        state.metrics.clone(),
        config.business_rules.sweep_interval_seconds,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app(state))
        .await
        .context("server exited")?;
    Ok(())
}
