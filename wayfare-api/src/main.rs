use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use wayfare_api::{app, AppState};
use wayfare_booking::BookingEngine;
use wayfare_core::payment::CardSimulator;
use wayfare_docstore::DocStore;
use wayfare_store::{Config, EventProducer, EventPublisher, PgClient};

const SERVICE_ORIGIN: &str = "wayfare-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!("Starting Wayfare API on port {}", config.port);

    let db = PgClient::connect(&config.relational_url).await?;

    let docs = DocStore::connect(&config.document_url).await?;
    docs.ensure_indexes().await.map_err(|e| anyhow::anyhow!("{e}"))?;

    let producer = EventProducer::new(&config.event_bus_brokers)?;
    let publisher = EventPublisher::spawn(producer, SERVICE_ORIGIN);

    let engine = Arc::new(BookingEngine::new(
        db.clone(),
        Arc::new(CardSimulator),
        publisher.clone(),
        config.inventory_lock_timeout_ms,
    ));

    let state = AppState {
        db,
        docs,
        engine,
        publisher,
        jwt_secret: config.jwt_secret.clone(),
        jwt_ttl_seconds: config.jwt_ttl_seconds,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {e}");
        return;
    }
    info!("Shutdown signal received");
}
