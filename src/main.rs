// src/main.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use parking_occupancy::aggregator::Aggregator;
use parking_occupancy::api::{self, ApiState};
use parking_occupancy::calibration;
use parking_occupancy::config::Config;
use parking_occupancy::detector::DetectorClient;
use parking_occupancy::layout::SlotLayout;
use parking_occupancy::store::StatusStore;

const CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load(CONFIG_PATH)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("parking_occupancy={}", config.logging.level))
        .init();

    info!("🅿️ Parking Occupancy Service Starting");

    let layout = Arc::new(
        SlotLayout::from_path(&config.layout.path).with_context(|| {
            format!(
                "failed to load slot layout from '{}'",
                config.layout.path.display()
            )
        })?,
    );
    info!(
        "✓ Layout '{}' loaded: {} slot(s)",
        layout.lot_id,
        layout.len()
    );

    let transform = calibration::load(
        &config.calibration.path,
        config.calibration.allow_identity_fallback,
    )?;
    if transform.is_identity() {
        warn!("⚠️ serving with the identity transform; occupancy is only correct for a top-down camera");
    } else {
        info!("✓ Calibration matrix loaded");
    }

    let (store, reader) = StatusStore::new(layout.len());

    let client = DetectorClient::new(config.detector.url.clone(), config.detector.timeout())?;
    info!("📡 Detection source: {}", config.detector.url);

    let aggregator = Aggregator::new(
        client,
        transform,
        Arc::clone(&layout),
        store,
        config.detector.poll_interval(),
    );
    tokio::spawn(aggregator.run());

    let app = api::router(ApiState { layout, reader });
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind '{}'", config.server.bind_addr))?;
    info!("✓ Status API listening on {}", config.server.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
