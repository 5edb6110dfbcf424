// src/app.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use tracing::info;

use pricetrack::application::{JsonLinesSink, TrackingService};
use pricetrack::{RawProduct, TrackerConfig};

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config: TrackerConfig,
    pub inputs: Vec<PathBuf>,
    pub alerts: Vec<String>,
    pub output: Option<PathBuf>,
}

async fn load_batch(path: &Path) -> Result<Vec<RawProduct>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of products", path.display()))
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("Starting price tracker with {} input batches", app_cfg.inputs.len());

    let mut service = TrackingService::new(&app_cfg.config)?;
    if let Some(output) = &app_cfg.output {
        let sink = JsonLinesSink::create(output)
            .await
            .with_context(|| format!("failed to open output {}", output.display()))?;
        service = service.with_sink(Arc::new(sink));
        info!("Writing results to {}", output.display());
    }

    for alert in &app_cfg.alerts {
        let id = service.create_alert_from_str(alert).await?;
        info!("Registered alert {} from --alert {}", id, alert);
    }

    for path in &app_cfg.inputs {
        let raw_products = load_batch(path).await?;
        info!("Loaded {} raw products from {}", raw_products.len(), path.display());

        let outcome = service.process_batch(&raw_products).await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    let stats = service.stats().await;
    info!(
        "Done: {} batches, {}/{} records accepted ({:.1}%), {} price changes, {} alerts triggered",
        stats.batches_processed,
        stats.products_accepted,
        stats.raw_records_received,
        stats.acceptance_rate() * 100.0,
        stats.price_changes_detected,
        stats.alerts_triggered
    );

    Ok(())
}
