mod app;

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;

use pricetrack::shared::types::Platform;
use pricetrack::TrackerConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Price tracking and trend analytics for scraped e-commerce listings")]
struct Args {
    /// JSON file with an array of raw products; repeat for several batches
    #[arg(long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Path to config file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drop products cheaper than this
    #[arg(long)]
    min_price: Option<f64>,

    /// Drop products more expensive than this
    #[arg(long)]
    max_price: Option<f64>,

    /// Drop products rated below this
    #[arg(long)]
    min_rating: Option<f64>,

    /// Keep only products in stock
    #[arg(long)]
    in_stock_only: bool,

    /// Platforms to keep (comma-separated)
    #[arg(long, value_delimiter = ',')]
    platforms: Option<Vec<String>>,

    /// Price alert as product_id:type:target (type: below, above, change)
    #[arg(long = "alert")]
    alerts: Vec<String>,

    /// Append products and reports to this JSON lines file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log filter (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Priority: CLI args > Config file > Defaults
    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TrackerConfig::default(),
    };

    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.as_str())
        .init();

    if let Some(min_price) = args.min_price {
        config.filter.min_price = Some(min_price);
    }
    if let Some(max_price) = args.max_price {
        config.filter.max_price = Some(max_price);
    }
    if let Some(min_rating) = args.min_rating {
        config.filter.min_rating = Some(min_rating);
    }
    if args.in_stock_only {
        config.filter.in_stock_only = true;
    }
    if let Some(platforms) = args.platforms {
        config.filter.platforms = Some(
            platforms
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(|p| Platform::from(p.to_string()))
                .collect(),
        );
    }

    let app_cfg = app::AppCfg {
        config,
        inputs: args.inputs,
        alerts: args.alerts,
        output: args.output,
    };

    app::run(app_cfg).await
}
