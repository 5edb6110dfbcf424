//! Application services and use cases

use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::sink::DataSink;
use crate::domain::alert::{AlertEngine, AlertRequest, AlertType, PriceAlert};
use crate::domain::platform::PlatformRegistry;
use crate::domain::price::{PriceChangeEvent, PriceHistoryStore, PriceRecord, PriceTrend};
use crate::domain::product::{deduplicate_products, Normalizer, Product, ProductFilter, RawProduct};
use crate::domain::trend::{PlatformComparison, TrendDataSummary, TrendEngine, TrendReport};
use crate::shared::config::TrackerConfig;
use crate::shared::errors::AppError;

/// Counters for the lifetime of a service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub started_at: DateTime<Utc>,
    pub batches_processed: u64,
    pub raw_records_received: u64,
    pub products_accepted: u64,
    pub price_changes_detected: u64,
    pub alerts_triggered: u64,
    pub last_batch_at: Option<DateTime<Utc>>,
}

impl ServiceStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            batches_processed: 0,
            raw_records_received: 0,
            products_accepted: 0,
            price_changes_detected: 0,
            alerts_triggered: 0,
            last_batch_at: None,
        }
    }

    /// Share of raw records that survived normalization, dedup and filtering (0-1)
    pub fn acceptance_rate(&self) -> f64 {
        if self.raw_records_received == 0 {
            0.0
        } else {
            self.products_accepted as f64 / self.raw_records_received as f64
        }
    }
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one batch produced
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub products: Vec<Product>,
    pub price_changes: Vec<PriceChangeEvent>,
    pub triggered_alerts: Vec<PriceAlert>,
    pub report: TrendReport,
    pub comparison: PlatformComparison,
}

/// Runs product batches through normalization, history, alerts and trends
pub struct TrackingService {
    normalizer: Normalizer,
    filter: ProductFilter,
    history: Arc<RwLock<PriceHistoryStore>>,
    alerts: Arc<RwLock<AlertEngine>>,
    trends: Arc<RwLock<TrendEngine>>,
    stats: Arc<RwLock<ServiceStats>>,
    sink: Option<Arc<dyn DataSink>>,
}

impl TrackingService {
    /// Build the service and register the alerts listed in `config`
    pub fn new(config: &TrackerConfig) -> Result<Self, AppError> {
        let mut alerts = AlertEngine::new();
        for alert in &config.alerts {
            let request = AlertRequest::try_from(alert)?;
            alerts.create_from_request(&request);
        }

        Ok(Self {
            normalizer: Normalizer::new(config.normalizer.clone(), PlatformRegistry::new()),
            filter: config.filter.clone(),
            history: Arc::new(RwLock::new(PriceHistoryStore::new(config.history.clone()))),
            alerts: Arc::new(RwLock::new(alerts)),
            trends: Arc::new(RwLock::new(TrendEngine::new(config.trends.clone()))),
            stats: Arc::new(RwLock::new(ServiceStats::new())),
            sink: None,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn DataSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Process one scraped batch end to end
    pub async fn process_batch(&self, raw_products: &[RawProduct]) -> Result<BatchOutcome, AppError> {
        let normalized = self.normalizer.normalize(raw_products);
        let unique = deduplicate_products(normalized);
        let products = self.filter.apply(unique);

        // Fixed order so concurrent batches are applied one at a time
        let mut history = self.history.write().await;
        let mut alerts = self.alerts.write().await;
        let mut trends = self.trends.write().await;

        let price_changes = history.detect_changes(&products);
        let triggered_alerts = alerts.check_alerts(&products, &history);
        let report = trends.analyze(&products);
        let comparison = trends.compare_platforms(&products);

        drop(trends);
        drop(alerts);
        drop(history);

        {
            let mut stats = self.stats.write().await;
            stats.batches_processed += 1;
            stats.raw_records_received += raw_products.len() as u64;
            stats.products_accepted += products.len() as u64;
            stats.price_changes_detected += price_changes.len() as u64;
            stats.alerts_triggered += triggered_alerts.len() as u64;
            stats.last_batch_at = Some(Utc::now());
        }

        if let Some(sink) = &self.sink {
            for product in &products {
                sink.push_product(product).await?;
            }
            sink.push_report(&report).await?;
        }

        for event in &price_changes {
            info!(
                "Price {:?}: {} {} -> {} ({}%)",
                event.change_type,
                event.product_id,
                event.previous_price,
                event.current_price,
                event.percentage_change
            );
        }
        if !report.is_complete() {
            warn!("Trend report incomplete: {:?}", report.error.keys().collect::<Vec<_>>());
        }

        info!(
            "Batch processed: {} products, {} price changes, {} alerts triggered",
            products.len(),
            price_changes.len(),
            triggered_alerts.len()
        );

        Ok(BatchOutcome {
            products,
            price_changes,
            triggered_alerts,
            report,
            comparison,
        })
    }

    pub async fn create_alert(&self, product_id: &str, target: f64, alert_type: AlertType) -> String {
        self.alerts.write().await.create_alert(product_id, target, alert_type)
    }

    /// Register an alert from `product_id:type:target`
    pub async fn create_alert_from_str(&self, alert: &str) -> Result<String, AppError> {
        let request: AlertRequest = alert.parse()?;
        Ok(self.alerts.write().await.create_from_request(&request))
    }

    pub async fn pending_alerts(&self) -> Vec<PriceAlert> {
        self.alerts.read().await.pending().cloned().collect()
    }

    pub async fn prune_triggered_alerts(&self) -> usize {
        self.alerts.write().await.prune_triggered()
    }

    pub async fn price_trend(&self, product_id: &str) -> PriceTrend {
        self.history.read().await.get_default_trend(product_id)
    }

    pub async fn export_history(&self, product_id: Option<&str>) -> BTreeMap<String, Vec<PriceRecord>> {
        self.history.read().await.export_history(product_id)
    }

    pub async fn trend_summary(&self) -> TrendDataSummary {
        self.trends.read().await.export_summary()
    }

    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sink::MemorySink;
    use crate::domain::price::ChangeType;
    use crate::shared::config::AlertConfig;
    use crate::shared::errors::AlertError;

    fn raw(asin: &str, price: f64) -> RawProduct {
        RawProduct::new()
            .with("title", "Espresso Machine Deluxe")
            .with("platform", "amazon")
            .with("asin", asin)
            .with("price", price)
            .with("rating", 4.5)
            .with("reviews_count", 320)
            .with("availability", "In Stock")
    }

    #[tokio::test]
    async fn test_process_batch_detects_changes_and_alerts() {
        let service = TrackingService::new(&TrackerConfig::default()).unwrap();
        let alert_id = service
            .create_alert("amazon_B01", 90.0, AlertType::Below)
            .await;

        let first = service.process_batch(&[raw("B01", 100.0)]).await.unwrap();
        assert_eq!(first.products.len(), 1);
        assert!(first.price_changes.is_empty());
        assert!(first.triggered_alerts.is_empty());

        let second = service.process_batch(&[raw("B01", 85.0)]).await.unwrap();
        assert_eq!(second.price_changes.len(), 1);
        assert_eq!(second.price_changes[0].change_type, ChangeType::Decrease);
        assert_eq!(second.triggered_alerts.len(), 1);
        assert_eq!(second.triggered_alerts[0].id, alert_id);
        assert_eq!(second.report.summary.total_products_analyzed, 2);

        let stats = service.stats().await;
        assert_eq!(stats.batches_processed, 2);
        assert_eq!(stats.price_changes_detected, 1);
        assert_eq!(stats.alerts_triggered, 1);
        assert_eq!(stats.acceptance_rate(), 1.0);

        assert!(service.pending_alerts().await.is_empty());
        assert_eq!(service.prune_triggered_alerts().await, 1);
        assert_eq!(service.export_history(Some("amazon_B01")).await["amazon_B01"].len(), 2);
    }

    #[tokio::test]
    async fn test_filter_and_dedup_apply_before_tracking() {
        let mut config = TrackerConfig::default();
        config.filter.max_price = Some(50.0);
        let service = TrackingService::new(&config).unwrap();

        let outcome = service
            .process_batch(&[
                raw("B01", 20.0),
                raw("B02", 30.0),
                RawProduct::new().with("title", "Cheap Mug").with("platform", "ebay").with("price", 500.0),
                RawProduct::new().with("platform", "ebay"),
            ])
            .await
            .unwrap();

        // B02 shares B01's title on the same platform
        assert_eq!(outcome.products.len(), 1);
        assert_eq!(outcome.products[0].id, "amazon_B01");
        assert_eq!(service.stats().await.raw_records_received, 4);
        assert_eq!(service.trend_summary().await.total_products_tracked, 1);
    }

    #[tokio::test]
    async fn test_sink_receives_products_and_report() {
        let sink = Arc::new(MemorySink::new());
        let service = TrackingService::new(&TrackerConfig::default())
            .unwrap()
            .with_sink(sink.clone());

        service
            .process_batch(&[raw("B01", 10.0), raw("B01", 10.0)])
            .await
            .unwrap();
        assert_eq!(sink.products().await.len(), 1);
        assert_eq!(sink.reports().await.len(), 1);
    }

    #[tokio::test]
    async fn test_alerts_from_config_and_cli_format() {
        let mut config = TrackerConfig::default();
        config.alerts.push(AlertConfig {
            product_id: "amazon_B01".to_string(),
            target_price: 200.0,
            alert_type: "above".to_string(),
        });
        let service = TrackingService::new(&config).unwrap();
        assert_eq!(service.pending_alerts().await.len(), 1);

        let id = service.create_alert_from_str("amazon_B01:change:5").await.unwrap();
        assert_eq!(id, "alert_2");
        assert!(matches!(
            service.create_alert_from_str("amazon_B01:never:5").await,
            Err(AppError::Alert(AlertError::InvalidAlertType(_)))
        ));

        config.alerts[0].alert_type = "bogus".to_string();
        assert!(TrackingService::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_price_trend_after_batches() {
        let service = TrackingService::new(&TrackerConfig::default()).unwrap();
        for price in [100.0, 104.0, 110.0] {
            service.process_batch(&[raw("B01", price)]).await.unwrap();
        }
        let trend = service.price_trend("amazon_B01").await;
        assert_eq!(trend.trend, crate::shared::types::TrendStatus::Increasing);
        assert_eq!(trend.stats.unwrap().data_points, 3);
    }
}
