//! Per-product price history and change detection

use std::collections::{BTreeMap, HashMap};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::{BoundedHistory, ChangeType, PriceAnalyzer, PriceChangeEvent, PriceRecord, PriceTrend};
use crate::domain::product::Product;
use crate::shared::config::HistoryConfig;
use crate::shared::types::{Platform, TrendStatus};
use crate::shared::utils::round_to;

/// Append-only price series per product id, capped per product
pub struct PriceHistoryStore {
    config: HistoryConfig,
    analyzer: PriceAnalyzer,
    histories: HashMap<String, BoundedHistory<PriceRecord>>,
}

impl PriceHistoryStore {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            analyzer: PriceAnalyzer,
            histories: HashMap::new(),
        }
    }

    /// Record a price observed now
    pub fn record(&mut self, product_id: &str, price: f64, currency: &str, platform: Platform) {
        self.record_at(product_id, price, currency, platform, Utc::now());
    }

    pub fn record_at(
        &mut self,
        product_id: &str,
        price: f64,
        currency: &str,
        platform: Platform,
        timestamp: DateTime<Utc>,
    ) {
        let capacity = self.config.max_records_per_product;
        let history = self
            .histories
            .entry(product_id.to_string())
            .or_insert_with(|| BoundedHistory::new(capacity));

        let evicted = history.push(PriceRecord {
            price,
            currency: currency.to_string(),
            platform,
            timestamp,
        });
        if evicted.is_some() {
            debug!(product_id, "Price history full, evicted oldest record");
        }
    }

    /// Record the current price of every product and report significant moves
    pub fn detect_changes(&mut self, products: &[Product]) -> Vec<PriceChangeEvent> {
        self.detect_changes_at(products, Utc::now())
    }

    pub fn detect_changes_at(
        &mut self,
        products: &[Product],
        timestamp: DateTime<Utc>,
    ) -> Vec<PriceChangeEvent> {
        let mut changes = Vec::new();

        for product in products {
            if product.id.is_empty() || product.price <= 0.0 {
                continue;
            }

            self.record_at(
                &product.id,
                product.price,
                &product.currency,
                product.platform.clone(),
                timestamp,
            );

            if let Some(event) = self.analyze_change(product, timestamp) {
                changes.push(event);
            }
        }

        info!("Price change detection: {} changes detected", changes.len());
        changes
    }

    fn analyze_change(&self, product: &Product, detected_at: DateTime<Utc>) -> Option<PriceChangeEvent> {
        let previous_price = self.previous_price(&product.id)?;
        let current_price = product.price;
        if previous_price == current_price {
            return None;
        }

        let percentage_change = self.analyzer.calculate_price_change(previous_price, current_price);
        if !self
            .analyzer
            .is_significant_change(percentage_change, self.config.change_threshold_pct)
        {
            return None;
        }

        let price_change = current_price - previous_price;
        Some(PriceChangeEvent {
            product_id: product.id.clone(),
            product_title: product.title.clone(),
            platform: product.platform.clone(),
            current_price,
            previous_price,
            price_change: round_to(price_change, 2),
            percentage_change: round_to(percentage_change, 2),
            change_type: if price_change > 0.0 {
                ChangeType::Increase
            } else {
                ChangeType::Decrease
            },
            currency: product.currency.clone(),
            detected_at,
        })
    }

    /// Trend over the trailing `window_days`
    pub fn get_trend(&self, product_id: &str, window_days: i64) -> PriceTrend {
        let Some(history) = self.histories.get(product_id).filter(|h| !h.is_empty()) else {
            return PriceTrend::without_data(TrendStatus::NoData);
        };

        let cutoff = Utc::now() - Duration::days(window_days);
        let recent: Vec<&PriceRecord> = history.iter().filter(|r| r.timestamp >= cutoff).collect();
        if recent.len() < 2 {
            return PriceTrend::without_data(TrendStatus::InsufficientData);
        }

        self.analyzer.series_trend(&recent)
    }

    /// Trend over the configured default window
    pub fn get_default_trend(&self, product_id: &str) -> PriceTrend {
        self.get_trend(product_id, self.config.trend_window_days)
    }

    pub fn history(&self, product_id: &str) -> Option<&BoundedHistory<PriceRecord>> {
        self.histories.get(product_id)
    }

    /// Price recorded just before the latest observation
    pub fn previous_price(&self, product_id: &str) -> Option<f64> {
        self.histories
            .get(product_id)
            .and_then(|h| h.previous())
            .map(|r| r.price)
    }

    pub fn tracked_products(&self) -> usize {
        self.histories.len()
    }

    /// Plain copy of one product's history, or of everything
    pub fn export_history(&self, product_id: Option<&str>) -> BTreeMap<String, Vec<PriceRecord>> {
        self.histories
            .iter()
            .filter(|(id, _)| product_id.map_or(true, |wanted| wanted == id.as_str()))
            .map(|(id, history)| (id.clone(), history.iter().cloned().collect()))
            .collect()
    }
}

impl Default for PriceHistoryStore {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}
