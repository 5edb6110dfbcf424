use std::collections::HashMap;
use chrono::Utc;
use tracing::{debug, info};

use super::{AlertRequest, AlertType, PriceAlert};
use crate::domain::price::{PriceAnalyzer, PriceHistoryStore};
use crate::domain::product::Product;

/// Registered price alerts; each fires at most once
pub struct AlertEngine {
    alerts: Vec<PriceAlert>,
    next_id: u64,
    analyzer: PriceAnalyzer,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self {
            alerts: Vec::new(),
            next_id: 1,
            analyzer: PriceAnalyzer,
        }
    }

    pub fn create_alert(&mut self, product_id: &str, target: f64, alert_type: AlertType) -> String {
        let id = format!("alert_{}", self.next_id);
        self.next_id += 1;

        self.alerts.push(PriceAlert {
            id: id.clone(),
            product_id: product_id.to_string(),
            target_price: target,
            alert_type,
            created_at: Utc::now(),
            triggered: false,
            triggered_at: None,
            triggered_price: None,
        });

        info!("Alert {} created: {} {} {}", id, product_id, alert_type, target);
        id
    }

    pub fn create_from_request(&mut self, request: &AlertRequest) -> String {
        self.create_alert(&request.product_id, request.target, request.alert_type)
    }

    /// Evaluate pending alerts against the current batch.
    /// `history` must already hold this batch's prices for change alerts.
    pub fn check_alerts(&mut self, products: &[Product], history: &PriceHistoryStore) -> Vec<PriceAlert> {
        let current_prices: HashMap<&str, f64> = products
            .iter()
            .filter(|p| !p.id.is_empty() && p.price > 0.0)
            .map(|p| (p.id.as_str(), p.price))
            .collect();

        let now = Utc::now();
        let mut triggered = Vec::new();

        for alert in self.alerts.iter_mut().filter(|a| !a.triggered) {
            let Some(&current_price) = current_prices.get(alert.product_id.as_str()) else {
                continue;
            };

            let fires = match alert.alert_type {
                AlertType::Below => current_price <= alert.target_price,
                AlertType::Above => current_price >= alert.target_price,
                AlertType::Change => history
                    .previous_price(&alert.product_id)
                    .map(|previous| self.analyzer.calculate_price_change(previous, current_price).abs())
                    .is_some_and(|change| change >= alert.target_price),
            };
            if !fires {
                continue;
            }

            alert.triggered = true;
            alert.triggered_at = Some(now);
            alert.triggered_price = Some(current_price);
            info!(
                "Alert {} triggered: {} at {}",
                alert.id, alert.product_id, current_price
            );
            triggered.push(alert.clone());
        }

        triggered
    }

    pub fn alerts(&self) -> &[PriceAlert] {
        &self.alerts
    }

    pub fn pending(&self) -> impl Iterator<Item = &PriceAlert> {
        self.alerts.iter().filter(|a| !a.triggered)
    }

    /// Drop fired alerts, returning how many were removed
    pub fn prune_triggered(&mut self) -> usize {
        let before = self.alerts.len();
        self.alerts.retain(|a| !a.triggered);
        let removed = before - self.alerts.len();
        debug!("Pruned {} triggered alerts", removed);
        removed
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{Normalizer, RawProduct};

    fn product(id: &str, price: f64) -> Product {
        let mut product = Normalizer::default()
            .normalize_one(
                &RawProduct::new()
                    .with("title", "Alerted Product")
                    .with("platform", "ebay")
                    .with("price", price),
            )
            .unwrap();
        product.id = id.to_string();
        product
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut engine = AlertEngine::new();
        assert_eq!(engine.create_alert("p1", 10.0, AlertType::Below), "alert_1");
        assert_eq!(engine.create_alert("p1", 20.0, AlertType::Above), "alert_2");
        engine.prune_triggered();
        assert_eq!(engine.create_alert("p2", 5.0, AlertType::Change), "alert_3");
        assert_eq!(engine.alerts().len(), 3);
    }

    #[test]
    fn test_below_alert_fires_once() {
        let mut engine = AlertEngine::new();
        let history = PriceHistoryStore::default();
        let id = engine.create_alert("p1", 90.0, AlertType::Below);

        assert!(engine.check_alerts(&[product("p1", 95.0)], &history).is_empty());

        let fired = engine.check_alerts(&[product("p1", 85.0)], &history);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, id);
        assert_eq!(fired[0].triggered_price, Some(85.0));
        assert!(fired[0].triggered_at.is_some());

        assert!(engine.check_alerts(&[product("p1", 80.0)], &history).is_empty());
        assert_eq!(engine.pending().count(), 0);
    }

    #[test]
    fn test_above_alert_and_unknown_products() {
        let mut engine = AlertEngine::new();
        let history = PriceHistoryStore::default();
        engine.create_alert("p1", 100.0, AlertType::Above);

        assert!(engine.check_alerts(&[product("other", 500.0)], &history).is_empty());
        assert!(engine.check_alerts(&[product("p1", 0.0)], &history).is_empty());
        assert_eq!(engine.check_alerts(&[product("p1", 100.0)], &history).len(), 1);
    }

    #[test]
    fn test_change_alert_uses_history() {
        let mut engine = AlertEngine::new();
        let mut history = PriceHistoryStore::default();
        engine.create_alert("p1", 10.0, AlertType::Change);

        let first = [product("p1", 100.0)];
        history.detect_changes(&first);
        assert!(engine.check_alerts(&first, &history).is_empty());

        let small = [product("p1", 105.0)];
        history.detect_changes(&small);
        assert!(engine.check_alerts(&small, &history).is_empty());

        let drop = [product("p1", 90.0)];
        history.detect_changes(&drop);
        let fired = engine.check_alerts(&drop, &history);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].alert_type, AlertType::Change);
    }

    #[test]
    fn test_prune_triggered() {
        let mut engine = AlertEngine::new();
        let history = PriceHistoryStore::default();
        engine.create_alert("p1", 50.0, AlertType::Below);
        engine.create_alert("p2", 50.0, AlertType::Below);
        engine.check_alerts(&[product("p1", 40.0)], &history);

        assert_eq!(engine.prune_triggered(), 1);
        assert_eq!(engine.alerts().len(), 1);
        assert_eq!(engine.alerts()[0].product_id, "p2");
    }
}
