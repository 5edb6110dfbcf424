//! Price domain - price history and change analysis

mod price_analyzer;
mod price_history;
mod ring_buffer;

pub use price_analyzer::PriceAnalyzer;
pub use price_history::PriceHistoryStore;
pub use ring_buffer::BoundedHistory;

use crate::shared::types::{Platform, TrendStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub price: f64,
    pub currency: String,
    pub platform: Platform,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Increase,
    Decrease,
}

/// Price change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChangeEvent {
    pub product_id: String,
    pub product_title: String,
    pub platform: Platform,
    pub current_price: f64,
    pub previous_price: f64,
    pub price_change: f64,
    pub percentage_change: f64,
    pub change_type: ChangeType,
    pub currency: String,
    pub detected_at: DateTime<Utc>,
}

/// Summary statistics of a price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeriesStats {
    pub percentage_change: f64,
    pub price_change: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub volatility: f64,
    pub data_points: usize,
    pub period_days: i64,
}

/// Trend of one product's recorded prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrend {
    pub trend: TrendStatus,
    pub confidence: f64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PriceSeriesStats>,
}

impl PriceTrend {
    pub fn without_data(trend: TrendStatus) -> Self {
        Self {
            trend,
            confidence: 0.0,
            stats: None,
        }
    }
}
