//! Trend domain - batch-level analytics over recently ingested products

mod comparison;
mod snapshot_window;
mod statistics;
mod trend_engine;

pub use comparison::{
    compare_platforms, PlatformComparison, PlatformPrice, PlatformPriceStats, PriceQuote,
    ProductComparison,
};
pub use snapshot_window::{ProductBatch, SnapshotWindow};
pub use statistics::{calculate_price_trend, trend_consistency, TrendCalculation};
pub use trend_engine::{TrendDataSummary, TrendEngine};

use std::collections::BTreeMap;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::Product;
use crate::shared::types::{Platform, TrendStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrendDetails {
    pub daily_averages: BTreeMap<NaiveDate, f64>,
    pub trend_strength: f64,
    pub percentage_change: f64,
    pub price_volatility: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub price_range: f64,
    pub total_products_analyzed: usize,
    pub analysis_period_days: usize,
}

/// Direction of average prices across days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrendAnalysis {
    pub trend: TrendStatus,
    pub confidence: f64,
    pub analysis: Option<PriceTrendDetails>,
}

impl PriceTrendAnalysis {
    pub fn without_data(trend: TrendStatus) -> Self {
        Self {
            trend,
            confidence: 0.0,
            analysis: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityDirection {
    Improving,
    Declining,
    Stable,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAvailability {
    pub total_products: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub availability_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityTrend {
    pub trend: AvailabilityDirection,
    pub daily_statistics: BTreeMap<NaiveDate, DailyAvailability>,
    pub overall_availability_rate: f64,
    pub analysis_period_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularProduct {
    pub product: Product,
    pub popularity_score: f64,
    pub rating: f64,
    pub reviews_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total_products: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_rating: f64,
    pub availability_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    /// Sorted by product count, largest first
    pub categories: Vec<CategoryStats>,
    pub total_categories: usize,
    pub analysis_period_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub platform: Platform,
    pub total_products: usize,
    pub avg_price: f64,
    /// 100 at the cross-platform average, higher when cheaper
    pub price_competitiveness: f64,
    pub avg_rating: f64,
    pub availability_rate: f64,
    pub product_variety: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformPerformance {
    pub platforms: Vec<PlatformStats>,
    pub total_platforms: usize,
    pub analysis_period_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_products_analyzed: usize,
    pub total_platforms: usize,
    pub total_categories: usize,
    pub overall_price_trend: Option<TrendStatus>,
    pub overall_availability_trend: Option<AvailabilityDirection>,
}

/// Full trend report; a section that failed is `None` and listed under `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub report_id: Uuid,
    pub report_generated_at: DateTime<Utc>,
    pub analysis_period_days: i64,
    pub summary: ReportSummary,
    pub price_trends: Option<PriceTrendAnalysis>,
    pub availability_trends: Option<AvailabilityTrend>,
    pub popular_products: Option<Vec<PopularProduct>>,
    pub category_analysis: Option<CategoryAnalysis>,
    pub platform_performance: Option<PlatformPerformance>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub error: BTreeMap<String, String>,
}

impl TrendReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_empty()
    }
}
