//! Trend engine - ingests product batches and builds trend reports

use std::collections::{BTreeMap, HashMap, HashSet};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::{
    calculate_price_trend, compare_platforms, AvailabilityDirection, AvailabilityTrend,
    CategoryAnalysis, CategoryStats, DailyAvailability, PlatformComparison, PlatformPerformance,
    PlatformStats, PopularProduct, PriceTrendAnalysis, PriceTrendDetails, ProductBatch,
    ReportSummary, SnapshotWindow, TrendReport,
};
use crate::domain::product::Product;
use crate::shared::config::TrendConfig;
use crate::shared::errors::AnalysisError;
use crate::shared::types::{Availability, Platform, TrendStatus};
use crate::shared::utils::{mean, min_max, round_to, std_dev};

/// Availability rate moves below this many points are "stable"
const AVAILABILITY_STABLE_BAND: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AnalysisKind {
    PriceTrend,
    Availability,
    Popular,
    Category,
    Platform,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: AnalysisKind,
    platform: Option<Platform>,
    category: Option<String>,
    days: i64,
    limit: Option<usize>,
}

impl CacheKey {
    fn new(kind: AnalysisKind, platform: Option<&Platform>, category: Option<&str>, days: i64) -> Self {
        Self {
            kind,
            platform: platform.cloned(),
            category: category.map(str::to_string),
            days,
            limit: None,
        }
    }

    /// Popularity looks at the whole window, so it is keyed by result size instead of days
    fn top(kind: AnalysisKind, platform: Option<&Platform>, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new(kind, platform, None, 0)
        }
    }
}

#[derive(Debug, Clone)]
enum CachedAnalysis {
    PriceTrend(PriceTrendAnalysis),
    Availability(AvailabilityTrend),
    Popular(Vec<PopularProduct>),
    Category(CategoryAnalysis),
    Platform(PlatformPerformance),
}

/// Snapshot of what the engine currently holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDataSummary {
    pub batch_count: usize,
    pub date_range_start: Option<DateTime<Utc>>,
    pub date_range_end: Option<DateTime<Utc>>,
    pub cache_entries: usize,
    pub total_products_tracked: usize,
}

fn ensure_finite(product: &Product) -> Result<(), AnalysisError> {
    let field = if !product.price.is_finite() {
        "price"
    } else if !product.rating.is_finite() {
        "rating"
    } else {
        return Ok(());
    };
    Err(AnalysisError::NonFiniteValue {
        field,
        product_id: product.id.clone(),
    })
}

fn availability_rate(products: &[&Product]) -> f64 {
    if products.is_empty() {
        return 0.0;
    }
    let in_stock = products
        .iter()
        .filter(|p| p.availability == Availability::InStock)
        .count();
    round_to(in_stock as f64 / products.len() as f64 * 100.0, 1)
}

/// Averages over positive prices and ratings of one group
struct GroupFigures {
    avg_price: f64,
    min_price: f64,
    max_price: f64,
    avg_rating: f64,
}

impl GroupFigures {
    fn of(products: &[&Product]) -> Self {
        let prices: Vec<f64> = products.iter().map(|p| p.price).filter(|p| *p > 0.0).collect();
        let ratings: Vec<f64> = products.iter().map(|p| p.rating).filter(|r| *r > 0.0).collect();
        let (min_price, max_price) = min_max(&prices).unwrap_or((0.0, 0.0));
        Self {
            avg_price: round_to(mean(&prices).unwrap_or(0.0), 2),
            min_price,
            max_price,
            avg_rating: round_to(mean(&ratings).unwrap_or(0.0), 2),
        }
    }
}

/// Keeps recent batches and derives trend analytics from them
pub struct TrendEngine {
    config: TrendConfig,
    window: SnapshotWindow,
    cache: HashMap<CacheKey, CachedAnalysis>,
}

impl TrendEngine {
    pub fn new(config: TrendConfig) -> Self {
        Self {
            window: SnapshotWindow::new(config.retention_days),
            config,
            cache: HashMap::new(),
        }
    }

    pub fn ingest(&mut self, products: Vec<Product>) {
        self.ingest_at(products, Utc::now());
    }

    /// Add a batch observed at `timestamp`; purges expired batches and the cache
    pub fn ingest_at(&mut self, products: Vec<Product>, timestamp: DateTime<Utc>) {
        let count = products.len();
        let purged = self.window.push(
            ProductBatch {
                timestamp,
                products,
            },
            Utc::now(),
        );
        self.cache.clear();

        info!(
            "Trend data ingested: {} products ({} batches retained, {} purged)",
            count,
            self.window.len(),
            purged
        );
    }

    /// Ingest `products` and report over the configured window
    pub fn analyze(&mut self, products: &[Product]) -> TrendReport {
        self.ingest(products.to_vec());
        self.generate_report(self.config.report_window_days)
    }

    pub fn generate_report(&mut self, days: i64) -> TrendReport {
        let mut errors = BTreeMap::new();

        let price_trends = capture("price_trends", self.analyze_price_trends(None, None, days), &mut errors);
        let availability_trends = capture(
            "availability_trends",
            self.analyze_availability_trends(None, days),
            &mut errors,
        );
        let popular_limit = self.config.popular_limit;
        let popular_products = capture(
            "popular_products",
            self.analyze_popular_products(None, popular_limit),
            &mut errors,
        );
        let category_analysis = capture("category_analysis", self.analyze_category_trends(days), &mut errors);
        let platform_performance = capture(
            "platform_performance",
            self.analyze_platform_performance(days),
            &mut errors,
        );

        let cutoff = Utc::now() - Duration::days(days);
        let summary = ReportSummary {
            total_products_analyzed: self.window.since(cutoff).map(|b| b.products.len()).sum(),
            total_platforms: platform_performance.as_ref().map_or(0, |p| p.total_platforms),
            total_categories: category_analysis.as_ref().map_or(0, |c| c.total_categories),
            overall_price_trend: price_trends.as_ref().map(|p| p.trend),
            overall_availability_trend: availability_trends.as_ref().map(|a| a.trend),
        };

        info!(
            "Trend report generated over {} days ({} section errors)",
            days,
            errors.len()
        );

        TrendReport {
            report_id: Uuid::new_v4(),
            report_generated_at: Utc::now(),
            analysis_period_days: days,
            summary,
            price_trends,
            availability_trends,
            popular_products,
            category_analysis,
            platform_performance,
            error: errors,
        }
    }

    /// In-window products with the day of the batch they arrived in
    fn products_since(&self, days: i64) -> impl Iterator<Item = (NaiveDate, &Product)> {
        let cutoff = Utc::now() - Duration::days(days);
        self.window
            .since(cutoff)
            .flat_map(|batch| batch.products.iter().map(move |p| (batch.timestamp.date_naive(), p)))
    }

    pub fn analyze_price_trends(
        &mut self,
        platform: Option<&Platform>,
        category: Option<&str>,
        days: i64,
    ) -> Result<PriceTrendAnalysis, AnalysisError> {
        let key = CacheKey::new(AnalysisKind::PriceTrend, platform, category, days);
        if let Some(CachedAnalysis::PriceTrend(cached)) = self.cache.get(&key) {
            debug!("Price trend served from cache");
            return Ok(cached.clone());
        }

        let mut relevant = 0usize;
        let mut daily: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for (day, product) in self.products_since(days) {
            if platform.is_some_and(|wanted| *wanted != product.platform) {
                continue;
            }
            if category.is_some_and(|wanted| product.category.as_deref() != Some(wanted)) {
                continue;
            }
            ensure_finite(product)?;
            relevant += 1;
            if product.price > 0.0 {
                daily.entry(day).or_default().push(product.price);
            }
        }

        let analysis = if relevant == 0 {
            PriceTrendAnalysis::without_data(TrendStatus::NoData)
        } else if daily.len() < 2 {
            PriceTrendAnalysis::without_data(TrendStatus::InsufficientData)
        } else {
            price_trend_from_days(daily, relevant)?
        };

        self.cache.insert(key, CachedAnalysis::PriceTrend(analysis.clone()));
        Ok(analysis)
    }

    pub fn analyze_availability_trends(
        &mut self,
        platform: Option<&Platform>,
        days: i64,
    ) -> Result<AvailabilityTrend, AnalysisError> {
        let key = CacheKey::new(AnalysisKind::Availability, platform, None, days);
        if let Some(CachedAnalysis::Availability(cached)) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let mut daily: BTreeMap<NaiveDate, Vec<&Product>> = BTreeMap::new();
        for (day, product) in self.products_since(days) {
            if platform.is_some_and(|wanted| *wanted != product.platform) {
                continue;
            }
            daily.entry(day).or_default().push(product);
        }

        let daily_statistics: BTreeMap<NaiveDate, DailyAvailability> = daily
            .into_iter()
            .map(|(day, products)| {
                let out_of_stock = products
                    .iter()
                    .filter(|p| p.availability == Availability::OutOfStock)
                    .count();
                let in_stock = products
                    .iter()
                    .filter(|p| p.availability == Availability::InStock)
                    .count();
                (
                    day,
                    DailyAvailability {
                        total_products: products.len(),
                        in_stock,
                        out_of_stock,
                        availability_rate: availability_rate(&products),
                    },
                )
            })
            .collect();

        let rates: Vec<f64> = daily_statistics.values().map(|d| d.availability_rate).collect();
        let trend = if rates.is_empty() {
            AvailabilityDirection::NoData
        } else if rates.len() < 2 {
            AvailabilityDirection::Stable
        } else {
            let (first, second) = rates.split_at(rates.len() / 2);
            let change = mean(second).unwrap_or(0.0) - mean(first).unwrap_or(0.0);
            if change.abs() < AVAILABILITY_STABLE_BAND {
                AvailabilityDirection::Stable
            } else if change > 0.0 {
                AvailabilityDirection::Improving
            } else {
                AvailabilityDirection::Declining
            }
        };

        let analysis = AvailabilityTrend {
            trend,
            overall_availability_rate: round_to(mean(&rates).unwrap_or(0.0), 1),
            analysis_period_days: daily_statistics.len(),
            daily_statistics,
        };

        self.cache.insert(key, CachedAnalysis::Availability(analysis.clone()));
        Ok(analysis)
    }

    /// Best rated and most reviewed products over the whole retained window
    pub fn analyze_popular_products(
        &mut self,
        platform: Option<&Platform>,
        limit: usize,
    ) -> Result<Vec<PopularProduct>, AnalysisError> {
        let key = CacheKey::top(AnalysisKind::Popular, platform, limit);
        if let Some(CachedAnalysis::Popular(cached)) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let mut seen = HashSet::new();
        let mut scored = Vec::new();

        // Newest batch first so each id keeps its latest observation
        for batch in self.window.iter().rev() {
            for product in &batch.products {
                if platform.is_some_and(|wanted| *wanted != product.platform) {
                    continue;
                }
                if !seen.insert(product.id.as_str()) {
                    continue;
                }
                ensure_finite(product)?;
                if product.rating <= 0.0 || product.reviews_count == 0 {
                    continue;
                }

                scored.push(PopularProduct {
                    popularity_score: product.rating * ((product.reviews_count as f64) + 1.0).ln(),
                    rating: product.rating,
                    reviews_count: product.reviews_count,
                    product: product.clone(),
                });
            }
        }

        scored.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));
        scored.truncate(limit);

        self.cache.insert(key, CachedAnalysis::Popular(scored.clone()));
        Ok(scored)
    }

    pub fn analyze_category_trends(&mut self, days: i64) -> Result<CategoryAnalysis, AnalysisError> {
        let key = CacheKey::new(AnalysisKind::Category, None, None, days);
        if let Some(CachedAnalysis::Category(cached)) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let mut groups: BTreeMap<&str, Vec<&Product>> = BTreeMap::new();
        for (_, product) in self.products_since(days) {
            ensure_finite(product)?;
            groups.entry(product.category_or_default()).or_default().push(product);
        }

        let mut categories: Vec<CategoryStats> = groups
            .into_iter()
            .map(|(category, products)| {
                let figures = GroupFigures::of(&products);
                CategoryStats {
                    category: category.to_string(),
                    total_products: products.len(),
                    avg_price: figures.avg_price,
                    min_price: figures.min_price,
                    max_price: figures.max_price,
                    avg_rating: figures.avg_rating,
                    availability_rate: availability_rate(&products),
                }
            })
            .collect();
        categories.sort_by(|a, b| b.total_products.cmp(&a.total_products));

        let analysis = CategoryAnalysis {
            total_categories: categories.len(),
            categories,
            analysis_period_days: days,
        };

        self.cache.insert(key, CachedAnalysis::Category(analysis.clone()));
        Ok(analysis)
    }

    pub fn analyze_platform_performance(&mut self, days: i64) -> Result<PlatformPerformance, AnalysisError> {
        let key = CacheKey::new(AnalysisKind::Platform, None, None, days);
        if let Some(CachedAnalysis::Platform(cached)) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let mut groups: BTreeMap<&Platform, Vec<&Product>> = BTreeMap::new();
        for (_, product) in self.products_since(days) {
            ensure_finite(product)?;
            groups.entry(&product.platform).or_default().push(product);
        }

        let mut platforms: Vec<PlatformStats> = groups
            .into_iter()
            .map(|(platform, products)| {
                let figures = GroupFigures::of(&products);
                let variety: HashSet<&str> = products.iter().map(|p| p.title.as_str()).collect();
                PlatformStats {
                    platform: platform.clone(),
                    total_products: products.len(),
                    avg_price: figures.avg_price,
                    price_competitiveness: 0.0,
                    avg_rating: figures.avg_rating,
                    availability_rate: availability_rate(&products),
                    product_variety: variety.len(),
                }
            })
            .collect();

        let priced: Vec<f64> = platforms
            .iter()
            .map(|p| p.avg_price)
            .filter(|avg| *avg > 0.0)
            .collect();
        if let Some(overall) = mean(&priced) {
            for stats in platforms.iter_mut().filter(|p| p.avg_price > 0.0) {
                let score = 100.0 - (stats.avg_price / overall - 1.0) * 100.0;
                stats.price_competitiveness = round_to(score.max(0.0), 1);
            }
        }

        let analysis = PlatformPerformance {
            total_platforms: platforms.len(),
            platforms,
            analysis_period_days: days,
        };

        self.cache.insert(key, CachedAnalysis::Platform(analysis.clone()));
        Ok(analysis)
    }

    pub fn compare_platforms(&self, products: &[Product]) -> PlatformComparison {
        let comparison = compare_platforms(products);
        info!(
            "Cross-platform comparison: {} product groups",
            comparison.total_comparisons
        );
        comparison
    }

    pub fn export_summary(&self) -> TrendDataSummary {
        let range = self.window.date_range();
        TrendDataSummary {
            batch_count: self.window.len(),
            date_range_start: range.map(|(start, _)| start),
            date_range_end: range.map(|(_, end)| end),
            cache_entries: self.cache.len(),
            total_products_tracked: self.window.total_products(),
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for TrendEngine {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

fn price_trend_from_days(
    daily: BTreeMap<NaiveDate, Vec<f64>>,
    total_products_analyzed: usize,
) -> Result<PriceTrendAnalysis, AnalysisError> {
    let all_prices: Vec<f64> = daily.values().flatten().copied().collect();
    let daily_averages: BTreeMap<NaiveDate, f64> = daily
        .iter()
        .filter_map(|(day, prices)| Some((*day, mean(prices)?)))
        .collect();
    let timeline: Vec<f64> = daily_averages.values().copied().collect();

    let calculation = calculate_price_trend(&timeline);
    let (min_price, max_price) = min_max(&all_prices)
        .ok_or_else(|| AnalysisError::CalculationFailed("no positive prices".to_string()))?;

    Ok(PriceTrendAnalysis {
        trend: calculation.trend,
        confidence: calculation.confidence,
        analysis: Some(PriceTrendDetails {
            analysis_period_days: daily_averages.len(),
            daily_averages,
            trend_strength: calculation.strength,
            percentage_change: calculation.percentage_change,
            price_volatility: round_to(std_dev(&all_prices), 2),
            min_price,
            max_price,
            avg_price: round_to(mean(&all_prices).unwrap_or(0.0), 2),
            price_range: round_to(max_price - min_price, 2),
            total_products_analyzed,
        }),
    })
}

/// Keep a section's result, or log and record its failure
fn capture<T>(section: &str, result: Result<T, AnalysisError>, errors: &mut BTreeMap<String, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Trend analysis section {} failed: {}", section, e);
            errors.insert(section.to_string(), e.to_string());
            None
        }
    }
}
