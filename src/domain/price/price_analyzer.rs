//! Price analysis and calculations

use super::{PriceRecord, PriceSeriesStats, PriceTrend};
use crate::shared::types::TrendStatus;
use crate::shared::utils::{calculate_percentage_change, mean, min_max, round_to, std_dev};

/// Moves smaller than this (in percent) between first and last point are "stable"
const SERIES_STABLE_BAND_PCT: f64 = 2.0;

/// Analyzes price data and trends
pub struct PriceAnalyzer;

impl PriceAnalyzer {
    pub fn calculate_price_change(&self, old_price: f64, new_price: f64) -> f64 {
        calculate_percentage_change(old_price, new_price)
    }

    pub fn is_significant_change(&self, change_percentage: f64, threshold: f64) -> bool {
        change_percentage.abs() >= threshold
    }

    /// First-vs-last trend of a chronological series of records
    pub fn series_trend(&self, records: &[&PriceRecord]) -> PriceTrend {
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return PriceTrend::without_data(TrendStatus::NoData);
        };
        if records.len() < 2 {
            return PriceTrend::without_data(TrendStatus::InsufficientData);
        }

        let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
        let price_change = last.price - first.price;
        let percentage_change = self.calculate_price_change(first.price, last.price);
        let (min_price, max_price) = min_max(&prices).unwrap_or((0.0, 0.0));

        PriceTrend {
            trend: TrendStatus::from_change(percentage_change, SERIES_STABLE_BAND_PCT),
            confidence: self.trend_confidence(&prices),
            stats: Some(PriceSeriesStats {
                percentage_change: round_to(percentage_change, 2),
                price_change: round_to(price_change, 2),
                min_price,
                max_price,
                avg_price: round_to(mean(&prices).unwrap_or(0.0), 2),
                volatility: round_to(std_dev(&prices), 2),
                data_points: prices.len(),
                period_days: (last.timestamp - first.timestamp).num_days(),
            }),
        }
    }

    /// Directional consistency scaled by how many points back it up (0-1)
    pub fn trend_confidence(&self, prices: &[f64]) -> f64 {
        if prices.len() < 3 {
            return 0.5;
        }

        let moves: Vec<f64> = prices
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|delta| *delta != 0.0)
            .collect();
        if moves.is_empty() {
            return 0.5;
        }

        let ups = moves.iter().filter(|d| **d > 0.0).count();
        let downs = moves.len() - ups;
        let consistency = ups.max(downs) as f64 / moves.len() as f64;
        let data_factor = (prices.len() as f64 / 10.0).min(1.0);

        round_to(consistency * data_factor, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::Platform;
    use chrono::{Duration, Utc};

    fn records(prices: &[f64]) -> Vec<PriceRecord> {
        let start = Utc::now() - Duration::days(prices.len() as i64);
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PriceRecord {
                price: *p,
                currency: "USD".to_string(),
                platform: Platform::Amazon,
                timestamp: start + Duration::days(i as i64),
            })
            .collect()
    }

    #[test]
    fn test_price_change_and_significance() {
        let analyzer = PriceAnalyzer;
        assert_eq!(analyzer.calculate_price_change(100.0, 80.0), -20.0);
        assert!(analyzer.is_significant_change(-1.0, 1.0));
        assert!(!analyzer.is_significant_change(0.5, 1.0));
    }

    #[test]
    fn test_series_trend_first_vs_last() {
        let analyzer = PriceAnalyzer;
        let history = records(&[100.0, 90.0, 95.0, 110.0]);
        let refs: Vec<&PriceRecord> = history.iter().collect();
        let trend = analyzer.series_trend(&refs);

        assert_eq!(trend.trend, TrendStatus::Increasing);
        let stats = trend.stats.unwrap();
        assert_eq!(stats.percentage_change, 10.0);
        assert_eq!(stats.price_change, 10.0);
        assert_eq!(stats.min_price, 90.0);
        assert_eq!(stats.max_price, 110.0);
        assert_eq!(stats.data_points, 4);
        assert_eq!(stats.period_days, 3);
    }

    #[test]
    fn test_series_trend_small_move_is_stable() {
        let analyzer = PriceAnalyzer;
        let history = records(&[100.0, 101.5]);
        let refs: Vec<&PriceRecord> = history.iter().collect();
        assert_eq!(analyzer.series_trend(&refs).trend, TrendStatus::Stable);
    }

    #[test]
    fn test_confidence_scales_with_points() {
        let analyzer = PriceAnalyzer;
        assert_eq!(analyzer.trend_confidence(&[1.0, 2.0]), 0.5);
        assert_eq!(analyzer.trend_confidence(&[5.0, 5.0, 5.0]), 0.5);
        // 3 of 4 moves up, 5 points -> 0.75 * 0.5
        assert_eq!(analyzer.trend_confidence(&[1.0, 2.0, 3.0, 2.5, 4.0]), 0.38);
        let rising: Vec<f64> = (0..12).map(f64::from).collect();
        assert_eq!(analyzer.trend_confidence(&rising), 1.0);
    }
}
