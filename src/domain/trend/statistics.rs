//! Half-split trend over a daily series

use serde::{Deserialize, Serialize};

use crate::shared::types::TrendStatus;
use crate::shared::utils::{calculate_percentage_change, mean, round_to};

/// Moves below this between the two halves (in percent) are "stable"
const STABLE_BAND_PCT: f64 = 1.0;
/// Day-to-day moves at or below this are noise
const MIN_MOVE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendCalculation {
    pub trend: TrendStatus,
    /// 0-100
    pub strength: f64,
    /// 0-1
    pub confidence: f64,
    pub percentage_change: f64,
}

/// Compare the mean of the first half of `values` with the mean of the second.
/// The first half holds `n / 2` items.
pub fn calculate_price_trend(values: &[f64]) -> TrendCalculation {
    if values.len() < 2 {
        return TrendCalculation {
            trend: TrendStatus::Stable,
            strength: 0.0,
            confidence: 0.0,
            percentage_change: 0.0,
        };
    }

    let (first_half, second_half) = values.split_at(values.len() / 2);
    let first = mean(first_half).unwrap_or(0.0);
    let second = mean(second_half).unwrap_or(0.0);
    let percentage_change = calculate_percentage_change(first, second);

    TrendCalculation {
        trend: TrendStatus::from_change(percentage_change, STABLE_BAND_PCT),
        strength: round_to((percentage_change.abs() * 10.0).min(100.0), 1),
        confidence: trend_consistency(values),
        percentage_change: round_to(percentage_change, 2),
    }
}

/// Share of day-to-day moves that agree with the majority direction
pub fn trend_consistency(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 0.5;
    }

    let (ups, downs) = values
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|delta| delta.abs() > MIN_MOVE)
        .fold((0usize, 0usize), |(ups, downs), delta| {
            if delta > 0.0 {
                (ups + 1, downs)
            } else {
                (ups, downs + 1)
            }
        });

    let total = ups + downs;
    if total == 0 {
        return 0.5;
    }
    round_to(ups.max(downs) as f64 / total as f64, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_series_is_increasing() {
        let calc = calculate_price_trend(&[100.0, 105.0, 110.0, 115.0, 120.0]);
        assert_eq!(calc.trend, TrendStatus::Increasing);
        assert!(calc.confidence > 0.5);
        // 102.5 -> 115
        assert_eq!(calc.percentage_change, 12.2);
        assert_eq!(calc.strength, 100.0);
    }

    #[test]
    fn test_noisy_flat_series_is_stable() {
        let calc = calculate_price_trend(&[100.0, 101.0, 99.5, 100.5, 99.8]);
        assert_eq!(calc.trend, TrendStatus::Stable);
        assert!(calc.strength < 10.0);
    }

    #[test]
    fn test_two_points_decreasing() {
        let calc = calculate_price_trend(&[200.0, 150.0]);
        assert_eq!(calc.trend, TrendStatus::Decreasing);
        assert_eq!(calc.percentage_change, -25.0);
        assert_eq!(calc.confidence, 0.5);
    }

    #[test]
    fn test_consistency_ignores_tiny_moves() {
        assert_eq!(trend_consistency(&[1.0, 2.0]), 0.5);
        assert_eq!(trend_consistency(&[10.0, 10.005, 10.01]), 0.5);
        assert_eq!(trend_consistency(&[1.0, 2.0, 3.0, 2.0]), 0.67);
        assert_eq!(trend_consistency(&[5.0, 4.0, 3.0, 3.0, 2.0]), 1.0);
    }
}
