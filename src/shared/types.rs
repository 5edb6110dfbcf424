//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace a product was scraped from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Amazon,
    Ebay,
    Walmart,
    Etsy,
    Shopify,
    Other(String),
}

impl Platform {
    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Ebay => "ebay",
            Platform::Walmart => "walmart",
            Platform::Etsy => "etsy",
            Platform::Shopify => "shopify",
            Platform::Other(name) => name.as_str(),
        }
    }

    /// Platforms with a dedicated adapter
    pub fn known() -> Vec<Platform> {
        vec![
            Platform::Amazon,
            Platform::Ebay,
            Platform::Walmart,
            Platform::Etsy,
            Platform::Shopify,
        ]
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "amazon" => Platform::Amazon,
            "ebay" => Platform::Ebay,
            "walmart" => Platform::Walmart,
            "etsy" => Platform::Etsy,
            "shopify" => Platform::Shopify,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.as_str().to_string()
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Platform::from(s.to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical stock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    LimitedStock,
    #[default]
    Unknown,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::LimitedStock => "limited_stock",
            Availability::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    Increasing,
    Decreasing,
    Stable,
    NoData,
    InsufficientData,
}

impl TrendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStatus::Increasing => "increasing",
            TrendStatus::Decreasing => "decreasing",
            TrendStatus::Stable => "stable",
            TrendStatus::NoData => "no_data",
            TrendStatus::InsufficientData => "insufficient_data",
        }
    }

    /// Classify a percentage change against a symmetric stability band
    pub fn from_change(percentage_change: f64, stable_band: f64) -> Self {
        if percentage_change.abs() < stable_band {
            TrendStatus::Stable
        } else if percentage_change > 0.0 {
            TrendStatus::Increasing
        } else {
            TrendStatus::Decreasing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip() {
        assert_eq!(Platform::from("Amazon".to_string()), Platform::Amazon);
        assert_eq!(
            Platform::from("aliexpress".to_string()),
            Platform::Other("aliexpress".to_string())
        );

        let json = serde_json::to_string(&Platform::Ebay).unwrap();
        assert_eq!(json, "\"ebay\"");
        let parsed: Platform = serde_json::from_str("\"shopify\"").unwrap();
        assert_eq!(parsed, Platform::Shopify);
    }

    #[test]
    fn test_trend_status_from_change() {
        assert_eq!(TrendStatus::from_change(0.5, 1.0), TrendStatus::Stable);
        assert_eq!(TrendStatus::from_change(-1.0, 1.0), TrendStatus::Decreasing);
        assert_eq!(TrendStatus::from_change(3.0, 2.0), TrendStatus::Increasing);
        assert_eq!(
            serde_json::to_string(&TrendStatus::InsufficientData).unwrap(),
            "\"insufficient_data\""
        );
    }
}
