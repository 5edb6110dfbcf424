use std::fs;
use std::path::Path;
use serde::Deserialize;
use crate::domain::product::ProductFilter;
use crate::shared::errors::AppError;

/// Normalizer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub max_title_len: usize,
    pub max_description_len: usize,
    pub default_currency: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_title_len: 500,
            max_description_len: 1000,
            default_currency: "USD".to_string(),
        }
    }
}

/// Price history settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_records_per_product: usize,
    pub change_threshold_pct: f64,
    pub trend_window_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_records_per_product: 100,
            change_threshold_pct: 1.0,
            trend_window_days: 30,
        }
    }
}

/// Trend engine settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub retention_days: i64,
    pub report_window_days: i64,
    pub popular_limit: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            report_window_days: 7,
            popular_limit: 10,
        }
    }
}

/// Alert registered at startup
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    pub product_id: String,
    pub target_price: f64,
    pub alert_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level tracker configuration (Config.toml)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub normalizer: NormalizerConfig,
    pub history: HistoryConfig,
    pub trends: TrendConfig,
    pub filter: ProductFilter,
    pub alerts: Vec<AlertConfig>,
    pub logging: LoggingConfig,
}

impl TrackerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let config_content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.history.max_records_per_product == 0 {
            return Err(AppError::ConfigError(
                "history.max_records_per_product must be positive".to_string(),
            ));
        }
        if self.trends.retention_days <= 0 || self.trends.report_window_days <= 0 {
            return Err(AppError::ConfigError(
                "trend windows must be positive day counts".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::Platform;
    use std::io::Write;

    #[test]
    fn test_defaults_when_empty() {
        let cfg = TrackerConfig::from_toml("").unwrap();
        assert_eq!(cfg.history.max_records_per_product, 100);
        assert_eq!(cfg.trends.retention_days, 30);
        assert_eq!(cfg.trends.report_window_days, 7);
        assert_eq!(cfg.normalizer.default_currency, "USD");
        assert!(cfg.alerts.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[history]
max_records_per_product = 50

[filter]
min_price = 10.0
in_stock_only = true
platforms = ["amazon", "ebay"]

[[alerts]]
product_id = "amazon_B0TEST"
target_price = 90.0
alert_type = "below"

[logging]
level = "debug"
"#
        )
        .unwrap();

        let cfg = TrackerConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.history.max_records_per_product, 50);
        assert_eq!(cfg.history.change_threshold_pct, 1.0);
        assert_eq!(cfg.filter.min_price, Some(10.0));
        assert!(cfg.filter.in_stock_only);
        let platforms = cfg.filter.platforms.as_ref().unwrap();
        assert!(platforms.contains(&Platform::Amazon));
        assert_eq!(cfg.alerts.len(), 1);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = TrackerConfig::from_toml("[history]\nmax_records_per_product = 0\n").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
