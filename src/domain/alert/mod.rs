//! Price alert domain

mod alert_engine;

pub use alert_engine::AlertEngine;

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::config::AlertConfig;
use crate::shared::errors::AlertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Current price at or below the target
    Below,
    /// Current price at or above the target
    Above,
    /// Absolute move vs the previous recorded price, in percent, at or above the target
    Change,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Below => "below",
            AlertType::Above => "above",
            AlertType::Change => "change",
        }
    }
}

impl FromStr for AlertType {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "below" => Ok(AlertType::Below),
            "above" => Ok(AlertType::Above),
            "change" => Ok(AlertType::Change),
            other => Err(AlertError::InvalidAlertType(other.to_string())),
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: String,
    pub product_id: String,
    pub target_price: f64,
    pub alert_type: AlertType,
    pub created_at: DateTime<Utc>,
    pub triggered: bool,
    pub triggered_at: Option<DateTime<Utc>>,
    pub triggered_price: Option<f64>,
}

/// Validated alert registration
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRequest {
    pub product_id: String,
    pub target: f64,
    pub alert_type: AlertType,
}

impl AlertRequest {
    pub fn new(product_id: &str, target: f64, alert_type: AlertType) -> Result<Self, AlertError> {
        let product_id = product_id.trim();
        if product_id.is_empty() {
            return Err(AlertError::InvalidFormat("empty product id".to_string()));
        }
        if !target.is_finite() || target < 0.0 {
            return Err(AlertError::InvalidTarget(target));
        }
        Ok(Self {
            product_id: product_id.to_string(),
            target,
            alert_type,
        })
    }
}

/// `product_id:type:target`; the product id may itself contain colons
impl FromStr for AlertRequest {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(target), Some(alert_type), Some(product_id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AlertError::InvalidFormat(s.to_string()));
        };

        let target: f64 = target
            .trim()
            .parse()
            .map_err(|_| AlertError::InvalidFormat(s.to_string()))?;
        AlertRequest::new(product_id, target, alert_type.parse()?)
    }
}

impl TryFrom<&AlertConfig> for AlertRequest {
    type Error = AlertError;

    fn try_from(config: &AlertConfig) -> Result<Self, Self::Error> {
        AlertRequest::new(&config.product_id, config.target_price, config.alert_type.parse()?)
    }
}
