//! Product domain - raw scraped records and their canonical form

mod filter;
mod normalizer;
mod parsing;

pub use filter::ProductFilter;
pub use normalizer::{deduplicate_products, Normalizer};
pub use parsing::{
    calculate_discount_percentage, normalize_availability, normalize_count, normalize_currency,
    normalize_rating, parse_price,
};

use crate::shared::types::{Availability, Platform};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record produced by a scraping adapter, keyed by platform-specific field names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProduct(pub Map<String, Value>);

impl RawProduct {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// String field, trimmed; numbers are rendered so numeric ids still match
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl From<Map<String, Value>> for RawProduct {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Canonical product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub price: f64,
    pub original_price: f64,
    pub currency: String,
    pub discount_percentage: f64,
    pub rating: f64,
    pub reviews_count: u64,
    pub availability: Availability,
    pub in_stock: bool,
    pub platform: Platform,
    pub platform_id: String,
    pub search_term: String,
    pub category: Option<String>,
    pub platform_specific: Map<String, Value>,
    pub scraped_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Product {
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or("uncategorized")
    }

    /// Same record ignoring the timestamps refreshed by every normalization
    pub fn same_content(&self, other: &Product) -> bool {
        let mut other = other.clone();
        other.scraped_at = self.scraped_at;
        other.last_updated = self.last_updated;
        *self == other
    }
}

impl From<&Product> for RawProduct {
    fn from(product: &Product) -> Self {
        let mut raw = RawProduct(product.platform_specific.clone());
        raw.insert("title", product.title.clone());
        raw.insert("description", product.description.clone());
        raw.insert("url", product.url.clone());
        raw.insert("image_url", product.image_url.clone());
        raw.insert("price", product.price);
        raw.insert("original_price", product.original_price);
        raw.insert("currency", product.currency.clone());
        raw.insert("rating", product.rating);
        raw.insert("reviews_count", product.reviews_count);
        raw.insert("availability", product.availability.as_str());
        raw.insert("available", product.in_stock);
        raw.insert("platform", product.platform.as_str());
        raw.insert("search_term", product.search_term.clone());
        if let Some(category) = &product.category {
            raw.insert("category", category.clone());
        }
        raw.insert("platform_id", product.platform_id.clone());
        raw.insert("id", product.id.clone());
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_product_accessors() {
        let raw = RawProduct::new()
            .with("title", "  Widget  ")
            .with("item_id", 12345)
            .with("blank", "   ")
            .with("missing", Value::Null)
            .with("available", false);

        assert_eq!(raw.get_str("title").as_deref(), Some("Widget"));
        assert_eq!(raw.get_str("item_id").as_deref(), Some("12345"));
        assert_eq!(raw.get_str("blank"), None);
        assert!(!raw.contains("missing"));
        assert_eq!(raw.get_bool("available"), Some(false));
    }

    #[test]
    fn test_raw_product_deserializes_from_object() {
        let raw: RawProduct = serde_json::from_value(json!({
            "title": "Laptop",
            "price": "$999.99",
            "platform": "amazon"
        }))
        .unwrap();
        assert_eq!(raw.get_str("price").as_deref(), Some("$999.99"));
    }
}
