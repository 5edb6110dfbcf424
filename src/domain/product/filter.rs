use std::collections::HashSet;
use serde::Deserialize;
use tracing::info;

use super::Product;
use crate::shared::types::Platform;

/// Optional product predicates, AND-combined
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub in_stock_only: bool,
    pub platforms: Option<HashSet<Platform>>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.min_price.map_or(true, |min| product.price >= min)
            && self.max_price.map_or(true, |max| product.price <= max)
            && self.min_rating.map_or(true, |min| product.rating >= min)
            && (!self.in_stock_only || product.in_stock)
            && self
                .platforms
                .as_ref()
                .map_or(true, |platforms| platforms.contains(&product.platform))
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        if self.is_empty() {
            return products;
        }
        let total = products.len();
        let filtered: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        info!("Filtering: {}/{} products kept", filtered.len(), total);
        filtered
    }
}
