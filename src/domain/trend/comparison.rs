//! Cross-platform price comparison of similar products

use std::collections::{BTreeMap, HashMap};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::shared::types::Platform;
use crate::shared::utils::{mean, median, min_max, round_to};

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

/// Leading title words that identify a group of similar products
const GROUP_KEY_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub platform: Platform,
    pub price: f64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformPrice {
    pub price: f64,
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductComparison {
    pub group_key: String,
    /// Title of the cheapest listing
    pub title: String,
    pub cheapest: PriceQuote,
    pub most_expensive: PriceQuote,
    pub price_range: f64,
    pub average_price: f64,
    /// Lowest price per platform
    pub platform_prices: BTreeMap<Platform, PlatformPrice>,
    pub total_variants: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformPriceStats {
    pub count: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub median_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformComparison {
    pub product_comparisons: Vec<ProductComparison>,
    pub platform_statistics: BTreeMap<Platform, PlatformPriceStats>,
    pub total_comparisons: usize,
}

/// Group key from the first words of the lowercased, punctuation-free title
fn group_key(title: &str) -> Option<String> {
    let lowered = title.to_lowercase();
    let simplified = PUNCTUATION.replace_all(&lowered, "");
    let words: Vec<&str> = simplified.split_whitespace().take(GROUP_KEY_WORDS).collect();
    (words.len() == GROUP_KEY_WORDS).then(|| words.join(" "))
}

fn compare_group(group_key: String, products: &[&Product]) -> Option<ProductComparison> {
    if products.len() < 2 {
        return None;
    }

    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));
    let cheapest = *sorted.first()?;
    let most_expensive = *sorted.last()?;

    let mut platform_prices: BTreeMap<Platform, PlatformPrice> = BTreeMap::new();
    for product in products {
        let lower = platform_prices
            .get(&product.platform)
            .map_or(true, |current| product.price < current.price);
        if lower {
            platform_prices.insert(
                product.platform.clone(),
                PlatformPrice {
                    price: product.price,
                    product_id: product.id.clone(),
                },
            );
        }
    }

    let prices: Vec<f64> = products.iter().map(|p| p.price).collect();
    let quote = |p: &Product| PriceQuote {
        platform: p.platform.clone(),
        price: p.price,
        url: p.url.clone(),
    };

    Some(ProductComparison {
        group_key,
        title: cheapest.title.clone(),
        cheapest: quote(cheapest),
        most_expensive: quote(most_expensive),
        price_range: round_to(most_expensive.price - cheapest.price, 2),
        average_price: round_to(mean(&prices).unwrap_or(0.0), 2),
        platform_prices,
        total_variants: products.len(),
    })
}

fn platform_statistics(products: &[Product]) -> BTreeMap<Platform, PlatformPriceStats> {
    let mut prices: HashMap<&Platform, Vec<f64>> = HashMap::new();
    for product in products.iter().filter(|p| p.price > 0.0) {
        prices.entry(&product.platform).or_default().push(product.price);
    }

    prices
        .into_iter()
        .filter_map(|(platform, prices)| {
            let (min_price, max_price) = min_max(&prices)?;
            Some((
                platform.clone(),
                PlatformPriceStats {
                    count: prices.len(),
                    avg_price: round_to(mean(&prices)?, 2),
                    min_price,
                    max_price,
                    median_price: round_to(median(&prices)?, 2),
                },
            ))
        })
        .collect()
}

/// Compare prices of similar products across platforms
pub fn compare_platforms(products: &[Product]) -> PlatformComparison {
    let mut groups: BTreeMap<String, Vec<&Product>> = BTreeMap::new();
    for product in products {
        if let Some(key) = group_key(&product.title) {
            groups.entry(key).or_default().push(product);
        }
    }

    let product_comparisons: Vec<ProductComparison> = groups
        .into_iter()
        .filter_map(|(key, group)| compare_group(key, &group))
        .collect();

    PlatformComparison {
        total_comparisons: product_comparisons.len(),
        product_comparisons,
        platform_statistics: platform_statistics(products),
    }
}
