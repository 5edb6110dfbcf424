//! Raw record -> `Product` normalization

use std::collections::HashSet;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use super::parsing::{
    calculate_discount_percentage, detect_currency_symbol, normalize_availability,
    normalize_count, normalize_currency, normalize_rating, parse_price,
};
use super::{Product, RawProduct};
use crate::domain::platform::PlatformRegistry;
use crate::shared::config::NormalizerConfig;
use crate::shared::errors::ValidationError;
use crate::shared::types::{Availability, Platform};
use crate::shared::utils::{stable_hash_suffix, truncate_chars};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f-\x9f]").expect("valid regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

const TITLE_NOISE_PREFIXES: [&str; 3] = ["New Listing", "SPONSORED", "Ad"];
const MISSING_TITLE: &str = "N/A";

/// Turns scraped records into canonical products
pub struct Normalizer {
    config: NormalizerConfig,
    registry: PlatformRegistry,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig, registry: PlatformRegistry) -> Self {
        Self { config, registry }
    }

    /// Normalize a batch, dropping invalid records
    pub fn normalize(&self, raw_products: &[RawProduct]) -> Vec<Product> {
        let normalized: Vec<Product> = raw_products
            .iter()
            .filter_map(|raw| match self.normalize_one(raw) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(
                        title = %raw.get_str("title").unwrap_or_default(),
                        "Dropping invalid product: {}", e
                    );
                    None
                }
            })
            .collect();

        info!("Normalization done: {}/{} products", normalized.len(), raw_products.len());
        normalized
    }

    /// Normalize a single record
    pub fn normalize_one(&self, raw: &RawProduct) -> Result<Product, ValidationError> {
        let platform = raw
            .get_str("platform")
            .map(Platform::from)
            .ok_or(ValidationError::MissingField("platform"))?;

        let title = raw
            .get_str("title")
            .map(|t| self.clean_title(&t))
            .unwrap_or_default();
        if title.is_empty() || title == MISSING_TITLE {
            return Err(ValidationError::MissingField("title"));
        }

        let price = raw.get("price").map(parse_price).unwrap_or(0.0);
        let original_price = raw.get("original_price").map(parse_price).unwrap_or(0.0);

        let currency = match raw.get_str("currency") {
            Some(code) => normalize_currency(Some(&code), &self.config.default_currency),
            None => raw
                .get_str("price")
                .and_then(|p| detect_currency_symbol(&p))
                .map(str::to_string)
                .unwrap_or_else(|| self.config.default_currency.clone()),
        };

        let raw_url = raw.get_str("url");
        let platform_id = self.extract_platform_id(&platform, raw);
        let id = match existing_id(&platform, raw) {
            Some(id) if platform_id.is_empty() => id,
            _ => generate_product_id(
                &platform,
                &platform_id,
                raw_url.as_deref().unwrap_or_default(),
                &title,
            ),
        };

        let availability = normalize_availability(raw.get("availability"));
        let in_stock = self.determine_stock_status(&platform, availability, raw);

        let platform_specific = self
            .registry
            .get(&platform)
            .map(|adapter| adapter.extract_specific_fields(raw))
            .unwrap_or_default();

        let now = Utc::now();
        let product = Product {
            id,
            title,
            description: self.clean_description(raw.get_str("description").as_deref()),
            url: validate_url(raw_url.as_deref()),
            image_url: validate_url(raw.get_str("image_url").as_deref()),
            price,
            original_price,
            currency,
            discount_percentage: calculate_discount_percentage(price, original_price),
            rating: raw.get("rating").map(normalize_rating).unwrap_or(0.0),
            reviews_count: raw.get("reviews_count").map(normalize_count).unwrap_or(0),
            availability,
            in_stock,
            platform,
            platform_id,
            search_term: raw.get_str("search_term").unwrap_or_default(),
            category: raw.get_str("category"),
            platform_specific,
            scraped_at: now,
            last_updated: now,
        };

        debug!(id = %product.id, price = product.price, "Normalized product");
        Ok(product)
    }

    fn extract_platform_id(&self, platform: &Platform, raw: &RawProduct) -> String {
        self.registry
            .get(platform)
            .and_then(|adapter| adapter.extract_platform_id(raw))
            .or_else(|| raw.get_str("platform_id"))
            .unwrap_or_default()
    }

    fn determine_stock_status(
        &self,
        platform: &Platform,
        availability: Availability,
        raw: &RawProduct,
    ) -> bool {
        match availability {
            Availability::InStock => true,
            Availability::OutOfStock => false,
            _ => self
                .registry
                .get(platform)
                .and_then(|adapter| adapter.stock_override(raw))
                .unwrap_or(true),
        }
    }

    /// Collapse whitespace, strip listing noise, cap length
    pub fn clean_title(&self, title: &str) -> String {
        let mut cleaned = WHITESPACE.replace_all(title.trim(), " ").into_owned();

        while let Some(rest) = strip_noise_prefix(&cleaned) {
            cleaned = rest;
        }

        truncate_chars(&cleaned, self.config.max_title_len)
            .trim_end()
            .to_string()
    }

    pub fn clean_description(&self, description: Option<&str>) -> String {
        let Some(description) = description else {
            return String::new();
        };
        let without_tags = HTML_TAG.replace_all(description, "");
        let without_controls = CONTROL_CHARS.replace_all(&without_tags, "");
        let collapsed = WHITESPACE.replace_all(without_controls.trim(), " ");
        truncate_chars(&collapsed, self.config.max_description_len)
            .trim_end()
            .to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default(), PlatformRegistry::new())
    }
}

fn strip_noise_prefix(title: &str) -> Option<String> {
    TITLE_NOISE_PREFIXES.iter().find_map(|prefix| {
        let rest = title.strip_prefix(prefix)?;
        // whole words only: "Adidas" is not an "Ad" prefix
        match rest.chars().next() {
            Some(c) if c.is_alphanumeric() => None,
            _ => Some(rest.trim_start().to_string()),
        }
    })
}

fn validate_url(url: Option<&str>) -> String {
    match url.map(Url::parse) {
        Some(Ok(parsed)) if parsed.has_host() => url.unwrap_or_default().to_string(),
        _ => String::new(),
    }
}

/// Id carried by an already-normalized record, e.g. one rebuilt with `RawProduct::from`
fn existing_id(platform: &Platform, raw: &RawProduct) -> Option<String> {
    let id = raw.get_str("id")?;
    let prefix = format!("{}_", platform);
    match id.strip_prefix(&prefix) {
        Some(suffix) if !suffix.is_empty() => Some(id),
        _ => None,
    }
}

/// `{platform}_{suffix}`: marketplace id, else hash of the raw URL, else title hash
fn generate_product_id(platform: &Platform, platform_id: &str, url: &str, title: &str) -> String {
    let suffix = if !platform_id.is_empty() {
        platform_id.to_string()
    } else if !url.is_empty() {
        stable_hash_suffix(url)
    } else if !title.is_empty() {
        stable_hash_suffix(title)
    } else {
        Utc::now().timestamp_micros().to_string()
    };
    format!("{}_{}", platform, suffix)
}

/// Drop later records with the same platform and simplified title
pub fn deduplicate_products(products: Vec<Product>) -> Vec<Product> {
    let total = products.len();
    let mut seen = HashSet::new();
    let unique: Vec<Product> = products
        .into_iter()
        .filter(|p| {
            let title_key = NON_WORD.replace_all(&p.title, "").to_lowercase();
            seen.insert(format!("{}_{}", p.platform, title_key.trim()))
        })
        .collect();

    info!("Deduplication: {}/{} unique products", unique.len(), total);
    unique
}
