use serde_json::{json, Map, Value};
use super::traits::{copy_field, PlatformAdapter};
use crate::domain::product::RawProduct;
use crate::shared::types::Platform;

pub struct ShopifyAdapter;

impl PlatformAdapter for ShopifyAdapter {
    fn platform(&self) -> Platform {
        Platform::Shopify
    }

    fn id_fields(&self) -> &'static [&'static str] {
        &["product_id", "variant_id"]
    }

    fn extract_specific_fields(&self, raw: &RawProduct) -> Map<String, Value> {
        let mut fields = Map::new();
        copy_field(raw, &mut fields, "product_id", json!(""));
        copy_field(raw, &mut fields, "vendor", json!(""));
        copy_field(raw, &mut fields, "product_type", json!(""));
        copy_field(raw, &mut fields, "tags", json!([]));
        copy_field(raw, &mut fields, "variants_count", json!(0));
        copy_field(raw, &mut fields, "store_url", json!(""));
        copy_field(raw, &mut fields, "store_domain", json!(""));
        fields
    }

    // Shopify's products.json exposes a boolean `available` per product
    fn stock_override(&self, raw: &RawProduct) -> Option<bool> {
        Some(raw.get_bool("available").unwrap_or(true))
    }
}
