use serde_json::{json, Map, Value};
use super::traits::{copy_field, PlatformAdapter};
use crate::domain::product::RawProduct;
use crate::shared::types::Platform;

pub struct WalmartAdapter;

impl PlatformAdapter for WalmartAdapter {
    fn platform(&self) -> Platform {
        Platform::Walmart
    }

    fn id_fields(&self) -> &'static [&'static str] {
        &["product_id"]
    }

    fn extract_specific_fields(&self, raw: &RawProduct) -> Map<String, Value> {
        let mut fields = Map::new();
        copy_field(raw, &mut fields, "product_id", json!(""));
        copy_field(raw, &mut fields, "seller", json!(""));
        copy_field(raw, &mut fields, "shipping", json!({}));
        fields
    }
}
