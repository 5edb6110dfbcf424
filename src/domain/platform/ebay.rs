use serde_json::{json, Map, Value};
use super::traits::{copy_field, PlatformAdapter};
use crate::domain::product::RawProduct;
use crate::shared::types::Platform;

pub struct EbayAdapter;

impl PlatformAdapter for EbayAdapter {
    fn platform(&self) -> Platform {
        Platform::Ebay
    }

    fn id_fields(&self) -> &'static [&'static str] {
        &["item_id", "product_id"]
    }

    fn extract_specific_fields(&self, raw: &RawProduct) -> Map<String, Value> {
        let mut fields = Map::new();
        copy_field(raw, &mut fields, "item_id", json!(""));
        copy_field(raw, &mut fields, "sale_type", json!(""));
        copy_field(raw, &mut fields, "condition", json!(""));
        copy_field(raw, &mut fields, "bid_count", json!(0));
        copy_field(raw, &mut fields, "time_left", json!(""));
        copy_field(raw, &mut fields, "seller", json!({}));
        fields
    }
}
