use serde_json::{json, Map, Value};
use super::traits::{copy_field, PlatformAdapter};
use crate::domain::product::RawProduct;
use crate::shared::types::Platform;

pub struct EtsyAdapter;

impl PlatformAdapter for EtsyAdapter {
    fn platform(&self) -> Platform {
        Platform::Etsy
    }

    fn id_fields(&self) -> &'static [&'static str] {
        &["listing_id", "product_id"]
    }

    fn extract_specific_fields(&self, raw: &RawProduct) -> Map<String, Value> {
        let mut fields = Map::new();
        copy_field(raw, &mut fields, "listing_id", json!(""));
        copy_field(raw, &mut fields, "shop", json!({}));
        copy_field(raw, &mut fields, "badges", json!([]));
        copy_field(raw, &mut fields, "favorites_count", json!(0));
        fields
    }
}
