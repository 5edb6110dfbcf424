use serde_json::{json, Map, Value};
use super::traits::{copy_field, PlatformAdapter};
use crate::domain::product::RawProduct;
use crate::shared::types::Platform;

pub struct AmazonAdapter;

impl AmazonAdapter {
    fn prime_eligible(raw: &RawProduct) -> bool {
        if let Some(flag) = raw.get_bool("prime_eligible") {
            return flag;
        }
        raw.get("shipping")
            .and_then(|s| s.get("speed"))
            .and_then(Value::as_str)
            .map(|speed| speed.to_lowercase().contains("prime"))
            .unwrap_or(false)
    }
}

impl PlatformAdapter for AmazonAdapter {
    fn platform(&self) -> Platform {
        Platform::Amazon
    }

    fn id_fields(&self) -> &'static [&'static str] {
        &["asin", "product_id"]
    }

    fn extract_specific_fields(&self, raw: &RawProduct) -> Map<String, Value> {
        let mut fields = Map::new();
        copy_field(raw, &mut fields, "asin", json!(""));
        fields.insert("prime_eligible".to_string(), json!(Self::prime_eligible(raw)));
        fields
    }
}
