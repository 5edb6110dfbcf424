use serde_json::{Map, Value};
use crate::domain::product::RawProduct;
use crate::shared::types::Platform;

/// Platform-specific knowledge about scraped records
///
/// One implementation per marketplace; the normalizer looks adapters up by
/// `Platform` instead of branching on platform names.
pub trait PlatformAdapter: Send + Sync {
    /// Get the platform this adapter handles
    fn platform(&self) -> Platform;

    /// Raw field names holding the marketplace id, in priority order
    fn id_fields(&self) -> &'static [&'static str];

    /// First non-empty id field
    fn extract_platform_id(&self, raw: &RawProduct) -> Option<String> {
        self.id_fields().iter().find_map(|field| raw.get_str(field))
    }

    /// Fields kept under `platform_specific`
    fn extract_specific_fields(&self, raw: &RawProduct) -> Map<String, Value>;

    /// Stock flag when the availability text is inconclusive
    fn stock_override(&self, _raw: &RawProduct) -> Option<bool> {
        None
    }
}

/// Copy `key` from the raw record, falling back to `default`
pub(crate) fn copy_field(raw: &RawProduct, out: &mut Map<String, Value>, key: &str, default: Value) {
    let value = raw.get(key).cloned().unwrap_or(default);
    out.insert(key.to_string(), value);
}
