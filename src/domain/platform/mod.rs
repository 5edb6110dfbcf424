//! Platform domain - per-marketplace adapters

mod amazon;
mod ebay;
mod etsy;
mod shopify;
mod traits;
mod walmart;

pub use amazon::AmazonAdapter;
pub use ebay::EbayAdapter;
pub use etsy::EtsyAdapter;
pub use shopify::ShopifyAdapter;
pub use traits::PlatformAdapter;
pub use walmart::WalmartAdapter;

use crate::shared::types::Platform;
use std::collections::HashMap;

/// Lookup of adapters keyed by platform
pub struct PlatformRegistry {
    adapters: HashMap<Platform, Box<dyn PlatformAdapter>>,
}

impl PlatformRegistry {
    /// Registry with an adapter for every known platform
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for platform in Platform::known() {
            if let Some(adapter) = Self::create_adapter(&platform) {
                registry.register(adapter);
            }
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Create the adapter for the specified platform
    pub fn create_adapter(platform: &Platform) -> Option<Box<dyn PlatformAdapter>> {
        match platform {
            Platform::Amazon => Some(Box::new(AmazonAdapter)),
            Platform::Ebay => Some(Box::new(EbayAdapter)),
            Platform::Walmart => Some(Box::new(WalmartAdapter)),
            Platform::Etsy => Some(Box::new(EtsyAdapter)),
            Platform::Shopify => Some(Box::new(ShopifyAdapter)),
            Platform::Other(_) => None,
        }
    }

    /// Add or replace the adapter for its platform
    pub fn register(&mut self, adapter: Box<dyn PlatformAdapter>) {
        self.adapters.insert(adapter.platform(), adapter);
    }

    pub fn get(&self, platform: &Platform) -> Option<&dyn PlatformAdapter> {
        self.adapters.get(platform).map(|a| &**a)
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
