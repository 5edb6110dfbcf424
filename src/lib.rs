//! pricetrack - e-commerce price tracking and trend analytics
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod shared;

// Re-export main types for convenience
pub use application::{DataSink, TrackingService};
pub use domain::alert::{AlertEngine, AlertType};
pub use domain::platform::PlatformRegistry;
pub use domain::price::PriceHistoryStore;
pub use domain::product::{Normalizer, Product, RawProduct};
pub use domain::trend::TrendEngine;
pub use shared::config::TrackerConfig;
