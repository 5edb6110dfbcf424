//! Application layer - use cases and services

pub mod services;
pub mod sink;

pub use services::{BatchOutcome, ServiceStats, TrackingService};
pub use sink::{DataSink, JsonLinesSink, MemorySink};
