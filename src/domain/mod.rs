//! Domain layer - core business logic and entities

pub mod alert;
pub mod platform;
pub mod price;
pub mod product;
pub mod trend;
