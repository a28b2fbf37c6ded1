//! Configuration Module

pub mod credential;
pub mod loader;
pub mod types;
pub mod validation;

pub use credential::ApiKey;
pub use loader::load_config;
pub use types::{BrokerConfig, Config, FeedServiceConfig, RouteConfig};
pub use validation::validate_config;
