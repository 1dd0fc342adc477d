//! Shared data model and configuration for the marketplace index.
//!
//! Parsing lives in `mpidx-parse` and aggregation in `mpidx-analytics`; both
//! depend on the types defined here so the persisted shapes have one owner.

pub mod analytics;
pub mod app_config;
pub mod config;
pub mod quantity;

mod lenient;

use thiserror::Error;

pub use analytics::{
    DateValue, LifetimeStats, RawReview, Recent30Days, ReviewStats, SellerAnalyticsAggregate,
    SellerAnalyticsRecord, SellerBatch, SellerMeta, DATA_VERSION,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use quantity::{ParsedQuantity, Unit};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
