//! Seller analytics aggregation for the marketplace index.
//!
//! Each crawl cycle hands over a batch of freshly scraped reviews per seller.
//! Batch statistics are computed against a dedup cursor (the newest review
//! already folded in), merged into the seller's cumulative record, and the
//! whole aggregate document is re-sorted and rewritten through an
//! [`AnalyticsStore`].

pub mod aggregate;
pub mod error;
pub mod merge;
pub mod stats;
pub mod store;
pub mod timestamp;

pub use aggregate::{
    load_existing_analytics, run_analytics_cycle, update_analytics_aggregate, CycleSummary,
};
pub use error::StoreError;
pub use merge::{compute_seller_analytics, merge_analytics};
pub use stats::{
    calculate_tenure_months, compute_recent_30_days, compute_review_stats, DAYS_PER_MONTH,
    RECENT_WINDOW_DAYS,
};
pub use store::{AnalyticsStore, FsStore, MemoryStore};
pub use timestamp::parse_review_timestamp;
