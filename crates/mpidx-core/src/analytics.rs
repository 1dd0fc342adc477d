//! Seller review analytics: raw scraped reviews, per-batch statistics and
//! the persisted cumulative aggregate.
//!
//! All persisted shapes serialize with camelCase field names so the JSON
//! document stays readable by the existing web front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;

/// Schema version stamped on every [`SellerAnalyticsAggregate`] write.
pub const DATA_VERSION: u32 = 1;

/// A date as it appears in a scraped review: either a number (epoch
/// seconds or milliseconds depending on the field) or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Number(f64),
    Text(String),
}

/// One review as scraped from a seller page. Every field is optional and
/// malformed values deserialize as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    /// Rating on a 0–10 scale.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub days_to_arrive: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::date_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub review_date: Option<DateValue>,
    #[serde(
        default,
        deserialize_with = "lenient::date_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateValue>,
    /// Numeric values are Unix seconds.
    #[serde(
        default,
        deserialize_with = "lenient::date_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateValue>,
}

/// Statistics for one crawl batch, before merging into a seller record.
///
/// `review_count` includes every counted review, rated or not.
/// `sum_ratings` and `sum_days_to_arrive` are raw sums; callers divide by
/// `reviews_with_rating` and `reviews_with_shipping_data` respectively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub review_count: u64,
    pub positive_count: u64,
    pub negative_count: u64,
    pub perfect_score_count: u64,
    pub sum_ratings: f64,
    pub reviews_with_rating: u64,
    pub sum_days_to_arrive: f64,
    pub reviews_with_shipping_data: u64,
    pub oldest_review_date: Option<DateTime<Utc>>,
    pub newest_review_date: Option<DateTime<Utc>>,
}

/// Rolling window over the reviews dated within the last 30 days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recent30Days {
    pub review_count: u64,
    pub positive_count: u64,
    pub negative_count: u64,
    pub avg_rating: Option<f64>,
    pub avg_days_to_arrive: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifetimeStats {
    pub total_reviews: u64,
    pub positive_count: u64,
    pub negative_count: u64,
    pub perfect_score_count: u64,
    pub avg_rating: Option<f64>,
    pub oldest_review_seen: Option<DateTime<Utc>>,
    pub newest_review_seen: Option<DateTime<Utc>>,
    pub tenure_months: u32,
    pub avg_days_to_arrive: Option<f64>,
    pub reviews_with_shipping_data: u64,
    /// Denominator of `avg_rating`. Absent (zero) in documents written
    /// before it was tracked, where `total_reviews` stands in.
    pub reviews_with_rating: u64,
}

/// Seller metadata supplied by the crawler alongside a review batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerMeta {
    pub seller_name: Option<String>,
    pub seller_url: Option<String>,
    pub image_url: Option<String>,
    pub recent_30_days: Option<Recent30Days>,
}

/// Durable, cumulative analytics for one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerAnalyticsRecord {
    pub seller_id: String,
    #[serde(default)]
    pub seller_name: String,
    #[serde(default)]
    pub seller_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
    /// `None` only for records written before any review was ever merged.
    #[serde(default)]
    pub lifetime: Option<LifetimeStats>,
    #[serde(default)]
    pub recent_30_days: Recent30Days,
}

impl SellerAnalyticsRecord {
    /// Lifetime review count, `0` when no lifetime block exists.
    #[must_use]
    pub fn total_reviews(&self) -> u64 {
        self.lifetime.as_ref().map_or(0, |l| l.total_reviews)
    }
}

/// The single persisted document holding every indexed seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerAnalyticsAggregate {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_sellers: usize,
    #[serde(default = "default_data_version")]
    pub data_version: u32,
    #[serde(default)]
    pub sellers: Vec<SellerAnalyticsRecord>,
}

impl SellerAnalyticsAggregate {
    /// An aggregate with no sellers, used on first run.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            generated_at: None,
            total_sellers: 0,
            data_version: DATA_VERSION,
            sellers: Vec::new(),
        }
    }

    /// Looks up a seller by id.
    #[must_use]
    pub fn seller(&self, seller_id: &str) -> Option<&SellerAnalyticsRecord> {
        self.sellers.iter().find(|s| s.seller_id == seller_id)
    }
}

impl Default for SellerAnalyticsAggregate {
    fn default() -> Self {
        Self::empty()
    }
}

fn default_data_version() -> u32 {
    DATA_VERSION
}

/// One seller's worth of crawl output, as handed to the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerBatch {
    #[serde(default)]
    pub seller_id: String,
    /// Non-array payloads and non-object entries are dropped.
    #[serde(default, deserialize_with = "lenient::reviews")]
    pub reviews: Vec<RawReview>,
    #[serde(default)]
    pub seller_meta: SellerMeta,
}
