//! Folding batch statistics into a seller's persisted record.

use chrono::{DateTime, Utc};
use mpidx_core::{LifetimeStats, ReviewStats, SellerAnalyticsRecord, SellerBatch, SellerMeta};

use crate::stats::{
    average, calculate_tenure_months, compute_recent_30_days, compute_review_stats,
};

/// Merges `new_stats` into `existing`, producing the seller's next record.
///
/// Without an existing lifetime block the record is seeded from
/// `new_stats` alone. Otherwise counts are added and averages are
/// recomputed from sums reconstructed as `stored average × stored
/// denominator`, so the persisted schema carries no raw sums. The rating
/// denominator is `reviews_with_rating`, which can trail `total_reviews`
/// when some reviews carried no usable rating. The review
/// date range only ever widens and `last_seen_at` is always set to `now`.
///
/// Seller metadata and the 30-day window prefer `meta`, then `existing`,
/// then an empty default.
#[must_use]
pub fn merge_analytics(
    seller_id: &str,
    existing: Option<&SellerAnalyticsRecord>,
    new_stats: &ReviewStats,
    meta: &SellerMeta,
    now: DateTime<Utc>,
) -> SellerAnalyticsRecord {
    let lifetime = match existing.and_then(|r| r.lifetime.as_ref()) {
        Some(previous) => merge_lifetime(previous, new_stats, now),
        None => seed_lifetime(new_stats, now),
    };

    SellerAnalyticsRecord {
        seller_id: seller_id.to_string(),
        seller_name: prefer_text(
            meta.seller_name.as_deref(),
            existing.map(|r| r.seller_name.as_str()),
        )
        .unwrap_or_default(),
        seller_url: prefer_text(
            meta.seller_url.as_deref(),
            existing.map(|r| r.seller_url.as_str()),
        )
        .unwrap_or_default(),
        image_url: prefer_text(
            meta.image_url.as_deref(),
            existing.and_then(|r| r.image_url.as_deref()),
        ),
        last_seen_at: Some(now),
        lifetime: Some(lifetime),
        recent_30_days: meta
            .recent_30_days
            .clone()
            .or_else(|| existing.map(|r| r.recent_30_days.clone()))
            .unwrap_or_default(),
    }
}

fn seed_lifetime(stats: &ReviewStats, now: DateTime<Utc>) -> LifetimeStats {
    LifetimeStats {
        total_reviews: stats.review_count,
        positive_count: stats.positive_count,
        negative_count: stats.negative_count,
        perfect_score_count: stats.perfect_score_count,
        avg_rating: average(stats.sum_ratings, stats.reviews_with_rating),
        oldest_review_seen: stats.oldest_review_date,
        newest_review_seen: stats.newest_review_date,
        tenure_months: calculate_tenure_months(stats.oldest_review_date, now),
        avg_days_to_arrive: average(stats.sum_days_to_arrive, stats.reviews_with_shipping_data),
        reviews_with_shipping_data: stats.reviews_with_shipping_data,
        reviews_with_rating: stats.reviews_with_rating,
    }
}

#[allow(clippy::cast_precision_loss)]
fn merge_lifetime(
    previous: &LifetimeStats,
    stats: &ReviewStats,
    now: DateTime<Utc>,
) -> LifetimeStats {
    let previous_rated = rated_denominator(previous);
    let previous_sum_ratings = previous.avg_rating.unwrap_or(0.0) * previous_rated as f64;
    let previous_sum_days = previous.avg_days_to_arrive.unwrap_or(0.0)
        * previous.reviews_with_shipping_data as f64;

    let total_reviews = previous.total_reviews.saturating_add(stats.review_count);
    let reviews_with_rating = previous_rated.saturating_add(stats.reviews_with_rating);
    let reviews_with_shipping_data = previous
        .reviews_with_shipping_data
        .saturating_add(stats.reviews_with_shipping_data);

    let oldest = earliest(previous.oldest_review_seen, stats.oldest_review_date);
    let newest = latest(previous.newest_review_seen, stats.newest_review_date);

    LifetimeStats {
        total_reviews,
        positive_count: previous.positive_count.saturating_add(stats.positive_count),
        negative_count: previous.negative_count.saturating_add(stats.negative_count),
        perfect_score_count: previous
            .perfect_score_count
            .saturating_add(stats.perfect_score_count),
        avg_rating: average(previous_sum_ratings + stats.sum_ratings, reviews_with_rating),
        oldest_review_seen: oldest,
        newest_review_seen: newest,
        tenure_months: calculate_tenure_months(oldest, now),
        avg_days_to_arrive: average(
            previous_sum_days + stats.sum_days_to_arrive,
            reviews_with_shipping_data,
        ),
        reviews_with_shipping_data,
        reviews_with_rating,
    }
}

/// Stored denominator of `avg_rating`, or `total_reviews` for records
/// written before rated reviews were tracked separately.
fn rated_denominator(lifetime: &LifetimeStats) -> u64 {
    if lifetime.reviews_with_rating == 0 && lifetime.avg_rating.is_some() {
        lifetime.total_reviews
    } else {
        lifetime.reviews_with_rating
    }
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn latest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// First non-blank candidate, owned.
fn prefer_text(fresh: Option<&str>, stored: Option<&str>) -> Option<String> {
    [fresh, stored]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Computes one seller's updated record from a freshly scraped batch.
///
/// The dedup cursor is the existing record's `newest_review_seen`; the
/// 30-day window is always recomputed from the batch itself.
#[must_use]
pub fn compute_seller_analytics(
    batch: &SellerBatch,
    existing: Option<&SellerAnalyticsRecord>,
    now: DateTime<Utc>,
) -> SellerAnalyticsRecord {
    let cursor = existing
        .and_then(|r| r.lifetime.as_ref())
        .and_then(|l| l.newest_review_seen);

    let new_stats = compute_review_stats(&batch.reviews, cursor);
    let recent = compute_recent_30_days(&batch.reviews, now);

    let meta = SellerMeta {
        recent_30_days: Some(recent),
        ..batch.seller_meta.clone()
    };

    tracing::debug!(
        seller_id = %batch.seller_id,
        batch_size = batch.reviews.len(),
        new_reviews = new_stats.review_count,
        cursor = ?cursor,
        "computed seller batch stats"
    );

    merge_analytics(&batch.seller_id, existing, &new_stats, &meta, now)
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
