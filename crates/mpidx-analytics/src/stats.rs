//! Per-batch review statistics.
//!
//! Rating thresholds are a fixed business rule shared by every window:
//! `<= 5` is negative, `>= 9` is positive, `6..=8` is neutral (counted in
//! the average but in neither bucket) and exactly `10` is also a perfect
//! score.

use chrono::{DateTime, Duration, Utc};
use mpidx_core::{RawReview, Recent30Days, ReviewStats};

use crate::timestamp::parse_review_timestamp;

/// Days in the rolling recent-activity window.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Average month length used for tenure.
pub const DAYS_PER_MONTH: f64 = 30.44;

const MS_PER_MONTH: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * DAYS_PER_MONTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RatingClass {
    Negative,
    Neutral,
    Positive,
}

pub(crate) fn classify_rating(rating: f64) -> RatingClass {
    if rating <= 5.0 {
        RatingClass::Negative
    } else if rating >= 9.0 {
        RatingClass::Positive
    } else {
        RatingClass::Neutral
    }
}

/// A rating is usable when finite and on the 0–10 scale.
fn usable_rating(review: &RawReview) -> Option<f64> {
    review
        .rating
        .filter(|r| r.is_finite() && (0.0..=10.0).contains(r))
}

fn usable_days_to_arrive(review: &RawReview) -> Option<f64> {
    review.days_to_arrive.filter(|d| d.is_finite() && *d >= 0.0)
}

/// Running totals shared by the batch and 30-day computations.
#[derive(Debug, Default)]
struct Tally {
    review_count: u64,
    positive_count: u64,
    negative_count: u64,
    perfect_score_count: u64,
    sum_ratings: f64,
    reviews_with_rating: u64,
    sum_days_to_arrive: f64,
    reviews_with_shipping_data: u64,
}

impl Tally {
    fn add(&mut self, review: &RawReview) {
        self.review_count += 1;
        if let Some(rating) = usable_rating(review) {
            self.sum_ratings += rating;
            self.reviews_with_rating += 1;
            match classify_rating(rating) {
                RatingClass::Negative => self.negative_count += 1,
                RatingClass::Positive => self.positive_count += 1,
                RatingClass::Neutral => {}
            }
            if rating == 10.0 {
                self.perfect_score_count += 1;
            }
        }
        if let Some(days) = usable_days_to_arrive(review) {
            self.sum_days_to_arrive += days;
            self.reviews_with_shipping_data += 1;
        }
    }
}

/// Computes statistics for reviews newer than `newest_seen_before`.
///
/// The oldest/newest dates span the whole batch, while the counts only
/// include reviews dated strictly after the cursor so reviews folded into a
/// previous run are not counted twice. Undated reviews are always counted.
/// Reviews without a usable rating are counted but stay out of the rating
/// sum and buckets.
#[must_use]
pub fn compute_review_stats(
    reviews: &[RawReview],
    newest_seen_before: Option<DateTime<Utc>>,
) -> ReviewStats {
    let mut tally = Tally::default();
    let mut oldest: Option<DateTime<Utc>> = None;
    let mut newest: Option<DateTime<Utc>> = None;

    for review in reviews {
        let timestamp = parse_review_timestamp(review);

        if let Some(ts) = timestamp {
            oldest = Some(oldest.map_or(ts, |o| o.min(ts)));
            newest = Some(newest.map_or(ts, |n| n.max(ts)));
        }

        let already_counted = matches!(
            (timestamp, newest_seen_before),
            (Some(ts), Some(cursor)) if ts <= cursor
        );
        if !already_counted {
            tally.add(review);
        }
    }

    ReviewStats {
        review_count: tally.review_count,
        positive_count: tally.positive_count,
        negative_count: tally.negative_count,
        perfect_score_count: tally.perfect_score_count,
        sum_ratings: tally.sum_ratings,
        reviews_with_rating: tally.reviews_with_rating,
        sum_days_to_arrive: tally.sum_days_to_arrive,
        reviews_with_shipping_data: tally.reviews_with_shipping_data,
        oldest_review_date: oldest,
        newest_review_date: newest,
    }
}

/// Statistics over reviews dated within the last 30 days of `now`
/// (inclusive lower bound). Undated reviews are excluded.
#[must_use]
pub fn compute_recent_30_days(reviews: &[RawReview], now: DateTime<Utc>) -> Recent30Days {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut tally = Tally::default();

    for review in reviews {
        if parse_review_timestamp(review).is_some_and(|ts| ts >= cutoff) {
            tally.add(review);
        }
    }

    Recent30Days {
        review_count: tally.review_count,
        positive_count: tally.positive_count,
        negative_count: tally.negative_count,
        avg_rating: average(tally.sum_ratings, tally.reviews_with_rating).map(round1),
        avg_days_to_arrive: average(tally.sum_days_to_arrive, tally.reviews_with_shipping_data)
            .map(round1),
    }
}

/// Whole months between `oldest_review_date` and `now`, using
/// [`DAYS_PER_MONTH`]. `0` when the date is missing or in the future.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn calculate_tenure_months(
    oldest_review_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u32 {
    let Some(oldest) = oldest_review_date else {
        return 0;
    };
    let elapsed_ms = (now - oldest).num_milliseconds() as f64;
    let months = (elapsed_ms / MS_PER_MONTH).round();
    if months <= 0.0 {
        return 0;
    }
    months.min(f64::from(u32::MAX)) as u32
}

/// `sum / count`, or `None` when `count` is zero.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn average(sum: f64, count: u64) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

/// Rounds to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
