//! Review date normalization.
//!
//! Scrapers emit review dates under three different keys and in several
//! shapes. [`parse_review_timestamp`] is the only place that knows about
//! them; everything downstream works with `DateTime<Utc>`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mpidx_core::{DateValue, RawReview};

/// Unit for a numeric date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Epoch {
    Seconds,
    Millis,
}

/// Resolves the review's timestamp from `reviewDate`, then `date`, then
/// `created`.
///
/// The first field that is present decides: an unparseable `reviewDate`
/// does not fall through to `date`. Numeric `created` values are Unix
/// seconds; numeric `reviewDate`/`date` values are Unix milliseconds.
/// Strings may be RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), `YYYY-MM-DD`
/// (UTC midnight) or a number in string form.
#[must_use]
pub fn parse_review_timestamp(review: &RawReview) -> Option<DateTime<Utc>> {
    if let Some(value) = &review.review_date {
        return parse_date_value(value, Epoch::Millis);
    }
    if let Some(value) = &review.date {
        return parse_date_value(value, Epoch::Millis);
    }
    review
        .created
        .as_ref()
        .and_then(|value| parse_date_value(value, Epoch::Seconds))
}

fn parse_date_value(value: &DateValue, epoch: Epoch) -> Option<DateTime<Utc>> {
    match value {
        DateValue::Number(n) => from_epoch(*n, epoch),
        DateValue::Text(s) => parse_date_text(s.trim(), epoch),
    }
}

fn parse_date_text(s: &str, epoch: Epoch) -> Option<DateTime<Utc>> {
    if let Ok(n) = s.parse::<f64>() {
        return from_epoch(n, epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[allow(clippy::cast_possible_truncation)]
fn from_epoch(n: f64, epoch: Epoch) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    let millis = match epoch {
        Epoch::Seconds => n * 1000.0,
        Epoch::Millis => n,
    };
    // Beyond chrono's representable range; also keeps the cast in bounds.
    if millis.abs() >= 9.0e15 {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}
