//! Price normalization built on [`crate::parse_quantity`].

use mpidx_core::{ParsedQuantity, Unit};

use crate::quantity::parse_quantity;
use crate::weight::{is_gram_based_category, match_weight_breakpoint, WEIGHT_BREAKPOINTS};

/// Price of one unit of `quantity` (per gram, per ml, per item...).
///
/// `None` for a negative or non-finite price.
#[must_use]
pub fn price_per_unit(price: f64, quantity: &ParsedQuantity) -> Option<f64> {
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    Some(price / quantity.qty)
}

/// Price per gram for a listing, when the category is sold by weight and
/// the description parses to grams.
#[must_use]
pub fn price_per_gram(price: f64, category: &str, description: &str) -> Option<f64> {
    if !is_gram_based_category(category) {
        return None;
    }
    let quantity = parse_quantity(description).filter(|q| q.unit == Unit::G)?;
    price_per_unit(price, &quantity)
}

/// Groups items by the weight breakpoint their quantity snaps to.
///
/// Buckets come back in ascending breakpoint order and only non-empty
/// buckets are returned. Items that are not gram quantities, or that fall
/// outside every tolerance, are dropped.
pub fn bucket_by_weight<T, I>(items: I) -> Vec<(f64, Vec<T>)>
where
    I: IntoIterator<Item = (T, ParsedQuantity)>,
{
    let mut buckets: Vec<(f64, Vec<T>)> = WEIGHT_BREAKPOINTS
        .iter()
        .map(|&(point, _)| (point, Vec::new()))
        .collect();

    for (item, quantity) in items {
        let Some(point) = quantity.grams().and_then(match_weight_breakpoint) else {
            continue;
        };
        if let Some((_, bucket)) = buckets.iter_mut().find(|(p, _)| *p == point) {
            bucket.push(item);
        }
    }

    buckets.retain(|(_, bucket)| !bucket.is_empty());
    buckets
}
