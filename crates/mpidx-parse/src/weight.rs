//! Catalog weight bucketing and gram-priced categories.

/// Standard retail weights in grams, each with the tolerance within which a
/// parsed weight snaps to it.
pub const WEIGHT_BREAKPOINTS: &[(f64, f64)] = &[
    (1.0, 0.2),
    (3.5, 0.5),
    (7.0, 1.0),
    (14.0, 2.0),
    (28.0, 3.0),
    (50.0, 5.0),
    (100.0, 10.0),
];

/// Categories whose listings are priced by weight.
const GRAM_BASED_CATEGORIES: &[&str] = &["flower", "hash", "concentrates"];

/// Snaps a gram weight to the nearest standard breakpoint.
///
/// Returns `None` when no breakpoint lies within its tolerance, or when
/// `grams` is not a positive finite number.
#[must_use]
pub fn match_weight_breakpoint(grams: f64) -> Option<f64> {
    if !grams.is_finite() || grams <= 0.0 {
        return None;
    }
    WEIGHT_BREAKPOINTS
        .iter()
        .filter(|(point, tolerance)| (grams - point).abs() <= *tolerance)
        .min_by(|(a, _), (b, _)| (grams - a).abs().total_cmp(&(grams - b).abs()))
        .map(|&(point, _)| point)
}

/// `true` for `Flower`, `Hash` and `Concentrates`, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn is_gram_based_category(category: &str) -> bool {
    let trimmed = category.trim();
    GRAM_BASED_CATEGORIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_breakpoints_match_themselves() {
        for &(point, _) in WEIGHT_BREAKPOINTS {
            assert_eq!(match_weight_breakpoint(point), Some(point));
        }
    }

    #[test]
    fn near_weight_snaps_within_tolerance() {
        assert_eq!(match_weight_breakpoint(3.6), Some(3.5));
        assert_eq!(match_weight_breakpoint(27.5), Some(28.0));
        assert_eq!(match_weight_breakpoint(0.9), Some(1.0));
        assert_eq!(match_weight_breakpoint(105.0), Some(100.0));
    }

    #[test]
    fn weight_outside_every_tolerance_is_none() {
        assert!(match_weight_breakpoint(5.0).is_none());
        assert!(match_weight_breakpoint(20.0).is_none());
        assert!(match_weight_breakpoint(250.0).is_none());
    }

    #[test]
    fn invalid_weights_are_none() {
        assert!(match_weight_breakpoint(0.0).is_none());
        assert!(match_weight_breakpoint(-3.5).is_none());
        assert!(match_weight_breakpoint(f64::NAN).is_none());
    }

    #[test]
    fn gram_based_categories() {
        assert!(is_gram_based_category("Flower"));
        assert!(is_gram_based_category(" hash "));
        assert!(is_gram_based_category("CONCENTRATES"));
        assert!(!is_gram_based_category("Edibles"));
        assert!(!is_gram_based_category(""));
    }
}
