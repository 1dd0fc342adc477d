//! Quantity and unit extraction from marketplace product descriptions.
//!
//! [`parse_quantity`] turns strings like `"5 1g nasha"` or
//! `"1 jar 3.5g blue cookies"` into a [`mpidx_core::ParsedQuantity`]. The
//! weight and pricing helpers build on it for catalog displays.

pub mod pricing;
pub mod quantity;
pub mod weight;

mod tokens;

pub use pricing::{bucket_by_weight, price_per_gram, price_per_unit};
pub use quantity::{parse_quantity, parse_quantity_with_rule, QuantityRule, GRAMS_PER_OUNCE};
pub use tokens::{detect_implicit_unit, normalize_count_label};
pub use weight::{is_gram_based_category, match_weight_breakpoint, WEIGHT_BREAKPOINTS};
