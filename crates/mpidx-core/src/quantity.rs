use serde::{Deserialize, Serialize};

/// Canonical unit for a parsed quantity.
///
/// Weights are always expressed in grams (ounces and kilograms are converted
/// by the parser), volumes in millilitres and dosages in milligrams. Every
/// other variant is a dimensionless packaging count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Mg,
    Ml,
    Item,
    Pk,
    Pc,
    Tab,
    Cap,
    Gummy,
    Bottle,
    Jar,
    Bar,
    Chew,
    Square,
    Star,
    Joint,
    Cart,
    Pod,
    Pen,
}

impl Unit {
    /// Short lowercase label, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::G => "g",
            Unit::Mg => "mg",
            Unit::Ml => "ml",
            Unit::Item => "item",
            Unit::Pk => "pk",
            Unit::Pc => "pc",
            Unit::Tab => "tab",
            Unit::Cap => "cap",
            Unit::Gummy => "gummy",
            Unit::Bottle => "bottle",
            Unit::Jar => "jar",
            Unit::Bar => "bar",
            Unit::Chew => "chew",
            Unit::Square => "square",
            Unit::Star => "star",
            Unit::Joint => "joint",
            Unit::Cart => "cart",
            Unit::Pod => "pod",
            Unit::Pen => "pen",
        }
    }

    /// `true` for units measuring mass, volume or dose rather than a count.
    #[must_use]
    pub fn is_measure(self) -> bool {
        matches!(self, Unit::G | Unit::Mg | Unit::Ml)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantity extracted from a free-text product description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuantity {
    /// Always finite and strictly positive.
    pub qty: f64,
    pub unit: Unit,
}

impl ParsedQuantity {
    /// Builds a quantity, rejecting zero, negative and non-finite values.
    #[must_use]
    pub fn new(qty: f64, unit: Unit) -> Option<Self> {
        (qty.is_finite() && qty > 0.0).then_some(Self { qty, unit })
    }

    /// Returns the weight in grams when the unit is [`Unit::G`].
    #[must_use]
    pub fn grams(&self) -> Option<f64> {
        (self.unit == Unit::G).then_some(self.qty)
    }
}

impl std::fmt::Display for ParsedQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.qty, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_and_negative() {
        assert!(ParsedQuantity::new(0.0, Unit::G).is_none());
        assert!(ParsedQuantity::new(-1.0, Unit::Item).is_none());
    }

    #[test]
    fn new_rejects_non_finite() {
        assert!(ParsedQuantity::new(f64::NAN, Unit::G).is_none());
        assert!(ParsedQuantity::new(f64::INFINITY, Unit::G).is_none());
    }

    #[test]
    fn grams_only_for_gram_unit() {
        let g = ParsedQuantity::new(3.5, Unit::G).unwrap();
        let mg = ParsedQuantity::new(500.0, Unit::Mg).unwrap();
        assert_eq!(g.grams(), Some(3.5));
        assert!(mg.grams().is_none());
    }

    #[test]
    fn unit_serializes_as_short_label() {
        let json = serde_json::to_string(&ParsedQuantity::new(2.0, Unit::Joint).unwrap())
            .expect("serialization failed");
        assert_eq!(json, r#"{"qty":2.0,"unit":"joint"}"#);
    }

    #[test]
    fn display_matches_serialized_label() {
        for unit in [Unit::G, Unit::Pk, Unit::Gummy, Unit::Cart] {
            let json = serde_json::to_string(&unit).expect("serialization failed");
            assert_eq!(json.trim_matches('"'), unit.to_string());
        }
    }

    #[test]
    fn measure_units() {
        assert!(Unit::G.is_measure());
        assert!(Unit::Ml.is_measure());
        assert!(!Unit::Bar.is_measure());
    }
}
