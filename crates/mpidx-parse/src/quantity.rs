//! Quantity extraction from free-text product descriptions.
//!
//! Descriptions are written by independent sellers with no schema
//! (`"5 1g nasha"`, `"1 jar 3.5g blue cookies"`, `"half oz zkittlez"`). The
//! parser runs a fixed cascade of rules; the first rule that produces a
//! quantity wins. Order encodes domain precedence, not position in the text.

use std::sync::LazyLock;

use mpidx_core::{ParsedQuantity, Unit};
use regex::Regex;

use crate::tokens::{
    detect_implicit_unit, edible_default_unit, is_edible, normalize_description, tokenize,
    DoseUnit, Token, TokenKind,
};

/// Grams per ounce used for every ounce-based phrase.
pub const GRAMS_PER_OUNCE: f64 = 28.0;

/// The rule that produced a [`ParsedQuantity`], in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityRule {
    /// `3 oz`, `1z`, `eighth`, `quarter`, `half oz`, `zip`, `1/8`.
    OunceWeight,
    /// `5 1g`, `5 x 1g`.
    MultiPackGrams,
    /// `1 jar 3.5g`: the container count is ignored.
    ContainerGrams,
    /// Description starts with `3.5 grams`, `500mg`, `10ml`, `2 kg`.
    LeadingDosage,
    /// Resolution over every numeric token in the description.
    Tokenized,
}

impl QuantityRule {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OunceWeight => "ounce_weight",
            Self::MultiPackGrams => "multi_pack_grams",
            Self::ContainerGrams => "container_grams",
            Self::LeadingDosage => "leading_dosage",
            Self::Tokenized => "tokenized",
        }
    }
}

impl std::fmt::Display for QuantityRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A description prepared once and shared by every rule.
struct Description {
    lower: String,
    tokens: Vec<Token>,
    edible: bool,
}

type RuleFn = fn(&Description) -> Option<ParsedQuantity>;

const RULES: &[(QuantityRule, RuleFn)] = &[
    (QuantityRule::OunceWeight, ounce_weight),
    (QuantityRule::MultiPackGrams, multi_pack_grams),
    (QuantityRule::ContainerGrams, container_grams),
    (QuantityRule::LeadingDosage, leading_dosage),
    (QuantityRule::Tokenized, resolve_tokens),
];

/// How an ounce phrase converts to grams.
#[derive(Clone, Copy)]
enum OunceMeasure {
    /// Phrase is a fixed weight (`1/8` is always 3.5 g).
    Fixed(f64),
    /// Optional leading count (capture group 1, default 1) times grams.
    PerUnit(f64),
}

/// Checked in order. Fractions come before `<n> oz` so `1/2 oz` is not
/// read as `2 oz`.
static OUNCE_PATTERNS: LazyLock<Vec<(Regex, OunceMeasure)>> = LazyLock::new(|| {
    [
        (r"\b1/8(?:th)?\b", OunceMeasure::Fixed(3.5)),
        (r"\b1/4(?:\s*(?:oz|ounces?))?\b", OunceMeasure::Fixed(7.0)),
        (r"\b1/2\s*(?:oz|ounces?|o|zips?)\b", OunceMeasure::Fixed(14.0)),
        (
            r"\bhalf(?:\s+an?)?[\s-]*(?:oz|ounces?|o|zips?)\b",
            OunceMeasure::Fixed(14.0),
        ),
        (
            r"\b(\d+(?:\.\d+)?)\s*(?:ounces?|oz|onz|z)\b",
            OunceMeasure::PerUnit(GRAMS_PER_OUNCE),
        ),
        (
            r"(?:\b(\d+(?:\.\d+)?)\s*)?\beighths?\b",
            OunceMeasure::PerUnit(3.5),
        ),
        (
            r"(?:\b(\d+(?:\.\d+)?)\s*)?\bquarters?\b",
            OunceMeasure::PerUnit(7.0),
        ),
        (
            r"(?:\b(\d+(?:\.\d+)?)\s*)?\bzips?\b",
            OunceMeasure::PerUnit(GRAMS_PER_OUNCE),
        ),
    ]
    .into_iter()
    .map(|(pattern, measure)| (Regex::new(pattern).expect("valid ounce regex"), measure))
    .collect()
});

/// Parses a product description into a normalized quantity.
///
/// Accepts `&str` or `Option<&str>`; `None`, blank and unparseable input
/// all yield `None`. Never panics.
///
/// ```
/// use mpidx_core::Unit;
/// use mpidx_parse::parse_quantity;
///
/// let q = parse_quantity("3 oz gorilla cookies").unwrap();
/// assert_eq!((q.qty, q.unit), (84.0, Unit::G));
/// assert!(parse_quantity(None).is_none());
/// ```
#[must_use]
pub fn parse_quantity<'a>(description: impl Into<Option<&'a str>>) -> Option<ParsedQuantity> {
    parse_quantity_with_rule(description).map(|(_, parsed)| parsed)
}

/// Like [`parse_quantity`], also reporting which rule matched.
#[must_use]
pub fn parse_quantity_with_rule<'a>(
    description: impl Into<Option<&'a str>>,
) -> Option<(QuantityRule, ParsedQuantity)> {
    let raw = description.into()?;
    let lower = normalize_description(raw);
    if lower.is_empty() {
        return None;
    }

    let prepared = Description {
        tokens: tokenize(&lower),
        edible: is_edible(&lower),
        lower,
    };

    let result = RULES
        .iter()
        .find_map(|&(rule, apply)| apply(&prepared).map(|parsed| (rule, parsed)));

    match result {
        Some((rule, parsed)) => {
            tracing::trace!(
                description = raw,
                rule = ?rule,
                qty = parsed.qty,
                unit = %parsed.unit,
                "quantity parsed"
            );
        }
        None => tracing::trace!(description = raw, "no quantity found"),
    }
    result
}

// ---------------------------------------------------------------------------
// Cascade rules
// ---------------------------------------------------------------------------

fn ounce_weight(desc: &Description) -> Option<ParsedQuantity> {
    OUNCE_PATTERNS.iter().find_map(|(re, measure)| {
        let caps = re.captures(&desc.lower)?;
        let grams = match *measure {
            OunceMeasure::Fixed(grams) => grams,
            OunceMeasure::PerUnit(grams) => {
                let count = caps
                    .get(1)
                    .map_or(Some(1.0), |m| m.as_str().parse::<f64>().ok())?;
                count * grams
            }
        };
        ParsedQuantity::new(grams, Unit::G)
    })
}

fn multi_pack_grams(desc: &Description) -> Option<ParsedQuantity> {
    desc.tokens.windows(2).find_map(|pair| {
        let (count, weight) = (&pair[0], &pair[1]);
        let is_count = match count.kind {
            TokenKind::Unlabeled => !count.container,
            TokenKind::Times => true,
            _ => false,
        };
        if !is_count
            || !count.integral
            || weight.kind != TokenKind::Dosage(DoseUnit::G)
            || !only_spaces_between(&desc.lower, count, weight)
        {
            return None;
        }
        ParsedQuantity::new(count.value * weight.value, Unit::G)
    })
}

fn container_grams(desc: &Description) -> Option<ParsedQuantity> {
    desc.tokens.windows(2).find_map(|pair| {
        let (container, weight) = (&pair[0], &pair[1]);
        if !container.container
            || weight.kind != TokenKind::Dosage(DoseUnit::G)
            || !only_spaces_between(&desc.lower, container, weight)
        {
            return None;
        }
        ParsedQuantity::new(weight.value, Unit::G)
    })
}

fn leading_dosage(desc: &Description) -> Option<ParsedQuantity> {
    let first = desc.tokens.first().filter(|t| t.start == 0)?;
    let TokenKind::Dosage(dose) = first.kind else {
        return None;
    };
    // mg on an edible is potency per piece, not sellable quantity.
    if dose == DoseUnit::Mg && desc.edible {
        return None;
    }
    let (qty, unit) = dose.canonical(first.value);
    ParsedQuantity::new(qty, unit)
}

/// Resolution over the token list, in fixed priority order.
fn resolve_tokens(desc: &Description) -> Option<ParsedQuantity> {
    let tokens = &desc.tokens;
    let first_gram = tokens
        .iter()
        .position(|t| t.kind == TokenKind::Dosage(DoseUnit::G));
    let times = tokens.iter().find(|t| t.kind == TokenKind::Times);

    // (a) unlabeled count ahead of a gram weight multiplies it.
    if let Some(gi) = first_gram {
        let grams = tokens[gi].value;
        if let Some(count) = tokens[..gi]
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Unlabeled && !t.container)
        {
            return ParsedQuantity::new(count.value * grams, Unit::G);
        }
        // (b) bare gram weight.
        if times.is_none() {
            return ParsedQuantity::new(grams, Unit::G);
        }
    }

    // (c) explicit multiplier with any dosage.
    if let Some(times) = times {
        if let Some((dose, value)) = tokens.iter().find_map(|t| match t.kind {
            TokenKind::Dosage(dose) => Some((dose, t.value)),
            _ => None,
        }) {
            let (qty, unit) = dose.canonical(value);
            return ParsedQuantity::new(times.value * qty, unit);
        }
    }

    // (d) first labeled packaging count.
    if let Some((unit, value)) = tokens.iter().find_map(|t| match t.kind {
        TokenKind::Count(unit) => Some((unit, t.value)),
        _ => None,
    }) {
        return ParsedQuantity::new(value, unit);
    }

    // (e) remaining dosages: ml, mg, kg.
    if let Some((dose, value)) = tokens.iter().find_map(|t| match t.kind {
        TokenKind::Dosage(dose) if dose != DoseUnit::G => Some((dose, t.value)),
        _ => None,
    }) {
        if dose == DoseUnit::Mg && desc.edible {
            return ParsedQuantity::new(1.0, implied_unit(desc));
        }
        let (qty, unit) = dose.canonical(value);
        return ParsedQuantity::new(qty, unit);
    }

    // (f) bare counts (and a lone multiplier) count items.
    if let Some(count) = tokens
        .iter()
        .find(|t| matches!(t.kind, TokenKind::Unlabeled | TokenKind::Times))
    {
        let unit = detect_implicit_unit(&desc.lower).unwrap_or(Unit::Item);
        return ParsedQuantity::new(count.value, unit);
    }

    // (g) no usable number: one unit if the text names a product form.
    if let Some(unit) = detect_implicit_unit(&desc.lower) {
        return ParsedQuantity::new(1.0, unit);
    }
    if desc.edible {
        return ParsedQuantity::new(1.0, edible_default_unit(&desc.lower));
    }
    None
}

fn implied_unit(desc: &Description) -> Unit {
    detect_implicit_unit(&desc.lower).unwrap_or_else(|| edible_default_unit(&desc.lower))
}

/// `true` when only spaces (at least one, unless the first token is an
/// `x` multiplier) separate two tokens.
fn only_spaces_between(lower: &str, left: &Token, right: &Token) -> bool {
    if left.end > right.start {
        return false;
    }
    let gap = &lower[left.end..right.start];
    let spaced = gap.bytes().all(|b| b == b' ');
    spaced && (!gap.is_empty() || left.kind == TokenKind::Times)
}

#[cfg(test)]
#[path = "quantity_test.rs"]
mod tests;
