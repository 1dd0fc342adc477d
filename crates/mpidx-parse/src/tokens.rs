//! Byte-scanning tokenizer and vocabulary tables for quantity extraction.
//!
//! All functions operate on text already passed through
//! [`normalize_description`]: lowercase, single-spaced, with `5x10mg`
//! split into `5 x 10mg`.

use std::sync::LazyLock;

use mpidx_core::Unit;
use regex::Regex;

/// Measurement unit attached directly to a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DoseUnit {
    Mg,
    G,
    Kg,
    Ml,
}

impl DoseUnit {
    /// Converts `value` into the canonical unit (`kg` becomes grams).
    pub(crate) fn canonical(self, value: f64) -> (f64, Unit) {
        match self {
            DoseUnit::Mg => (value, Unit::Mg),
            DoseUnit::G => (value, Unit::G),
            DoseUnit::Kg => (value * 1000.0, Unit::G),
            DoseUnit::Ml => (value, Unit::Ml),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `3.5g`, `500 mg`, `2kg`, `10ml`.
    Dosage(DoseUnit),
    /// `5 x`, an explicit multiplier.
    Times,
    /// A recognised packaging label such as `10 pack` or `2 joints`.
    Count(Unit),
    /// A bare number, or one followed by a word outside the vocabulary.
    Unlabeled,
}

/// One `(number)(optional label)` occurrence in a description.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub value: f64,
    pub kind: TokenKind,
    /// Label was a container word (`jar`, `bag`, `tub`, ...).
    pub container: bool,
    /// Number has no fractional part.
    pub integral: bool,
    /// Byte offset of the first digit.
    pub start: usize,
    /// Byte offset just past the number, or past the label when one was
    /// recognised.
    pub end: usize,
}

/// Packaging synonyms folded to their canonical unit.
const COUNT_LABELS: &[(&str, Unit)] = &[
    ("pack", Unit::Pk),
    ("packs", Unit::Pk),
    ("pk", Unit::Pk),
    ("pks", Unit::Pk),
    ("pkg", Unit::Pk),
    ("pc", Unit::Pc),
    ("pcs", Unit::Pc),
    ("piece", Unit::Pc),
    ("pieces", Unit::Pc),
    ("tab", Unit::Tab),
    ("tabs", Unit::Tab),
    ("tablet", Unit::Tab),
    ("tablets", Unit::Tab),
    ("cap", Unit::Cap),
    ("caps", Unit::Cap),
    ("capsule", Unit::Cap),
    ("capsules", Unit::Cap),
    ("gummy", Unit::Gummy),
    ("gummies", Unit::Gummy),
    ("bottle", Unit::Bottle),
    ("bottles", Unit::Bottle),
    ("jar", Unit::Jar),
    ("jars", Unit::Jar),
    ("bar", Unit::Bar),
    ("bars", Unit::Bar),
    ("chew", Unit::Chew),
    ("chews", Unit::Chew),
    ("square", Unit::Square),
    ("squares", Unit::Square),
    ("star", Unit::Star),
    ("stars", Unit::Star),
    ("joint", Unit::Joint),
    ("joints", Unit::Joint),
    ("pre-roll", Unit::Joint),
    ("pre-rolls", Unit::Joint),
    ("preroll", Unit::Joint),
    ("prerolls", Unit::Joint),
    ("roll", Unit::Joint),
    ("rolls", Unit::Joint),
    ("blunt", Unit::Joint),
    ("blunts", Unit::Joint),
    ("item", Unit::Item),
    ("items", Unit::Item),
    ("unit", Unit::Item),
    ("units", Unit::Item),
    ("ct", Unit::Item),
    ("count", Unit::Item),
    ("cart", Unit::Cart),
    ("carts", Unit::Cart),
    ("cartridge", Unit::Cart),
    ("cartridges", Unit::Cart),
    ("pod", Unit::Pod),
    ("pods", Unit::Pod),
    ("pen", Unit::Pen),
    ("pens", Unit::Pen),
];

const DOSE_LABELS: &[(&str, DoseUnit)] = &[
    ("mg", DoseUnit::Mg),
    ("mgs", DoseUnit::Mg),
    ("milligram", DoseUnit::Mg),
    ("milligrams", DoseUnit::Mg),
    ("g", DoseUnit::G),
    ("gs", DoseUnit::G),
    ("gr", DoseUnit::G),
    ("grs", DoseUnit::G),
    ("gm", DoseUnit::G),
    ("gms", DoseUnit::G),
    ("gram", DoseUnit::G),
    ("grams", DoseUnit::G),
    ("kg", DoseUnit::Kg),
    ("kgs", DoseUnit::Kg),
    ("kilo", DoseUnit::Kg),
    ("kilos", DoseUnit::Kg),
    ("kilogram", DoseUnit::Kg),
    ("kilograms", DoseUnit::Kg),
    ("ml", DoseUnit::Ml),
    ("mls", DoseUnit::Ml),
    ("milliliter", DoseUnit::Ml),
    ("milliliters", DoseUnit::Ml),
    ("millilitre", DoseUnit::Ml),
    ("millilitres", DoseUnit::Ml),
];

/// Packaging words whose count is irrelevant when followed by a gram weight.
const CONTAINER_WORDS: &[&str] = &[
    "jar", "jars", "pack", "packs", "bag", "bags", "pot", "pots", "tub", "tubs", "box", "boxes",
];

/// Labels that mark a number as something other than a quantity
/// (`3 pm`, `25% thc`, `2 days`).
const NOISE_LABELS: &[&str] = &[
    "%", "am", "pm", "thc", "cbd", "percent", "off", "hr", "hrs", "hour", "hours", "min", "mins",
    "minute", "minutes", "day", "days", "week", "weeks", "th", "st", "nd", "rd", "usd", "eur",
    "gbp", "dollars",
];

static MULTIPLIER_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*x\s*(\d)").expect("valid multiplier regex"));

static THOUSANDS_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d),(\d{3})\b").expect("valid thousands regex"));

static PRE_ROLL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpre[\s_]roll(s?)\b").expect("valid pre-roll regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static EDIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:chocolates?|choc|cocoa|cacao|gumm(?:y|ies)|brownies?|cookies?|cand(?:y|ies)|edibles?|cakes?|chews?|caramels?|lollipops?|lollies|mints?|truffles?|treats?|taffy)\b",
    )
    .expect("valid edible regex")
});

static CHOCOLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:chocolates?|choc|cocoa|cacao|bars?)\b").expect("valid chocolate regex")
});

/// Keyword scan used when a number carries no label of its own.
static IMPLICIT_UNITS: LazyLock<Vec<(Regex, Unit)>> = LazyLock::new(|| {
    [
        (r"\b(?:packs?|pks?|pkg)\b", Unit::Pk),
        (r"\bbottles?\b", Unit::Bottle),
        (r"\bjars?\b", Unit::Jar),
        (r"\bgumm(?:y|ies)\b", Unit::Gummy),
        (r"\btab(?:let)?s?\b", Unit::Tab),
        (r"\bcap(?:sule)?s?\b", Unit::Cap),
        (r"\b(?:joints?|pre-?rolls?|blunts?)\b", Unit::Joint),
        (r"\bbars?\b", Unit::Bar),
        (r"\bchews?\b", Unit::Chew),
        (r"\bsquares?\b", Unit::Square),
        (r"\bstars?\b", Unit::Star),
        (r"\bcart(?:ridge)?s?\b", Unit::Cart),
        (r"\bpods?\b", Unit::Pod),
        (r"\bpens?\b", Unit::Pen),
    ]
    .into_iter()
    .map(|(pattern, unit)| (Regex::new(pattern).expect("valid implicit unit regex"), unit))
    .collect()
});

/// Lowercases and canonicalises spacing so the scanners see one shape.
pub(crate) fn normalize_description(raw: &str) -> String {
    let lower = raw.to_lowercase().replace('×', "x");
    let joined = THOUSANDS_SEPARATOR.replace_all(&lower, "$1$2");
    let spaced = MULTIPLIER_GAP.replace_all(&joined, "$1 x $2");
    let rolled = PRE_ROLL.replace_all(&spaced, "pre-roll$1");
    WHITESPACE.replace_all(rolled.trim(), " ").into_owned()
}

/// Folds a packaging label (`"tablets"`, `"pre-rolls"`) to its canonical
/// unit. Case-insensitive; `None` when the label is outside the vocabulary.
#[must_use]
pub fn normalize_count_label(label: &str) -> Option<Unit> {
    let lower = label.trim().to_lowercase();
    COUNT_LABELS
        .iter()
        .find(|(synonym, _)| *synonym == lower)
        .map(|&(_, unit)| unit)
}

/// Infers a packaging unit from keywords anywhere in `text`.
///
/// Keywords are checked in a fixed order, so `"gummies in a jar"` yields
/// [`Unit::Jar`].
#[must_use]
pub fn detect_implicit_unit(text: &str) -> Option<Unit> {
    let lower = text.to_lowercase();
    IMPLICIT_UNITS
        .iter()
        .find(|(re, _)| re.is_match(&lower))
        .map(|&(_, unit)| unit)
}

/// `true` when the text reads like an edible (chocolate, gummies, ...).
pub(crate) fn is_edible(lower: &str) -> bool {
    EDIBLE.is_match(lower)
}

/// Unit assumed for an edible whose text names no packaging: chocolate-like
/// products come in bars, everything else counts as one item.
pub(crate) fn edible_default_unit(lower: &str) -> Unit {
    if CHOCOLATE.is_match(lower) {
        Unit::Bar
    } else {
        Unit::Item
    }
}

/// Scans `lower` for every `(number)(optional label)` pair, left to right.
///
/// Numbers glued to a preceding letter (`og18`), prices (`$30`) and numbers
/// followed by a noise label (`3 pm`) are skipped, as are zero values. A
/// range (`2-3 days`, `1-2g`) takes the upper bound's label and yields one
/// token for its lower bound.
pub(crate) fn tokenize(lower: &str) -> Vec<Token> {
    let bytes = lower.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < len {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let glued = i > 0
            && (bytes[i - 1].is_ascii_alphanumeric() || matches!(bytes[i - 1], b'.' | b'$' | b'_'));

        let num_start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let mut integral = true;
        if i + 1 < len && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            integral = false;
            i += 1;
            while i < len && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        let num_end = i;

        if glued {
            continue;
        }

        let (label, label_end) = match range_label(lower, num_end) {
            Some((label, end)) => (Some(label), end),
            None => read_label(lower, num_end),
        };
        let Ok(value) = lower[num_start..num_end].parse::<f64>() else {
            continue;
        };

        if label.is_some_and(|l| NOISE_LABELS.contains(&l)) {
            i = label_end;
            continue;
        }
        if value <= 0.0 {
            continue;
        }

        let (kind, container, end) = match label {
            Some(l) => classify_label(l).map_or((TokenKind::Unlabeled, false, num_end), |(k, c)| {
                (k, c, label_end)
            }),
            None => (TokenKind::Unlabeled, false, num_end),
        };

        tokens.push(Token {
            value,
            kind,
            container,
            integral,
            start: num_start,
            end,
        });
        i = end;
    }

    tokens
}

/// Label of a range's upper bound when `from` sits on `-<number><label>`.
fn range_label(lower: &str, from: usize) -> Option<(&str, usize)> {
    let bytes = lower.as_bytes();
    let len = bytes.len();
    if from + 1 >= len || bytes[from] != b'-' || !bytes[from + 1].is_ascii_digit() {
        return None;
    }
    let mut i = from + 1;
    while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    match read_label(lower, i) {
        (Some(label), end) => Some((label, end)),
        (None, _) => None,
    }
}

/// Reads the label following a number: optional spaces then either `%` or
/// a run of ASCII letters and hyphens.
fn read_label(lower: &str, from: usize) -> (Option<&str>, usize) {
    let bytes = lower.as_bytes();
    let len = bytes.len();
    let mut i = from;
    while i < len && bytes[i] == b' ' {
        i += 1;
    }
    if i < len && bytes[i] == b'%' {
        return (Some("%"), i + 1);
    }
    let start = i;
    while i < len && (bytes[i].is_ascii_lowercase() || bytes[i] == b'-') {
        i += 1;
    }
    let label = lower[start..i].trim_end_matches('-');
    if label.is_empty() || !label.as_bytes()[0].is_ascii_lowercase() {
        return (None, from);
    }
    (Some(label), start + label.len())
}

fn classify_label(label: &str) -> Option<(TokenKind, bool)> {
    let container = CONTAINER_WORDS.contains(&label);
    if label == "x" {
        return Some((TokenKind::Times, false));
    }
    if let Some(&(_, dose)) = DOSE_LABELS.iter().find(|(l, _)| *l == label) {
        return Some((TokenKind::Dosage(dose), false));
    }
    if let Some(unit) = normalize_count_label(label) {
        return Some((TokenKind::Count(unit), container));
    }
    container.then_some((TokenKind::Unlabeled, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(f64, TokenKind)> {
        tokenize(&normalize_description(text))
            .into_iter()
            .map(|t| (t.value, t.kind))
            .collect()
    }

    #[test]
    fn normalize_splits_glued_multiplier() {
        assert_eq!(normalize_description("5X10mg  Gummies"), "5 x 10mg gummies");
    }

    #[test]
    fn normalize_joins_thousands_and_pre_rolls() {
        assert_eq!(
            normalize_description("1,000mg Pre Rolls"),
            "1000mg pre-rolls"
        );
    }

    #[test]
    fn normalize_count_label_folds_synonyms() {
        assert_eq!(normalize_count_label("Tablets"), Some(Unit::Tab));
        assert_eq!(normalize_count_label("pre-rolls"), Some(Unit::Joint));
        assert_eq!(normalize_count_label("rolls"), Some(Unit::Joint));
        assert_eq!(normalize_count_label("pcs"), Some(Unit::Pc));
        assert_eq!(normalize_count_label("cartridges"), Some(Unit::Cart));
        assert!(normalize_count_label("dream").is_none());
    }

    #[test]
    fn detect_implicit_unit_uses_table_order() {
        assert_eq!(detect_implicit_unit("gummies in a jar"), Some(Unit::Jar));
        assert_eq!(detect_implicit_unit("Milk Chocolate Bar"), Some(Unit::Bar));
        assert_eq!(detect_implicit_unit("510 thread cartridge"), Some(Unit::Cart));
        assert!(detect_implicit_unit("blue dream").is_none());
    }

    #[test]
    fn detect_implicit_unit_respects_word_boundaries() {
        assert!(detect_implicit_unit("backpacker special").is_none());
        assert!(detect_implicit_unit("capital kush").is_none());
    }

    #[test]
    fn tokenize_classifies_labels() {
        assert_eq!(
            kinds("2 joints 500mg 10 pack 3.5g"),
            vec![
                (2.0, TokenKind::Count(Unit::Joint)),
                (500.0, TokenKind::Dosage(DoseUnit::Mg)),
                (10.0, TokenKind::Count(Unit::Pk)),
                (3.5, TokenKind::Dosage(DoseUnit::G)),
            ]
        );
    }

    #[test]
    fn tokenize_marks_multiplier() {
        assert_eq!(
            kinds("5x10mg"),
            vec![
                (5.0, TokenKind::Times),
                (10.0, TokenKind::Dosage(DoseUnit::Mg)),
            ]
        );
    }

    #[test]
    fn tokenize_skips_noise_and_glued_numbers() {
        assert_eq!(
            kinds("og18 $30 25% thc 3 pm"),
            Vec::<(f64, TokenKind)>::new()
        );
    }

    #[test]
    fn tokenize_unknown_word_leaves_number_unlabeled() {
        let tokens = tokenize("2 blue dream");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Unlabeled);
        assert_eq!(tokens[0].end, 1);
    }

    #[test]
    fn tokenize_flags_container_words() {
        let tokens = tokenize("1 bag 7g");
        assert!(tokens[0].container);
        assert_eq!(tokens[0].kind, TokenKind::Unlabeled);
        assert_eq!(tokens[0].end, 5);
    }

    #[test]
    fn tokenize_range_takes_upper_label() {
        assert!(kinds("ships in 2-3 days").is_empty());
        assert_eq!(kinds("1-2g shake"), vec![(1.0, TokenKind::Dosage(DoseUnit::G))]);
        // No label after the upper bound: both numbers stand alone.
        assert_eq!(
            kinds("mix 2-3"),
            vec![(2.0, TokenKind::Unlabeled), (3.0, TokenKind::Unlabeled)]
        );
    }

    #[test]
    fn tokenize_drops_zero_values() {
        assert!(tokenize("0g 0 pack").is_empty());
    }

    #[test]
    fn tokenize_handles_non_ascii_text() {
        let tokens = tokenize("café 3.5g");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, 3.5);
    }

    #[test]
    fn kg_converts_to_grams() {
        assert_eq!(DoseUnit::Kg.canonical(2.0), (2000.0, Unit::G));
    }
}
