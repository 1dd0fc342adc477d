//! `parse` command: run the quantity parser over descriptions.

use mpidx_core::ParsedQuantity;
use mpidx_parse::{parse_quantity_with_rule, QuantityRule};

/// One description and what the parser made of it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParseOutcome<'a> {
    pub description: &'a str,
    pub result: Option<(QuantityRule, ParsedQuantity)>,
}

impl ParseOutcome<'_> {
    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self.result {
            Some((rule, parsed)) => serde_json::json!({
                "description": self.description,
                "qty": parsed.qty,
                "unit": parsed.unit,
                "rule": rule.as_str(),
            }),
            None => serde_json::json!({
                "description": self.description,
                "qty": null,
                "unit": null,
                "rule": null,
            }),
        }
    }

    pub(crate) fn to_line(&self, explain: bool) -> String {
        match self.result {
            Some((rule, parsed)) if explain => {
                format!("{}\t{parsed}\t[{rule}]", self.description)
            }
            Some((_, parsed)) => format!("{}\t{parsed}", self.description),
            None => format!("{}\tnone", self.description),
        }
    }
}

pub(crate) fn parse_descriptions(descriptions: &[String]) -> Vec<ParseOutcome<'_>> {
    descriptions
        .iter()
        .map(|d| ParseOutcome {
            description: d.as_str(),
            result: parse_quantity_with_rule(d.as_str()),
        })
        .collect()
}

/// Print the parsed quantity for each description.
///
/// # Errors
///
/// Returns an error only if JSON output cannot be serialized.
pub(crate) fn run_parse(descriptions: &[String], json: bool, explain: bool) -> anyhow::Result<()> {
    let outcomes = parse_descriptions(descriptions);

    if json {
        let values: Vec<serde_json::Value> = outcomes.iter().map(ParseOutcome::to_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    for outcome in &outcomes {
        println!("{}", outcome.to_line(explain));
    }
    Ok(())
}
