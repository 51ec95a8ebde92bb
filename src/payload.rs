//! Weight payloads handed over by the statement/goal backend.
//!
//! Three shapes are accepted:
//!
//! - an array of objects, e.g. `[{"name": "Bills", "percentage": 20}]`
//! - an array of `[name, weight]` pairs
//! - a `name -> weight` mapping, in key insertion order
//!
//! Individual entries never fail: a missing name becomes `"unknown"` and a weight that cannot be
//! read as a nonnegative number becomes 0.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub const UNKNOWN_NAME: &str = "unknown";

const NAME_KEYS: [&str; 3] = ["name", "category", "label"];
const WEIGHT_KEYS: [&str; 4] = ["weight", "percentage", "value", "amount"];

static NON_NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d.\-]").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub name: String,
    pub weight: f64,
}

impl WeightEntry {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("weight payload is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("weight payload must be an array or an object, found {0}")]
    UnsupportedShape(&'static str),
}

/// Parses a payload as strict JSON, falling back to JSON5 for hand-written input.
pub fn parse_weights(input: &str) -> Result<Vec<WeightEntry>, PayloadError> {
    let value = match serde_json::from_str::<Value>(input) {
        Ok(value) => value,
        Err(err) => match json5::from_str::<Value>(input) {
            Ok(value) => value,
            Err(_) => return Err(PayloadError::Syntax(err)),
        },
    };
    weights_from_value(&value)
}

pub fn weights_from_value(value: &Value) -> Result<Vec<WeightEntry>, PayloadError> {
    match value {
        Value::Array(items) => Ok(items.iter().map(entry_from_item).collect()),
        Value::Object(map) => Ok(map
            .iter()
            .map(|(name, weight)| WeightEntry::new(coerce_name(Some(name)), coerce_weight(weight)))
            .collect()),
        Value::Null => Err(PayloadError::UnsupportedShape("null")),
        Value::Bool(_) => Err(PayloadError::UnsupportedShape("a boolean")),
        Value::Number(_) => Err(PayloadError::UnsupportedShape("a number")),
        Value::String(_) => Err(PayloadError::UnsupportedShape("a string")),
    }
}

fn entry_from_item(item: &Value) -> WeightEntry {
    match item {
        Value::Object(fields) => {
            let name = NAME_KEYS
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str));
            let weight = WEIGHT_KEYS
                .iter()
                .find_map(|key| fields.get(*key))
                .map(coerce_weight)
                .unwrap_or(0.0);
            WeightEntry::new(coerce_name(name), weight)
        }
        Value::Array(pair) => {
            let name = pair.first().and_then(Value::as_str);
            let weight = pair.get(1).map(coerce_weight).unwrap_or(0.0);
            WeightEntry::new(coerce_name(name), weight)
        }
        other => {
            warn!(entry = %other, "weight entry is neither an object nor a pair; using zero");
            WeightEntry::new(UNKNOWN_NAME, 0.0)
        }
    }
}

fn coerce_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            warn!("weight entry has no name; using \"{UNKNOWN_NAME}\"");
            UNKNOWN_NAME.to_string()
        }
    }
}

fn coerce_weight(value: &Value) -> f64 {
    let weight = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => parse_amount(text),
        _ => 0.0,
    };
    if weight.is_finite() && weight >= 0.0 {
        weight
    } else {
        warn!(%value, "weight is negative or not finite; using zero");
        0.0
    }
}

/// Reads amounts such as `"£4,500.25"` or `"1,200"`; anything unreadable is 0.
pub fn parse_amount(text: &str) -> f64 {
    let stripped = NON_NUMERIC_RE.replace_all(text.trim(), "");
    match stripped.as_ref() {
        "" | "-" | "." | "-." => 0.0,
        digits => digits.parse::<f64>().unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[WeightEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    fn weights(entries: &[WeightEntry]) -> Vec<f64> {
        entries.iter().map(|entry| entry.weight).collect()
    }

    #[test]
    fn reads_array_of_percentage_objects() {
        let entries =
            parse_weights(r#"[{"name":"Bills","percentage":20},{"name":"Travel","weight":15.5}]"#)
                .unwrap();
        assert_eq!(names(&entries), vec!["Bills", "Travel"]);
        assert_eq!(weights(&entries), vec![20.0, 15.5]);
    }

    #[test]
    fn mapping_keeps_insertion_order() {
        let entries = parse_weights(r#"{"Zeta": 1, "Alpha": 2, "Mid": 3}"#).unwrap();
        assert_eq!(names(&entries), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn pairs_and_alternate_keys_are_accepted() {
        let entries = parse_weights(r#"[["Bills", 3], {"category": "Travel", "amount": "1,200.50"}]"#)
            .unwrap();
        assert_eq!(names(&entries), vec!["Bills", "Travel"]);
        assert_eq!(weights(&entries), vec![3.0, 1200.5]);
    }

    #[test]
    fn malformed_entries_are_coerced() {
        let entries = parse_weights(
            r#"[{"percentage": 10}, {"name": "Bills", "weight": "lots"}, {"name": "  ", "weight": -4}, 7]"#,
        )
        .unwrap();
        assert_eq!(names(&entries), vec!["unknown", "Bills", "unknown", "unknown"]);
        assert_eq!(weights(&entries), vec![10.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn falls_back_to_json5() {
        let entries = parse_weights("{ Groceries: 20, 'Eating Out': 10, }").unwrap();
        assert_eq!(names(&entries), vec!["Groceries", "Eating Out"]);
    }

    #[test]
    fn rejects_scalars_and_garbage() {
        assert!(matches!(
            parse_weights("42"),
            Err(PayloadError::UnsupportedShape("a number"))
        ));
        assert!(matches!(parse_weights("{not json"), Err(PayloadError::Syntax(_))));
    }

    #[test]
    fn parse_amount_strips_currency_and_separators() {
        assert_eq!(parse_amount("£4,500.25"), 4500.25);
        assert_eq!(parse_amount("$ 76.80"), 76.8);
        assert_eq!(parse_amount("-"), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
    }
}
