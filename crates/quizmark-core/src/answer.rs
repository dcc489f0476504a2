//! Canonical answer keys and coercion of student answers.
//!
//! Canonical keys are parsed once, when a test is loaded, into an
//! [`AnswerKey`]. Student answers stay as raw JSON until grading, where the
//! `coerce_*` helpers turn them into comparable values or report that the
//! shape is wrong.

use serde_json::{json, Value};

use crate::model::QuestionKind;

/// A single element of a pair or an edge: a number or a label.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Number(f64),
    Text(String),
}

impl Atom {
    /// Read an atom from JSON. Strings are trimmed; other values are rejected.
    pub fn from_json(value: &Value) -> Option<Atom> {
        match value {
            Value::Number(n) => n.as_f64().map(Atom::Number),
            Value::String(s) => Some(Atom::Text(s.trim().to_string())),
            _ => None,
        }
    }

    /// Equality with numeric coercion, so `"3"` matches `3`.
    pub fn matches(&self, other: &Atom) -> bool {
        match (self, other) {
            (Atom::Number(a), Atom::Number(b)) => a == b,
            (Atom::Text(a), Atom::Text(b)) => a == b,
            (Atom::Number(n), Atom::Text(t)) | (Atom::Text(t), Atom::Number(n)) => {
                t.parse::<f64>().is_ok_and(|v| v == *n)
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Atom::Number(n) => number_json(*n),
            Atom::Text(s) => Value::String(s.clone()),
        }
    }
}

/// A two-element pair or edge.
pub type AtomPair = [Atom; 2];

/// A parsed canonical answer, one variant per gradable question kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKey {
    Text(String),
    Number(f64),
    NumberList { values: Vec<f64>, ordered: bool },
    Matrix(Vec<Vec<f64>>),
    MultiSelect(Vec<u8>),
    Pairs { pairs: Vec<AtomPair>, ordered: bool },
    Edges(Vec<AtomPair>),
}

impl AnswerKey {
    /// Parse the canonical answer for a question of the given kind.
    ///
    /// Returns a human-readable reason when the value has the wrong shape.
    pub fn parse(kind: &QuestionKind, value: &Value) -> Result<AnswerKey, String> {
        match kind {
            QuestionKind::Text => coerce_text(value)
                .map(AnswerKey::Text)
                .ok_or_else(|| "expected a string".to_string()),
            QuestionKind::Number => coerce_number(value)
                .map(AnswerKey::Number)
                .ok_or_else(|| "expected a number".to_string()),
            QuestionKind::NumberList => {
                let values = coerce_number_list(keyed(value, "massiv"))
                    .ok_or_else(|| "expected `massiv` to be a list of numbers".to_string())?;
                Ok(AnswerKey::NumberList {
                    values,
                    ordered: consistency_flag(value),
                })
            }
            QuestionKind::Matrix => coerce_matrix(keyed(value, "matrix"))
                .map(AnswerKey::Matrix)
                .ok_or_else(|| "expected a 2-D array of numbers".to_string()),
            QuestionKind::MultiSelect => coerce_flags(keyed(value, "correct"))
                .map(AnswerKey::MultiSelect)
                .ok_or_else(|| "expected `correct` to be a list of 0/1 flags".to_string()),
            QuestionKind::Pairs => {
                let pairs = coerce_pairs(keyed(value, "pairs"))
                    .ok_or_else(|| "expected `pairs` to be a list of 2-element pairs".to_string())?;
                Ok(AnswerKey::Pairs {
                    pairs,
                    ordered: consistency_flag(value),
                })
            }
            QuestionKind::Edges => coerce_pairs(keyed(value, "edges"))
                .map(AnswerKey::Edges)
                .ok_or_else(|| "expected `edges` to be a list of 2-element edges".to_string()),
            QuestionKind::Unknown(tag) => Err(format!("no answer shape for type '{tag}'")),
        }
    }

    /// The question kind this key grades.
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerKey::Text(_) => QuestionKind::Text,
            AnswerKey::Number(_) => QuestionKind::Number,
            AnswerKey::NumberList { .. } => QuestionKind::NumberList,
            AnswerKey::Matrix(_) => QuestionKind::Matrix,
            AnswerKey::MultiSelect(_) => QuestionKind::MultiSelect,
            AnswerKey::Pairs { .. } => QuestionKind::Pairs,
            AnswerKey::Edges(_) => QuestionKind::Edges,
        }
    }

    /// Whether a collection key has no elements. Scalars are never empty.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            AnswerKey::Text(_) | AnswerKey::Number(_) => false,
            AnswerKey::NumberList { values, .. } => values.is_empty(),
            AnswerKey::Matrix(rows) => rows.iter().all(Vec::is_empty),
            AnswerKey::MultiSelect(flags) => flags.is_empty(),
            AnswerKey::Pairs { pairs, .. } => pairs.is_empty(),
            AnswerKey::Edges(edges) => edges.is_empty(),
        }
    }

    /// The key in its canonical JSON document shape.
    pub fn to_json(&self) -> Value {
        match self {
            AnswerKey::Text(s) => Value::String(s.clone()),
            AnswerKey::Number(n) => number_json(*n),
            AnswerKey::NumberList { values, ordered } => json!({
                "massiv": values.iter().copied().map(number_json).collect::<Vec<_>>(),
                "consistencyImportant": ordered,
            }),
            AnswerKey::Matrix(rows) => Value::Array(
                rows.iter()
                    .map(|row| Value::Array(row.iter().copied().map(number_json).collect()))
                    .collect(),
            ),
            AnswerKey::MultiSelect(flags) => json!({ "correct": flags }),
            AnswerKey::Pairs { pairs, ordered } => json!({
                "pairs": pairs_json(pairs),
                "consistencyImportant": ordered,
            }),
            AnswerKey::Edges(edges) => json!({ "edges": pairs_json(edges) }),
        }
    }
}

fn pairs_json(pairs: &[AtomPair]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|[a, b]| Value::Array(vec![a.to_json(), b.to_json()]))
            .collect(),
    )
}

/// Whole numbers serialize as integers so `42` round-trips as `42`, not `42.0`.
fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// If `value` is an object carrying `field`, return that field; otherwise the
/// value itself. Lets answers be given bare or wrapped in their keyed object.
pub(crate) fn keyed<'a>(value: &'a Value, field: &str) -> &'a Value {
    match value {
        Value::Object(map) => map.get(field).unwrap_or(value),
        _ => value,
    }
}

fn consistency_flag(value: &Value) -> bool {
    value
        .get("consistencyImportant")
        .and_then(coerce_bool)
        .unwrap_or(false)
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// JSON numbers, and strings whose trimmed content parses as a finite number.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Strings as-is, numbers via their JSON text. Whole numbers drop the
/// fractional part, so `42.0` reads as `"42"`.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) => number_json(f).to_string(),
            None => n.to_string(),
        }),
        _ => None,
    }
}

/// An array whose every element coerces to a number.
pub fn coerce_number_list(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(coerce_number).collect()
}

/// An array of number lists. Rows may have different lengths.
pub fn coerce_matrix(value: &Value) -> Option<Vec<Vec<f64>>> {
    value.as_array()?.iter().map(coerce_number_list).collect()
}

/// An array of 0/1 flags; booleans and numeric strings are accepted.
pub fn coerce_flags(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()?
        .iter()
        .map(|flag| match flag {
            Value::Bool(b) => Some(u8::from(*b)),
            other => match coerce_number(other)? {
                v if v == 0.0 => Some(0),
                v if v == 1.0 => Some(1),
                _ => None,
            },
        })
        .collect()
}

/// An array of exactly-two-element arrays of atoms.
pub fn coerce_pairs(value: &Value) -> Option<Vec<AtomPair>> {
    value
        .as_array()?
        .iter()
        .map(|pair| match pair.as_array()?.as_slice() {
            [a, b] => Some([Atom::from_json(a)?, Atom::from_json(b)?]),
            _ => None,
        })
        .collect()
}
