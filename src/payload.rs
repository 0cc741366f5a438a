//! Raw optimizer payloads.
//!
//! The optimizer has shipped three response contracts over time. A payload is
//! first classified into one [`RawFrontier`] variant, borrowing from the JSON
//! tree, and only then canonicalized (see `frontier.rs`). Numeric fields are
//! read through [`ParseMode`], which decides whether malformed values become
//! `0` or fail the whole payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ShapeError;
use crate::points::MarkerPoint;

/// How malformed numeric fields are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Missing or non-numeric values become `0`.
    #[default]
    Lenient,
    /// Missing or non-numeric values are a [`ShapeError`].
    Strict,
}

/// The accepted payload contracts, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    NamedArrays,
    ArrayPair,
    PointList,
}

impl ShapeKind {
    pub const PRIORITY: [ShapeKind; 3] = [
        ShapeKind::NamedArrays,
        ShapeKind::ArrayPair,
        ShapeKind::PointList,
    ];

    fn matches(self, raw: &Value) -> bool {
        match self {
            ShapeKind::NamedArrays => {
                raw.get("risks").is_some_and(Value::is_array)
                    && raw.get("returns").is_some_and(Value::is_array)
            }
            ShapeKind::ArrayPair => match raw.as_array() {
                Some(items) => {
                    items.first().is_some_and(Value::is_array)
                        && items.get(1).is_some_and(Value::is_array)
                }
                None => false,
            },
            ShapeKind::PointList => raw.get("frontier").is_some_and(Value::is_array),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::NamedArrays => "named-arrays",
            ShapeKind::ArrayPair => "array-pair",
            ShapeKind::PointList => "point-list",
        };
        f.write_str(name)
    }
}

/// A payload classified into one of the accepted contracts.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFrontier<'a> {
    /// `{ ratios?, risks, returns }`
    NamedArrays {
        ratios: Option<&'a [Value]>,
        risks: &'a [Value],
        returns: &'a [Value],
    },
    /// `[risks, returns, weights?]`
    ArrayPair {
        risks: &'a [Value],
        returns: &'a [Value],
        weights: Option<&'a [Value]>,
    },
    /// `{ frontier: [{risk, return, weights?}], markers?: {name: {...}} }`
    PointList {
        frontier: &'a [Value],
        markers: Option<&'a Map<String, Value>>,
    },
}

impl<'a> RawFrontier<'a> {
    /// Every contract `raw` satisfies, in resolution order.
    pub fn candidates(raw: &Value) -> Vec<ShapeKind> {
        ShapeKind::PRIORITY
            .into_iter()
            .filter(|kind| kind.matches(raw))
            .collect()
    }

    /// Classify `raw`, first match wins.
    pub fn parse(raw: &'a Value) -> Result<Self, ShapeError> {
        let candidates = Self::candidates(raw);
        let Some(&kind) = candidates.first() else {
            return Err(ShapeError::new("unrecognized frontier payload"));
        };
        if candidates.len() > 1 {
            tracing::warn!(
                chosen = %kind,
                candidates = ?candidates.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "optimizer payload satisfies several frontier shapes"
            );
        }

        let parsed = match kind {
            ShapeKind::NamedArrays => RawFrontier::NamedArrays {
                ratios: array_field(raw, "ratios"),
                risks: array_field(raw, "risks").unwrap_or_default(),
                returns: array_field(raw, "returns").unwrap_or_default(),
            },
            ShapeKind::ArrayPair => {
                let items = raw.as_array().map(Vec::as_slice).unwrap_or_default();
                let column = |i: usize| items.get(i).and_then(Value::as_array).map(Vec::as_slice);
                RawFrontier::ArrayPair {
                    risks: column(0).unwrap_or_default(),
                    returns: column(1).unwrap_or_default(),
                    weights: column(2),
                }
            }
            ShapeKind::PointList => RawFrontier::PointList {
                frontier: array_field(raw, "frontier").unwrap_or_default(),
                markers: raw.get("markers").and_then(Value::as_object),
            },
        };
        Ok(parsed)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            RawFrontier::NamedArrays { .. } => ShapeKind::NamedArrays,
            RawFrontier::ArrayPair { .. } => ShapeKind::ArrayPair,
            RawFrontier::PointList { .. } => ShapeKind::PointList,
        }
    }
}

fn array_field<'a>(raw: &'a Value, key: &str) -> Option<&'a [Value]> {
    raw.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// Numeric-or-default: numbers pass through, numeric strings are parsed,
/// anything else is `0` (lenient) or an error naming `field` (strict).
///
/// Booleans are not numbers here: `true` reads as `0` when lenient and fails
/// when strict, same as `null`.
pub fn number(value: Option<&Value>, mode: ParseMode, field: &str) -> Result<f64, ShapeError> {
    number_at(value, mode, || field.to_string())
}

/// [`number`] with the field label built only when strict mode fails.
pub(crate) fn number_at(
    value: Option<&Value>,
    mode: ParseMode,
    field: impl FnOnce() -> String,
) -> Result<f64, ShapeError> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite());

    match (parsed, mode) {
        (Some(v), _) => Ok(v),
        (None, ParseMode::Lenient) => Ok(0.0),
        (None, ParseMode::Strict) => Err(ShapeError::new(match value {
            None => format!("missing numeric field {}", field()),
            Some(other) => format!("non-numeric value {other} at {}", field()),
        })),
    }
}

/// A weight vector. Absent or `null` is empty in both modes.
pub fn weights(value: Option<&Value>, mode: ParseMode, field: &str) -> Result<Vec<f64>, ShapeError> {
    weights_at(value, mode, &|| field.to_string())
}

pub(crate) fn weights_at(
    value: Option<&Value>,
    mode: ParseMode,
    field: &dyn Fn() -> String,
) -> Result<Vec<f64>, ShapeError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, w)| number_at(Some(w), mode, || format!("{}[{i}]", field())))
            .collect(),
        Some(other) => match mode {
            ParseMode::Lenient => Ok(Vec::new()),
            ParseMode::Strict => Err(ShapeError::new(format!(
                "weights at {} must be a sequence, got {other}",
                field()
            ))),
        },
    }
}

/// Expected return of a point-like object: `return`, else `expected_return`.
pub(crate) fn return_field(obj: &Value) -> Option<&Value> {
    obj.get("return").or_else(|| obj.get("expected_return"))
}

/// Read a `{risk, return, weights?}` object as a named marker.
pub fn marker(name: &str, value: &Value, mode: ParseMode, path: &str) -> Result<MarkerPoint, ShapeError> {
    Ok(MarkerPoint {
        name: name.to_string(),
        risk: number_at(value.get("risk"), mode, || format!("{path}.risk"))?,
        expected_return: number_at(return_field(value), mode, || format!("{path}.return"))?,
        weights: weights_at(value.get("weights"), mode, &|| format!("{path}.weights"))?,
    })
}
