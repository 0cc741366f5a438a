//! Frontier normalization.
//!
//! Every [`RawFrontier`] variant is lowered into the same row form (one
//! borrowed cell per field, `None` when the backend did not send it) and then
//! goes through a single canonicalization step:
//! - truncate to the shortest required column
//! - assign position ratios in arrival order
//! - coerce numbers according to [`ParseMode`]
//! - stable sort by risk

use serde_json::Value;

use crate::error::ShapeError;
use crate::payload::{self, ParseMode, RawFrontier, ShapeKind};
use crate::points::{Frontier, FrontierPoint, MarkerPoint};

/// Borrowed cells of one frontier sample.
struct RawRow<'a> {
    ratio: Option<&'a Value>,
    risk: Option<&'a Value>,
    expected_return: Option<&'a Value>,
    weights: Option<&'a Value>,
}

#[derive(Debug, Clone, Copy)]
enum Cell {
    Ratio,
    Risk,
    Return,
    Weights,
}

/// Where a cell sits in the payload, for strict-mode errors.
fn cell_label(kind: ShapeKind, cell: Cell, i: usize) -> String {
    match kind {
        ShapeKind::NamedArrays => {
            let column = match cell {
                Cell::Ratio => "ratios",
                Cell::Risk => "risks",
                Cell::Return => "returns",
                Cell::Weights => "weights",
            };
            format!("{column}[{i}]")
        }
        ShapeKind::ArrayPair => match cell {
            Cell::Ratio => format!("[ratio {i}]"),
            Cell::Risk => format!("[0][{i}]"),
            Cell::Return => format!("[1][{i}]"),
            Cell::Weights => format!("[2][{i}]"),
        },
        ShapeKind::PointList => {
            let key = match cell {
                Cell::Ratio => "ratio",
                Cell::Risk => "risk",
                Cell::Return => "return",
                Cell::Weights => "weights",
            };
            format!("frontier[{i}].{key}")
        }
    }
}

/// Normalize an optimizer response with the lenient default.
pub fn normalize(raw: &Value) -> Result<Frontier, ShapeError> {
    normalize_with(raw, ParseMode::default())
}

/// Normalize an optimizer response into sorted points and markers.
pub fn normalize_with(raw: &Value, mode: ParseMode) -> Result<Frontier, ShapeError> {
    let parsed = RawFrontier::parse(raw)?;
    tracing::debug!(shape = %parsed.kind(), ?mode, "normalizing frontier payload");
    canonicalize(&parsed, mode)
}

/// The single canonicalization step shared by all payload shapes.
pub fn canonicalize(parsed: &RawFrontier<'_>, mode: ParseMode) -> Result<Frontier, ShapeError> {
    let rows = rows(parsed);
    let n = rows.len();
    if n == 0 {
        return Err(ShapeError::new("no usable frontier points"));
    }

    let kind = parsed.kind();
    let mut points = Vec::with_capacity(n);
    for (i, row) in rows.iter().enumerate() {
        let label = |cell: Cell| move || cell_label(kind, cell, i);
        let position_ratio = match row.ratio {
            Some(value) => payload::number_at(Some(value), mode, label(Cell::Ratio))?,
            None => synthesized_ratio(i, n),
        };
        points.push(FrontierPoint {
            position_ratio,
            risk: payload::number_at(row.risk, mode, label(Cell::Risk))?,
            expected_return: payload::number_at(row.expected_return, mode, label(Cell::Return))?,
            weights: payload::weights_at(row.weights, mode, &label(Cell::Weights))?,
        });
    }

    // `sort_by` is stable, equal risks keep arrival order.
    points.sort_by(|a, b| a.risk.total_cmp(&b.risk));

    let markers = markers(parsed, mode)?;
    tracing::debug!(points = points.len(), markers = markers.len(), "frontier normalized");
    Ok(Frontier { points, markers })
}

/// `i / (n - 1)`, or `0` for a single sample.
fn synthesized_ratio(i: usize, n: usize) -> f64 {
    if n > 1 {
        i as f64 / (n - 1) as f64
    } else {
        0.0
    }
}

fn rows<'a>(parsed: &RawFrontier<'a>) -> Vec<RawRow<'a>> {
    match *parsed {
        RawFrontier::NamedArrays { ratios, risks, returns } => {
            // An empty ratios array counts as absent.
            let ratios = ratios.filter(|r| !r.is_empty());
            let mut n = risks.len().min(returns.len());
            if let Some(r) = ratios {
                n = n.min(r.len());
            }
            let ratios = ratios.filter(|r| r.len() == n);
            (0..n)
                .map(|i| RawRow {
                    ratio: ratios.and_then(|r| r.get(i)),
                    risk: risks.get(i),
                    expected_return: returns.get(i),
                    weights: None,
                })
                .collect()
        }
        RawFrontier::ArrayPair { risks, returns, weights } => {
            let n = risks.len().min(returns.len());
            (0..n)
                .map(|i| RawRow {
                    ratio: None,
                    risk: risks.get(i),
                    expected_return: returns.get(i),
                    weights: weights.and_then(|w| w.get(i)),
                })
                .collect()
        }
        RawFrontier::PointList { frontier, .. } => frontier
            .iter()
            .map(|entry| RawRow {
                ratio: None,
                risk: entry.get("risk"),
                expected_return: payload::return_field(entry),
                weights: entry.get("weights"),
            })
            .collect(),
    }
}

fn markers(parsed: &RawFrontier<'_>, mode: ParseMode) -> Result<Vec<MarkerPoint>, ShapeError> {
    let RawFrontier::PointList { markers: Some(map), .. } = *parsed else {
        return Ok(Vec::new());
    };
    map.iter()
        .map(|(name, value)| payload::marker(name, value, mode, &format!("markers.{name}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn risks(frontier: &Frontier) -> Vec<f64> {
        frontier.points.iter().map(|p| p.risk).collect()
    }

    fn ratios(frontier: &Frontier) -> Vec<f64> {
        frontier.points.iter().map(|p| p.position_ratio).collect()
    }

    #[test]
    fn named_arrays_without_ratios() {
        let frontier = normalize(&json!({"risks": [0.1, 0.2], "returns": [0.05, 0.08]})).unwrap();
        assert_eq!(risks(&frontier), vec![0.1, 0.2]);
        assert_eq!(ratios(&frontier), vec![0.0, 1.0]);
        assert_eq!(frontier.points[1].expected_return, 0.08);
        assert!(frontier.markers.is_empty());
    }

    #[test]
    fn named_arrays_use_backend_ratios_when_lengths_agree() {
        let raw = json!({
            "ratios": [0.0, 0.3, 1.0],
            "risks": [0.3, 0.1, 0.2],
            "returns": [0.12, 0.04, 0.07],
        });
        let frontier = normalize(&raw).unwrap();
        assert_eq!(risks(&frontier), vec![0.1, 0.2, 0.3]);
        assert_eq!(ratios(&frontier), vec![0.3, 1.0, 0.0]);
    }

    #[test]
    fn longer_ratios_are_replaced_by_synthesized_ones() {
        let raw = json!({
            "ratios": [0.9, 0.8, 0.7, 0.6],
            "risks": [0.1, 0.2, 0.3],
            "returns": [0.01, 0.02, 0.03],
        });
        let frontier = normalize(&raw).unwrap();
        assert_eq!(ratios(&frontier), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn shorter_ratios_truncate_the_frontier() {
        let raw = json!({
            "ratios": [0.0, 1.0],
            "risks": [0.1, 0.2, 0.3],
            "returns": [0.01, 0.02, 0.03],
        });
        let frontier = normalize(&raw).unwrap();
        assert_eq!(risks(&frontier), vec![0.1, 0.2]);
        assert_eq!(ratios(&frontier), vec![0.0, 1.0]);
    }

    #[test]
    fn truncates_to_shortest_column() {
        let raw = json!([[0.5, 0.4, 0.3, 0.2, 0.1], [0.05, 0.04, 0.03]]);
        let frontier = normalize(&raw).unwrap();
        assert_eq!(frontier.points.len(), 3);
        assert_eq!(risks(&frontier), vec![0.3, 0.4, 0.5]);
        // ratios follow arrival order, not rank
        assert_eq!(ratios(&frontier), vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn array_pair_carries_parallel_weights() {
        let raw = json!([[0.2, 0.1], [0.08, 0.05], [[0.3, 0.7], [0.9, 0.1]]]);
        let frontier = normalize(&raw).unwrap();
        assert_eq!(frontier.points[0].weights, vec![0.9, 0.1]);
        assert_eq!(frontier.points[1].weights, vec![0.3, 0.7]);
    }

    #[test]
    fn single_point_has_zero_ratio() {
        let frontier = normalize(&json!({"risks": [0.2], "returns": [0.1]})).unwrap();
        assert_eq!(ratios(&frontier), vec![0.0]);
    }

    #[test]
    fn point_list_with_markers_in_backend_order() {
        let raw = json!({
            "frontier": [
                {"risk": 0.25, "return": 0.11, "weights": [0.1, 0.9]},
                {"risk": 0.12, "return": 0.06},
            ],
            "markers": {
                "risk_parity": {"risk": 0.14, "return": 0.07},
                "max_sharpe": {"risk": 0.18, "return": 0.1, "weights": [0.4, 0.6]},
                "min_volatility": {"risk": 0.11, "return": 0.05},
            }
        });
        let frontier = normalize(&raw).unwrap();
        assert_eq!(risks(&frontier), vec![0.12, 0.25]);
        assert!(frontier.points[0].weights.is_empty());
        assert_eq!(frontier.points[1].weights, vec![0.1, 0.9]);

        let names: Vec<&str> = frontier.markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["risk_parity", "max_sharpe", "min_volatility"]);
        assert_eq!(frontier.marker("max_sharpe").unwrap().weights, vec![0.4, 0.6]);
    }

    #[test]
    fn equal_risks_keep_arrival_order() {
        let raw = json!({"risks": [0.2, 0.1, 0.2, 0.1], "returns": [1, 2, 3, 4]});
        let frontier = normalize(&raw).unwrap();
        let returns: Vec<f64> = frontier.points.iter().map(|p| p.expected_return).collect();
        assert_eq!(returns, vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn malformed_fields_are_zero_when_lenient() {
        let raw = json!({
            "frontier": [
                {"risk": "0.3", "return": "n/a"},
                {"return": 0.02},
                "garbage",
            ]
        });
        let frontier = normalize(&raw).unwrap();
        assert_eq!(risks(&frontier), vec![0.0, 0.0, 0.3]);
        let returns: Vec<f64> = frontier.points.iter().map(|p| p.expected_return).collect();
        assert_eq!(returns, vec![0.02, 0.0, 0.0]);
    }

    #[test]
    fn strict_mode_rejects_malformed_fields() {
        let raw = json!({"risks": [0.1, "oops"], "returns": [0.01, 0.02]});
        let err = normalize_with(&raw, ParseMode::Strict).unwrap_err();
        assert_eq!(err.reason(), "non-numeric value \"oops\" at risks[1]");
        assert!(normalize_with(&raw, ParseMode::Lenient).is_ok());
    }

    #[test]
    fn strict_errors_locate_the_cell_in_each_shape() {
        let cases = [
            (
                json!({"ratios": [0.0, "?"], "risks": [0.1, 0.2], "returns": [0.01, 0.02]}),
                "non-numeric value \"?\" at ratios[1]",
            ),
            (json!([[0.1, 0.2], [0.01, null]]), "non-numeric value null at [1][1]"),
            (
                json!([[0.1, 0.2], [0.01, 0.02], [[1.0], [0.5, "half"]]]),
                "non-numeric value \"half\" at [2][1][1]",
            ),
            (
                json!({"frontier": [{"risk": 0.1, "return": 0.01}, {"return": 0.02}]}),
                "missing numeric field frontier[1].risk",
            ),
            (
                json!({"frontier": [{"risk": 0.1, "return": 0.01, "weights": "all-in"}]}),
                "weights at frontier[0].weights must be a sequence, got \"all-in\"",
            ),
            (
                json!({"frontier": [{"risk": 0.1, "return": 0.01}], "markers": {"max_sharpe": {"risk": 0.2}}}),
                "missing numeric field markers.max_sharpe.return",
            ),
        ];
        for (raw, expected) in cases {
            let err = normalize_with(&raw, ParseMode::Strict).unwrap_err();
            assert_eq!(err.reason(), expected);
        }
    }

    #[test]
    fn strict_mode_ignores_truncated_tail() {
        let raw = json!({"risks": [0.1, 0.2, "tail"], "returns": [0.01, 0.02]});
        assert_eq!(normalize_with(&raw, ParseMode::Strict).unwrap().points.len(), 2);
    }

    #[test]
    fn empty_columns_have_no_usable_points() {
        for raw in [
            json!({"risks": [], "returns": [0.1]}),
            json!([[], []]),
            json!({"frontier": []}),
        ] {
            let err = normalize(&raw).unwrap_err();
            assert_eq!(err.reason(), "no usable frontier points");
        }
    }

    #[test]
    fn empty_object_is_a_shape_error() {
        let err = normalize(&json!({})).unwrap_err();
        assert_eq!(err.reason(), "unrecognized frontier payload");
    }
}
