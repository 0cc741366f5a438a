//! Canonical frontier records handed to the chart layer.

use serde::{Deserialize, Serialize};

/// One sampled point on the efficient frontier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Relative position among the backend's samples (0 = first, 1 = last),
    /// assigned before sorting.
    pub position_ratio: f64,
    /// Annualized volatility as a fraction (0.18 = 18%).
    pub risk: f64,
    /// Annualized expected return as a fraction, may be negative.
    pub expected_return: f64,
    #[serde(default)]
    pub weights: Vec<f64>,
}

/// A named reference portfolio (max Sharpe, min volatility, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPoint {
    pub name: String,
    pub risk: f64,
    pub expected_return: f64,
    #[serde(default)]
    pub weights: Vec<f64>,
}

/// Result of one normalization call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontier {
    /// Sorted by ascending risk, stable.
    pub points: Vec<FrontierPoint>,
    /// Backend key order, unsorted.
    pub markers: Vec<MarkerPoint>,
}

impl Frontier {
    /// Observed `(min, max)` risk across the frontier points.
    pub fn risk_range(&self) -> Option<(f64, f64)> {
        risk_bounds(&self.points)
    }

    pub fn marker(&self, name: &str) -> Option<&MarkerPoint> {
        self.markers.iter().find(|m| m.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Min and max risk of a point slice, `None` when empty.
pub(crate) fn risk_bounds(points: &[FrontierPoint]) -> Option<(f64, f64)> {
    let first = points.first()?.risk;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (lo.min(p.risk), hi.max(p.risk))
    }))
}

/// Pair each ticker code with its weight. Extra weights or codes are dropped.
pub fn weight_rows<'a>(codes: &'a [String], weights: &[f64]) -> Vec<(&'a str, f64)> {
    codes
        .iter()
        .zip(weights.iter())
        .map(|(code, w)| (code.as_str(), *w))
        .collect()
}

/// Format a fraction as a percentage string, e.g. `0.1834` -> `"18.34%"`.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(risk: f64) -> FrontierPoint {
        FrontierPoint {
            position_ratio: 0.0,
            risk,
            expected_return: 0.0,
            weights: Vec::new(),
        }
    }

    #[test]
    fn risk_range_spans_unsorted_points() {
        let frontier = Frontier {
            points: vec![point(0.2), point(0.05), point(0.1)],
            markers: Vec::new(),
        };
        assert_eq!(frontier.risk_range(), Some((0.05, 0.2)));
        assert_eq!(Frontier::default().risk_range(), None);
    }

    #[test]
    fn weight_rows_truncate_to_shorter_side() {
        let codes = vec!["005930".to_string(), "AAPL".to_string(), "MSFT".to_string()];
        let rows = weight_rows(&codes, &[0.6, 0.4]);
        assert_eq!(rows, vec![("005930", 0.6), ("AAPL", 0.4)]);
    }

    #[test]
    fn percent_formats_fraction() {
        assert_eq!(percent(0.1834, 2), "18.34%");
        assert_eq!(percent(-0.05, 1), "-5.0%");
    }

    #[test]
    fn marker_lookup_by_name() {
        let frontier = Frontier {
            points: Vec::new(),
            markers: vec![MarkerPoint {
                name: "max_sharpe".to_string(),
                risk: 0.15,
                expected_return: 0.09,
                weights: vec![0.5, 0.5],
            }],
        };
        assert_eq!(frontier.marker("max_sharpe").map(|m| m.risk), Some(0.15));
        assert!(frontier.marker("risk_parity").is_none());
    }
}
