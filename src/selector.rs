//! Risk-tolerance selection over a normalized frontier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EmptyInputError;
use crate::points::{risk_bounds, FrontierPoint};

/// Slider value in `0..=100`. Out-of-range input is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct RiskTolerance(u8);

impl RiskTolerance {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        RiskTolerance(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Position along the observed risk range, `0.0..=1.0`.
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / f64::from(Self::MAX)
    }

    /// Caption under the slider.
    pub fn label(self) -> &'static str {
        match self.0 {
            0..=33 => "conservative",
            34..=66 => "moderate",
            _ => "aggressive",
        }
    }
}

impl Default for RiskTolerance {
    fn default() -> Self {
        RiskTolerance(50)
    }
}

impl From<u8> for RiskTolerance {
    fn from(value: u8) -> Self {
        RiskTolerance::new(value)
    }
}

impl From<RiskTolerance> for u8 {
    fn from(value: RiskTolerance) -> Self {
        value.0
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Map a tolerance onto the observed risk range.
///
/// Returns the minimum finite risk when the range is degenerate (all risks
/// equal, or any risk non-finite) and `None` for an empty slice.
pub fn target_risk(points: &[FrontierPoint], risk_tolerance: u8) -> Option<f64> {
    let (min_risk, _) = risk_bounds(points)?;
    match spread(points) {
        Some((lo, hi)) => Some(interpolate(lo, hi, RiskTolerance::new(risk_tolerance).fraction())),
        None => Some(min_risk),
    }
}

/// Pick the point whose risk is closest to the tolerance-implied target.
///
/// Tolerances above 100 are clamped. Ties go to the earliest point in
/// `points`. A degenerate risk range, including any NaN or infinite risk,
/// returns `points[0]` directly.
pub fn select(points: &[FrontierPoint], risk_tolerance: u8) -> Result<&FrontierPoint, EmptyInputError> {
    let Some(first) = points.first() else {
        return Err(EmptyInputError);
    };
    let Some((min_risk, max_risk)) = spread(points) else {
        return Ok(first);
    };

    let target = interpolate(min_risk, max_risk, RiskTolerance::new(risk_tolerance).fraction());
    let mut best = first;
    let mut best_distance = (first.risk - target).abs();
    for point in &points[1..] {
        let distance = (point.risk - target).abs();
        if distance < best_distance {
            best = point;
            best_distance = distance;
        }
    }
    Ok(best)
}

/// `(min, max)` risk when every risk is finite and the range is non-empty.
fn spread(points: &[FrontierPoint]) -> Option<(f64, f64)> {
    if points.iter().any(|p| !p.risk.is_finite()) {
        return None;
    }
    risk_bounds(points).filter(|(lo, hi)| hi > lo)
}

fn interpolate(min_risk: f64, max_risk: f64, t: f64) -> f64 {
    min_risk + t * (max_risk - min_risk)
}
