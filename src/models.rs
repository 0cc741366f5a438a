//! Single-portfolio optimizer models.
//!
//! Each model answers with one portfolio `{risk, expected_return, weights}`
//! instead of a whole frontier. The result is read as a [`MarkerPoint`] so it
//! can be plotted against the frontier.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{RequestError, ShapeError};
use crate::payload::{self, ParseMode};
use crate::points::MarkerPoint;
use crate::request::FrontierRequest;

/// Smallest basket the frontier endpoint accepts.
pub const MIN_FRONTIER_CODES: usize = 2;
/// Smallest basket the single-model endpoints accept.
pub const MIN_MODEL_CODES: usize = 5;

pub const FRONTIER_PATH: &str = "/api/optimize/frontier";
/// Combined route that takes the model name in the body.
pub const MODEL_PATH: &str = "/api/optimize/model";
pub const TARGET_RISK_MODEL: &str = "target_risk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerModel {
    MinVariance,
    MaxSharpe,
    RiskParity,
    MaxDiversification,
}

impl OptimizerModel {
    pub const ALL: [OptimizerModel; 4] = [
        OptimizerModel::MinVariance,
        OptimizerModel::MaxSharpe,
        OptimizerModel::RiskParity,
        OptimizerModel::MaxDiversification,
    ];

    /// Identifier used on the command line and in endpoint paths.
    pub fn slug(self) -> &'static str {
        match self {
            OptimizerModel::MinVariance => "min-variance",
            OptimizerModel::MaxSharpe => "max-sharpe",
            OptimizerModel::RiskParity => "risk-parity",
            OptimizerModel::MaxDiversification => "max-diversification",
        }
    }

    pub fn path(self) -> String {
        format!("/api/optimize/{}", self.slug())
    }

    /// Marker name the frontier payload uses for the same portfolio.
    pub fn marker_name(self) -> &'static str {
        match self {
            OptimizerModel::MinVariance => "min_volatility",
            OptimizerModel::MaxSharpe => "max_sharpe",
            OptimizerModel::RiskParity => "risk_parity",
            OptimizerModel::MaxDiversification => "max_diversification",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            OptimizerModel::MinVariance => "Minimum Variance",
            OptimizerModel::MaxSharpe => "Maximum Sharpe",
            OptimizerModel::RiskParity => "Risk Parity",
            OptimizerModel::MaxDiversification => "Maximum Diversification",
        }
    }

    /// Read a model response into a marker.
    pub fn parse_result(self, raw: &Value, mode: ParseMode) -> Result<MarkerPoint, ShapeError> {
        if !raw.is_object() {
            return Err(ShapeError::new(format!(
                "{} result must be an object",
                self.slug()
            )));
        }
        payload::marker(self.marker_name(), raw, mode, self.slug())
    }
}

impl FromStr for OptimizerModel {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        OptimizerModel::ALL
            .into_iter()
            .find(|m| m.slug() == wanted || m.marker_name().replace('_', "-") == wanted)
            .ok_or_else(|| RequestError::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for OptimizerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Body for a target-risk optimization: the basket window plus the risk the
/// portfolio should sit at.
#[derive(Debug, Clone, Serialize)]
pub struct TargetRiskRequest<'a> {
    pub model: &'static str,
    #[serde(flatten)]
    pub basket: &'a FrontierRequest,
    pub risk: f64,
}

impl<'a> TargetRiskRequest<'a> {
    pub fn new(basket: &'a FrontierRequest, risk: f64) -> Result<Self, RequestError> {
        if !risk.is_finite() || risk < 0.0 {
            return Err(RequestError::InvalidTargetRisk(risk.to_string()));
        }
        Ok(TargetRiskRequest {
            model: TARGET_RISK_MODEL,
            basket,
            risk,
        })
    }

    /// Read the optimizer's answer into a `target_risk` marker.
    pub fn parse_result(&self, raw: &Value, mode: ParseMode) -> Result<MarkerPoint, ShapeError> {
        if !raw.is_object() {
            return Err(ShapeError::new(format!("{TARGET_RISK_MODEL} result must be an object")));
        }
        payload::marker(TARGET_RISK_MODEL, raw, mode, TARGET_RISK_MODEL)
    }
}
