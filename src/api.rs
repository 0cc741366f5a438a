//! HTTP client for the remote optimizer service.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::frontier::normalize_with;
use crate::models::{
    OptimizerModel, TargetRiskRequest, FRONTIER_PATH, MIN_FRONTIER_CODES, MIN_MODEL_CODES, MODEL_PATH,
};
use crate::points::{Frontier, MarkerPoint};
use crate::request::FrontierRequest;

#[derive(Debug, Clone)]
pub struct OptimizerClient {
    client: Client,
    config: Config,
}

impl OptimizerClient {
    pub fn new(config: Config) -> std::result::Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;
        Ok(OptimizerClient { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request the efficient frontier for `request` and normalize it.
    pub async fn frontier(&self, request: &FrontierRequest) -> Result<Frontier> {
        request.ensure_codes(MIN_FRONTIER_CODES)?;
        let body = self.post(FRONTIER_PATH, request, request).await?;
        let frontier = normalize_with(unwrap_envelope(&body), self.config.parse_mode)?;
        info!(
            points = frontier.points.len(),
            markers = frontier.markers.len(),
            "frontier received"
        );
        Ok(frontier)
    }

    /// Run one single-portfolio model.
    pub async fn optimize(&self, model: OptimizerModel, request: &FrontierRequest) -> Result<MarkerPoint> {
        request.ensure_codes(MIN_MODEL_CODES)?;
        let body = self.post(&model.path(), request, request).await?;
        let marker = model.parse_result(unwrap_envelope(&body), self.config.parse_mode)?;
        check_weights(&marker, request);
        Ok(marker)
    }

    /// Ask for the portfolio that sits at `target` risk, usually the value
    /// [`crate::target_risk`] derives from a tolerance.
    pub async fn optimize_target_risk(&self, request: &FrontierRequest, target: f64) -> Result<MarkerPoint> {
        request.ensure_codes(MIN_FRONTIER_CODES)?;
        let target_request = TargetRiskRequest::new(request, target)?;
        let body = self.post(MODEL_PATH, request, &target_request).await?;
        let marker = target_request.parse_result(unwrap_envelope(&body), self.config.parse_mode)?;
        info!(target, risk = marker.risk, "target-risk portfolio received");
        check_weights(&marker, request);
        Ok(marker)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        request: &FrontierRequest,
        body: &B,
    ) -> std::result::Result<Value, ApiError> {
        let url = self.config.url(path);
        debug!(%url, codes = request.codes.len(), start = %request.start, end = %request.end, "posting optimizer request");

        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn check_weights(marker: &MarkerPoint, request: &FrontierRequest) {
    if !marker.weights.is_empty() && marker.weights.len() != request.codes.len() {
        warn!(
            marker = %marker.name,
            weights = marker.weights.len(),
            codes = request.codes.len(),
            "weight count does not match basket"
        );
    }
}

/// Payloads may arrive wrapped as `{"data": ...}`; a missing or null `data`
/// means the body itself is the payload.
pub fn unwrap_envelope(body: &Value) -> &Value {
    match body.get("data") {
        Some(inner) if !inner.is_null() => inner,
        _ => body,
    }
}

/// Human-readable reason from an error body: `error`, then `detail`, then the
/// raw text.
pub fn error_message(text: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(text).ok();
    parsed
        .as_ref()
        .and_then(|body| {
            ["error", "detail"]
                .into_iter()
                .find_map(|key| body.get(key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| text.trim().to_string())
}
