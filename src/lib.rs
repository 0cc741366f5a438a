//! Efficient-frontier client.
//!
//! Sends a ticker basket to a remote portfolio optimizer, normalizes whichever
//! frontier contract it answers with into risk-sorted [`FrontierPoint`]s and
//! named [`MarkerPoint`]s, and maps a 0–100 risk tolerance onto the nearest
//! point of that frontier.
//!
//! ```
//! use frontier_view::{normalize, select};
//! use serde_json::json;
//!
//! let frontier = normalize(&json!({"risks": [0.05, 0.10, 0.20], "returns": [0.02, 0.04, 0.09]}))?;
//! let picked = select(&frontier.points, 50)?;
//! assert_eq!(picked.risk, 0.10);
//! # Ok::<(), frontier_view::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod frontier;
pub mod models;
pub mod payload;
pub mod points;
pub mod request;
pub mod selector;

pub use api::OptimizerClient;
pub use config::Config;
pub use error::{ApiError, EmptyInputError, Error, RequestError, Result, ShapeError};
pub use frontier::{normalize, normalize_with};
pub use models::{OptimizerModel, TargetRiskRequest};
pub use payload::{ParseMode, RawFrontier, ShapeKind};
pub use points::{Frontier, FrontierPoint, MarkerPoint};
pub use request::{FrontierRequest, Range};
pub use selector::{select, target_risk, RiskTolerance};
