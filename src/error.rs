use thiserror::Error;

/// The optimizer payload could not be turned into a frontier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not compute a valid frontier: {0}")]
pub struct ShapeError(pub String);

impl ShapeError {
    pub fn new(reason: impl Into<String>) -> Self {
        ShapeError(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Selection was attempted on an empty point sequence.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot select a frontier point from an empty sequence")]
pub struct EmptyInputError;

/// Problems with a request before it leaves the process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("at least {required} ticker codes are required, got {given}")]
    TooFewCodes { required: usize, given: usize },
    #[error("invalid ticker code: {0:?}")]
    InvalidCode(String),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("start date {start} is after end date {end}")]
    InvalidWindow { start: String, end: String },
    #[error("unknown range preset {0:?}")]
    UnknownRange(String),
    #[error("unknown optimizer model {0:?}")]
    UnknownModel(String),
    #[error("target risk must be a finite non-negative number, got {0}")]
    InvalidTargetRisk(String),
}

/// Failures talking to the optimizer service
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("optimizer returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode optimizer response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    EmptyInput(#[from] EmptyInputError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, Error>;
