//! Map-matching error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response has no trip")]
    NoTrip,

    #[error("polyline error: {0}")]
    Polyline(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Trace(#[from] ts_trace::TraceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MatchResult<T> = Result<T, MatchError>;
