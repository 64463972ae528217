//! Trace-subsystem error type.
//!
//! Only I/O and parse failures are errors.  Dropped points and rejected
//! traces are reported through `CleanReport` and `TraceVerdict`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TraceResult<T> = Result<T, TraceError>;
