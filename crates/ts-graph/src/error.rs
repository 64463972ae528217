//! Graph-subsystem error type.

use thiserror::Error;

use ts_core::{EdgeKey, NodeId};

/// Errors produced by `ts-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("edge references unknown node {0}")]
    UnknownNode(i64),

    #[error("duplicate edge {0}")]
    DuplicateEdge(EdgeKey),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
