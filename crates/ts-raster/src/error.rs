//! Raster loading errors.  Sampling itself is infallible.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("malformed raster header: {0}")]
    Header(String),

    #[error("raster body has {got} cells, header declares {expected}")]
    CellCount { expected: usize, got: usize },

    #[error("invalid cell value {0:?}")]
    Cell(String),

    #[error("no raster tiles found in {0}")]
    NoTiles(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RasterResult<T> = Result<T, RasterError>;
