//! Enrichment error type.  Only setup can fail; passes themselves never do.

use thiserror::Error;

use ts_core::CoreError;
use ts_raster::RasterError;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("cannot load raster: {0}")]
    Raster(#[from] RasterError),
}

pub type EnrichResult<T> = Result<T, EnrichError>;
