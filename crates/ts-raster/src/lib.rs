//! `ts-raster`: point sampling over georeferenced scalar grids.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`raster`] | `Raster`, `GeoTransform`, `Sampler` trait                  |
//! | [`mosaic`] | `RasterMosaic`, ordered tile set answering as one raster  |
//! | [`ascii`]  | ESRI ASCII grid (`.asc`) reader                            |
//! | [`error`]  | `RasterError`, `RasterResult<T>`                           |
//!
//! # Sampling contract
//!
//! [`Sampler::value_at`] never fails: a point outside the grid, a cell
//! holding the nodata value, or a non-finite cell all read as `0.0`.
//! [`Sampler::sample`] exposes the same lookup as an `Option` for callers
//! that need to tell a miss from a real zero.  Only loading can error.

pub mod ascii;
pub mod error;
pub mod mosaic;
pub mod raster;


pub use error::{RasterError, RasterResult};
pub use mosaic::RasterMosaic;
pub use raster::{GeoTransform, Raster, Sampler};
