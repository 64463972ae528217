//! A set of raster tiles that answers lookups as one raster.
//!
//! National elevation products ship as many adjacent tiles.  A lookup is
//! served by the first tile (in load order) holding data at the point, so
//! overlapping tiles resolve deterministically.

use std::path::Path;

use log::info;

use crate::{Raster, RasterError, RasterResult, Sampler};

#[derive(Clone, Debug, Default)]
pub struct RasterMosaic {
    tiles: Vec<Raster>,
}

impl RasterMosaic {
    pub fn new(tiles: Vec<Raster>) -> Self {
        Self { tiles }
    }

    pub fn push(&mut self, tile: Raster) {
        self.tiles.push(tile);
    }

    pub fn tiles(&self) -> &[Raster] {
        &self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Load every `.asc` file in `dir`, in file-name order.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable tile, and with
    /// [`RasterError::NoTiles`] when the directory holds none.
    pub fn open_dir(dir: impl AsRef<Path>) -> RasterResult<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_asc = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("asc"));
            if is_asc {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(RasterError::NoTiles(dir.to_path_buf()));
        }
        paths.sort();

        let tiles = paths.iter().map(Raster::open).collect::<RasterResult<Vec<_>>>()?;
        info!("loaded {} raster tiles from {}", tiles.len(), dir.display());
        Ok(Self::new(tiles))
    }

    /// Open `path` as a single tile or, if it is a directory, as a mosaic.
    pub fn open(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::open_dir(path)
        } else {
            Ok(Self::new(vec![Raster::open(path)?]))
        }
    }
}

impl Sampler for RasterMosaic {
    fn sample(&self, x: f64, y: f64) -> Option<f64> {
        self.tiles.iter().find_map(|t| t.sample(x, y))
    }
}
