//! Forward reprojection from WGS-84 to a raster's CRS.
//!
//! Query points are WGS-84 `(lat, lon)`; rasters may be georeferenced in any
//! CRS PROJ knows (Lambert-93 for the elevation model by default).  Only the
//! forward direction is needed.
//!
//! `proj::Proj` is not `Sync`, so each thread keeps its own transform per CRS
//! code.  `Projection` itself only carries the code and is cheap to share
//! across the Rayon workers of an enrichment pass.

use std::cell::RefCell;

use proj::Proj;
use rustc_hash::FxHashMap;

use crate::{CoreError, CoreResult, GeoPoint};

const WGS84: &str = "EPSG:4326";

thread_local! {
    static TRANSFORMS: RefCell<FxHashMap<String, Proj>> = RefCell::new(FxHashMap::default());
}

/// Coordinate system a raster is georeferenced in.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Projection {
    /// EPSG:4326; raster axes are `(lon, lat)`.
    #[default]
    Geographic,
    /// Any other CRS, as a PROJ-resolvable code such as `"EPSG:2154"`.
    Crs(String),
}

impl Projection {
    /// Resolve a CRS code such as `"EPSG:2154"` or `"EPSG:3035"`.
    ///
    /// # Errors
    ///
    /// `CoreError::UnsupportedCrs` when PROJ cannot build a transform from
    /// WGS-84 to `code`.
    pub fn from_crs(code: &str) -> CoreResult<Self> {
        let code = code.trim();
        if matches!(code.to_ascii_uppercase().as_str(), "EPSG:4326" | "WGS84") {
            return Ok(Projection::Geographic);
        }
        with_transform(code, |_| ())?;
        Ok(Projection::Crs(code.to_owned()))
    }

    /// Project `p` into raster axis order `(x, y)`.
    ///
    /// `None` when the point lies outside the CRS's domain or the transform
    /// fails; callers count that as a sample miss.
    pub fn forward(&self, p: GeoPoint) -> Option<(f64, f64)> {
        match self {
            Projection::Geographic => Some((p.lon, p.lat)),
            Projection::Crs(code) => with_transform(code, |proj| proj.convert((p.lon, p.lat)).ok())
                .ok()
                .flatten()
                .filter(|(x, y)| x.is_finite() && y.is_finite()),
        }
    }
}

/// Run `f` with this thread's WGS-84 → `code` transform, creating it on
/// first use.
fn with_transform<T>(code: &str, f: impl FnOnce(&Proj) -> T) -> CoreResult<T> {
    TRANSFORMS.with(|cell| {
        let mut cache = cell.borrow_mut();
        if let Some(proj) = cache.get(code) {
            return Ok(f(proj));
        }
        let proj = Proj::new_known_crs(WGS84, code, None)
            .map_err(|e| CoreError::UnsupportedCrs(format!("{code}: {e}")))?;
        Ok(f(cache.entry(code.to_owned()).or_insert(proj)))
    })
}
