//! Single-band grid with an affine north-up transform.

use crate::{RasterError, RasterResult};

// ── GeoTransform ──────────────────────────────────────────────────────────────

/// North-up affine transform from grid indices to raster CRS coordinates.
///
/// Cell `(row, col)` covers
/// `x ∈ [origin_x + col·pixel_width, origin_x + (col+1)·pixel_width)` and the
/// analogous y-range with `pixel_height` (negative for north-up grids, so
/// row 0 is the top edge).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoTransform {
    pub origin_x:     f64,
    pub origin_y:     f64,
    pub pixel_width:  f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Transform for a grid whose outer edges are the given bounds.
    pub fn from_bounds(left: f64, bottom: f64, right: f64, top: f64, width: usize, height: usize) -> Self {
        Self {
            origin_x:     left,
            origin_y:     top,
            pixel_width:  (right - left) / width as f64,
            pixel_height: -(top - bottom) / height as f64,
        }
    }

    /// Grid indices of the cell containing `(x, y)`.  May be negative or
    /// past the grid; callers bounds-check.
    #[inline]
    pub fn rowcol(&self, x: f64, y: f64) -> (i64, i64) {
        let col = ((x - self.origin_x) / self.pixel_width).floor() as i64;
        let row = ((y - self.origin_y) / self.pixel_height).floor() as i64;
        (row, col)
    }
}

// ── Sampler ───────────────────────────────────────────────────────────────────

/// Point-value lookup over a raster-like source.
///
/// Implementations must be cheap to share across threads; enrichment may
/// sample from Rayon workers.
pub trait Sampler: Send + Sync {
    /// Cell value at `(x, y)` in the source's CRS, or `None` when the point
    /// is outside the grid or the cell holds no data.
    fn sample(&self, x: f64, y: f64) -> Option<f64>;

    /// Like [`sample`](Self::sample), with every miss read as `0.0`.
    #[inline]
    fn value_at(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y).unwrap_or(0.0)
    }
}

// ── Raster ────────────────────────────────────────────────────────────────────

/// Row-major single-band grid.
#[derive(Clone, Debug)]
pub struct Raster {
    width:     usize,
    height:    usize,
    data:      Vec<f32>,
    transform: GeoTransform,
    nodata:    Option<f64>,
}

impl Raster {
    /// Wrap a row-major cell buffer.  `data.len()` must equal
    /// `width * height`.
    pub fn from_grid(
        width:     usize,
        height:    usize,
        data:      Vec<f32>,
        transform: GeoTransform,
        nodata:    Option<f64>,
    ) -> RasterResult<Self> {
        if data.len() != width * height {
            return Err(RasterError::CellCount { expected: width * height, got: data.len() });
        }
        Ok(Self { width, height, data, transform, nodata })
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn nodata(&self) -> Option<f64> { self.nodata }
    pub fn transform(&self) -> &GeoTransform { &self.transform }

    /// Outer extent as `(left, bottom, right, top)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let t = &self.transform;
        let x0 = t.origin_x;
        let x1 = t.origin_x + t.pixel_width * self.width as f64;
        let y0 = t.origin_y;
        let y1 = t.origin_y + t.pixel_height * self.height as f64;
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// Raw cell value, `None` when `(row, col)` is outside the grid.
    #[inline]
    pub fn cell(&self, row: i64, col: i64) -> Option<f32> {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return None;
        }
        self.data.get(row as usize * self.width + col as usize).copied()
    }
}

impl Sampler for Raster {
    fn sample(&self, x: f64, y: f64) -> Option<f64> {
        let (left, bottom, right, top) = self.bounds();
        if !(left..=right).contains(&x) || !(bottom..=top).contains(&y) {
            return None;
        }
        // Points on the right/bottom edge fall one cell past the grid and
        // are rejected by `cell`.
        let (row, col) = self.transform.rowcol(x, y);
        let value = f64::from(self.cell(row, col)?);
        if !value.is_finite() || self.nodata.is_some_and(|nd| value == nd) {
            return None;
        }
        Some(value)
    }
}
