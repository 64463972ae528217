//! Cumulative elevation gain (D+).

use ts_core::{GeoPoint, Projection};
use ts_raster::Sampler;

/// D+ along `line`: vertices are projected into the DEM's CRS and sampled;
/// a miss (off the raster, or outside the CRS's domain) reads as elevation 0.  Only positive deltas between consecutive
/// vertices count.
///
/// Returns `(dplus, misses)`, with `dplus` rounded to centimetres.
pub fn edge_dplus<S>(line: &[GeoPoint], dem: &S, projection: &Projection) -> (f64, usize)
where
    S: Sampler + ?Sized,
{
    let mut misses = 0;
    let elevations: Vec<f64> = line
        .iter()
        .map(|&p| {
            projection.forward(p).and_then(|(x, y)| dem.sample(x, y)).unwrap_or_else(|| {
                misses += 1;
                0.0
            })
        })
        .collect();
    (round_cm(positive_gain(&elevations)), misses)
}

/// Σ max(0, e[i+1] − e[i]).
pub fn positive_gain(elevations: &[f64]) -> f64 {
    elevations.windows(2).map(|w| (w[1] - w[0]).max(0.0)).sum()
}

#[inline]
fn round_cm(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
