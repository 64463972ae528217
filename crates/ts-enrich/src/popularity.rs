//! Heatmap popularity.
//!
//! The heatmap is sampled at `n` evenly spaced normalized positions along
//! the geometry (`t = 0, 1/(n-1), …, 1`; five samples by default).  Only
//! positive samples are averaged.

use ts_core::{interpolate_normalized, GeoPoint, Measure, Projection};
use ts_raster::Sampler;

/// Popularity of `line` plus the number of missed samples.
///
/// - some sample > 0: `Known(mean of positive samples)`
/// - samples read, none positive: `Known(0.0)`
/// - every sample missed: `Unknown`
pub fn edge_popularity<S>(
    line:       &[GeoPoint],
    heatmap:    &S,
    projection: &Projection,
    samples:    usize,
) -> (Measure, usize)
where
    S: Sampler + ?Sized,
{
    let positions: Vec<f64> = match samples {
        0 => Vec::new(),
        1 => vec![0.5],
        n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    };

    let mut misses = 0;
    let mut hits = 0;
    let mut sum = 0.0;
    let mut positive = 0;
    for t in positions {
        let Some(p) = interpolate_normalized(line, t) else {
            misses += 1;
            continue;
        };
        match projection.forward(p).and_then(|(x, y)| heatmap.sample(x, y)) {
            Some(v) => {
                hits += 1;
                if v > 0.0 {
                    sum += v;
                    positive += 1;
                }
            }
            None => misses += 1,
        }
    }

    let value = match (hits, positive) {
        (0, _) => Measure::Unknown,
        (_, 0) => Measure::Known(0.0),
        (_, n) => Measure::Known(sum / n as f64),
    };
    (value, misses)
}
