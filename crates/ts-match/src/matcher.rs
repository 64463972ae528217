//! Chunked matching of one trace.

use std::fmt;
use std::ops::Range;

use log::{debug, warn};

use ts_core::GeoPoint;
use ts_trace::CleanedTrace;

use crate::{MatchConfig, MatchService, MatchedTrip};

/// Index ranges sent to the service for a trace of `len` points.
///
/// A trace of at most `chunk_size` points is one range.  Longer traces are
/// cut into `chunk_size` windows advancing by `chunk_size - overlap`; a
/// trailing window of `overlap` points or fewer is not sent, since the
/// previous window already covers it.
pub fn chunk_ranges(len: usize, chunk_size: usize, overlap: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    if len <= chunk_size {
        return vec![0..len];
    }
    let mut out = Vec::new();
    let mut i = 0;
    while i < len {
        let end = (i + chunk_size).min(len);
        if end - i <= overlap {
            break;
        }
        out.push(i..end);
        i = end - overlap;
    }
    out
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchQuality {
    Good,
    /// Coverage below the threshold.  Still persisted.
    Low,
    /// No chunk matched.
    Failed,
}

impl fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchQuality::Good => "good",
            MatchQuality::Low => "low",
            MatchQuality::Failed => "failed",
        })
    }
}

#[derive(Clone, Debug)]
pub struct MatchOutcome {
    /// Merged successful chunks; `None` when every chunk failed.
    pub trip:          Option<MatchedTrip>,
    /// Decoded points of `trip`.
    pub points:        Vec<GeoPoint>,
    pub chunks_ok:     usize,
    pub chunks_failed: usize,
    /// Matched length over original length (haversine).  Not capped at 1:
    /// see [`coverage`].
    pub coverage:      f64,
    pub quality:       MatchQuality,
}

pub struct MapMatcher<S> {
    service: S,
    config:  MatchConfig,
}

impl<S: MatchService> MapMatcher<S> {
    pub fn new(service: S, config: MatchConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Match `trace` chunk by chunk.  Failed chunks are dropped and the
    /// rest are concatenated in trace order without stitching.
    pub fn match_trace(&self, trace: &CleanedTrace) -> MatchOutcome {
        let pts = trace.points();
        let precision = self.config.shape_precision;
        let mut trips = Vec::new();
        let mut points = Vec::new();
        let mut failed = 0;

        for range in chunk_ranges(pts.len(), self.config.chunk_size, self.config.overlap) {
            let decoded = self
                .service
                .match_shape(&pts[range.clone()])
                .and_then(|trip| Ok((trip.points(precision)?, trip)));
            match decoded {
                Ok((chunk_points, trip)) => {
                    debug!("chunk {}-{}: ok ({} points)", range.start, range.end, chunk_points.len());
                    points.extend(chunk_points);
                    trips.push(trip);
                }
                Err(e) => {
                    warn!("chunk {}-{}: dropped: {e}", range.start, range.end);
                    failed += 1;
                }
            }
        }

        let chunks_ok = trips.len();
        let coverage = coverage(&points, trace.length_m());
        let quality = if chunks_ok == 0 {
            MatchQuality::Failed
        } else if coverage < self.config.quality_threshold {
            MatchQuality::Low
        } else {
            MatchQuality::Good
        };
        MatchOutcome {
            trip: MatchedTrip::merge(trips),
            points,
            chunks_ok,
            chunks_failed: failed,
            coverage,
            quality,
        }
    }
}

/// Length of the concatenated matched points over `original_m`.
///
/// Chunks are concatenated without stitching, so the overlap between
/// consecutive chunks is counted twice, as is the jump back from the end
/// of one leg to the start of the next.  A fully matched multi-chunk trace
/// therefore scores above 1.0; only values below the quality threshold are
/// meaningful.
fn coverage(matched: &[GeoPoint], original_m: f64) -> f64 {
    if original_m <= 0.0 {
        return 0.0;
    }
    let matched_m: f64 = matched.windows(2).map(|w| w[0].distance_m(w[1])).sum();
    matched_m / original_m
}
