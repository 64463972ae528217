//! Acceptance rules applied to cleaned traces.
//!
//! Rules are checked in order and the first failing one is reported:
//!
//! | Verdict            | Rule                                               |
//! |--------------------|----------------------------------------------------|
//! | `TooFewRawPoints`  | raw fix count < `min_points`                       |
//! | `TooFewPoints`     | cleaned point count < `min_points`                 |
//! | `TooManyPoints`    | cleaned point count > `max_points`                 |
//! | `OutsideBounds`    | any cleaned point outside `bbox` (when set)        |
//! | `TooShort`         | haversine length < `min_distance_m`                |
//! | `Duplicate`        | same rounded coordinates as an accepted trace      |

use std::fmt;
use std::hash::Hasher;

use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};

use ts_core::BoundingBox;

use crate::CleanedTrace;

/// Verdict on one trace.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceVerdict {
    Accept,
    TooFewRawPoints(usize),
    TooFewPoints(usize),
    TooManyPoints(usize),
    OutsideBounds,
    TooShort { length_m: f64 },
    Duplicate,
}

impl TraceVerdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, TraceVerdict::Accept)
    }
}

impl fmt::Display for TraceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceVerdict::Accept             => f.write_str("accepted"),
            TraceVerdict::TooFewRawPoints(n) => write!(f, "too few raw points ({n})"),
            TraceVerdict::TooFewPoints(n)    => write!(f, "too few cleaned points ({n})"),
            TraceVerdict::TooManyPoints(n)   => write!(f, "too many points after interpolation ({n})"),
            TraceVerdict::OutsideBounds      => f.write_str("outside bounding box"),
            TraceVerdict::TooShort { length_m } => {
                write!(f, "too short ({:.2} km)", length_m / 1000.0)
            }
            TraceVerdict::Duplicate          => f.write_str("duplicate"),
        }
    }
}

/// Trace acceptance rules plus the set of accepted trace fingerprints.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceFilter {
    pub min_points:      usize,
    pub max_points:      usize,
    pub min_distance_m:  f64,
    /// Every point must lie inside this box.  Unchecked when `None`.
    pub bbox:            Option<BoundingBox>,
    /// Decimal places kept when fingerprinting for duplicate detection.
    pub dedup_precision: i32,

    #[serde(skip)]
    pub(crate) seen: FxHashSet<u64>,
}

impl Default for TraceFilter {
    fn default() -> Self {
        Self {
            min_points:      10,
            max_points:      3000,
            min_distance_m:  10_000.0,
            bbox:            None,
            dedup_precision: 5,
            seen:            FxHashSet::default(),
        }
    }
}

impl TraceFilter {
    /// Judge `cleaned`, cleaned from `raw_points` fixes.  An accepted
    /// trace's fingerprint is remembered so a later identical trace is
    /// reported as [`TraceVerdict::Duplicate`].
    pub fn check(&mut self, raw_points: usize, cleaned: &CleanedTrace) -> TraceVerdict {
        if raw_points < self.min_points {
            return TraceVerdict::TooFewRawPoints(raw_points);
        }
        if cleaned.len() < self.min_points {
            return TraceVerdict::TooFewPoints(cleaned.len());
        }
        if cleaned.len() > self.max_points {
            return TraceVerdict::TooManyPoints(cleaned.len());
        }
        if let Some(bbox) = &self.bbox {
            if !cleaned.points().iter().all(|&p| bbox.contains(p)) {
                return TraceVerdict::OutsideBounds;
            }
        }
        let length_m = cleaned.length_m();
        if length_m < self.min_distance_m {
            return TraceVerdict::TooShort { length_m };
        }
        if !self.seen.insert(self.fingerprint(cleaned)) {
            return TraceVerdict::Duplicate;
        }
        TraceVerdict::Accept
    }

    /// Number of distinct traces accepted so far.
    pub fn accepted(&self) -> usize {
        self.seen.len()
    }

    fn fingerprint(&self, trace: &CleanedTrace) -> u64 {
        let scale = 10f64.powi(self.dedup_precision);
        let mut h = FxHasher::default();
        for p in trace.points() {
            h.write_i64((p.lat * scale).round() as i64);
            h.write_i64((p.lon * scale).round() as i64);
        }
        h.finish()
    }
}
