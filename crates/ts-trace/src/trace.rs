//! Trace value types.

use ts_core::{path_length_m, GeoPoint};

/// One GPS fix as read from a source trace.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawTracePoint {
    pub pos:  GeoPoint,
    /// Unix time in seconds, when the device recorded one.
    pub time: Option<f64>,
}

impl RawTracePoint {
    pub fn new(lat: f64, lon: f64, time: Option<f64>) -> Self {
        Self { pos: GeoPoint::new(lat, lon), time }
    }
}

/// Ordered, timestamp-free coordinates produced by `TraceCleaner`.
///
/// Consecutive points are never closer than the cleaner's minimum
/// spacing.  Not mutated after cleaning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CleanedTrace {
    points: Vec<GeoPoint>,
}

impl CleanedTrace {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Haversine length in metres.
    pub fn length_m(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
    }

    /// Ellipsoidal length in metres.
    pub fn geodesic_length_m(&self) -> f64 {
        path_length_m(&self.points)
    }

    /// View as raw points without timestamps, e.g. to clean it again.
    pub fn to_raw(&self) -> Vec<RawTracePoint> {
        self.points.iter().map(|&pos| RawTracePoint { pos, time: None }).collect()
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }
}
