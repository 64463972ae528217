//! Geographic coordinate type and distance/interpolation primitives.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Traces are cleaned with 2 m
//! spacing thresholds, so single precision (~1 m at the equator) would eat
//! the whole tolerance.
//!
//! Two distance flavours are provided:
//!
//! - [`GeoPoint::distance_m`]: spherical haversine, cheap; used for speed
//!   checks, gap detection and snap thresholds.
//! - [`GeoPoint::geodesic_m`]: ellipsoidal (WGS-84, Karney) via `geo`; used
//!   wherever a length is persisted as an edge attribute.

use ::geo::{Distance, Geodesic, Point};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Ellipsoidal distance on WGS-84 in metres.
    pub fn geodesic_m(self, other: GeoPoint) -> f64 {
        Geodesic::distance(self.to_point(), other.to_point())
    }

    /// Linear interpolation in degree space.  `frac = 0` is `self`,
    /// `frac = 1` is `other`.
    #[inline]
    pub fn lerp(self, other: GeoPoint, frac: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + frac * (other.lat - self.lat),
            lon: self.lon + frac * (other.lon - self.lon),
        }
    }

    /// Planar distance in degrees.  Only meaningful for ordering and for
    /// normalized interpolation along a line.
    #[inline]
    pub fn planar_deg(self, other: GeoPoint) -> f64 {
        (self.lat - other.lat).hypot(self.lon - other.lon)
    }

    /// `true` when both components are finite and inside the WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }

    /// `geo` points are `(x = lon, y = lat)`.
    #[inline]
    fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon box, inclusive on all sides.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self { min_lat, min_lon, max_lat, max_lon }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }
}

// ── Polyline helpers ──────────────────────────────────────────────────────────

/// Geodesic length of a polyline in metres.  Fewer than two points → 0.
pub fn path_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].geodesic_m(w[1])).sum()
}

/// Point at normalized position `t ∈ [0, 1]` along `points`, measured in
/// planar degree space.
///
/// Returns `None` for an empty line.  A zero-length line yields its first
/// vertex for every `t`.
pub fn interpolate_normalized(points: &[GeoPoint], t: f64) -> Option<GeoPoint> {
    let first = *points.first()?;
    let total: f64 = points.windows(2).map(|w| w[0].planar_deg(w[1])).sum();
    if total <= 0.0 {
        return Some(first);
    }

    let target = t.clamp(0.0, 1.0) * total;
    let mut walked = 0.0;
    for w in points.windows(2) {
        let seg = w[0].planar_deg(w[1]);
        if seg > 0.0 && walked + seg >= target {
            return Some(w[0].lerp(w[1], (target - walked) / seg));
        }
        walked += seg;
    }
    points.last().copied()
}

/// Points strictly between `a` and `b`, evenly spaced so that no gap
/// exceeds `step_m`.  Empty when `a` and `b` are already within `step_m`.
pub fn densify(a: GeoPoint, b: GeoPoint, step_m: f64) -> Vec<GeoPoint> {
    let dist = a.distance_m(b);
    if step_m <= 0.0 || dist <= step_m {
        return Vec::new();
    }
    let n = (dist / step_m).floor() as usize + 1;
    (1..n).map(|i| a.lerp(b, i as f64 / n as f64)).collect()
}
