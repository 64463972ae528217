//! Matched-trip model: the subset of a `trace_route` response the pipeline
//! keeps, and the on-disk `<trace>_matched.json` format.
//!
//! ```json
//! { "trip": { "legs": [ { "shape": "<polyline6>" }, { "shape": [[48.1, 2.3], ...] } ] } }
//! ```
//!
//! A leg's shape is either an encoded polyline or a literal list of points,
//! each `{"lat", "lon"}` or `[lat, lon]`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ts_core::GeoPoint;

use crate::{MatchError, MatchResult};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedTrip {
    pub trip: Trip,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub shape: Shape,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shape {
    Encoded(String),
    Points(Vec<ShapePoint>),
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Encoded(String::new())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapePoint {
    Object { lat: f64, lon: f64 },
    Pair([f64; 2]),
}

impl From<ShapePoint> for GeoPoint {
    fn from(p: ShapePoint) -> Self {
        match p {
            ShapePoint::Object { lat, lon } => GeoPoint::new(lat, lon),
            ShapePoint::Pair([lat, lon]) => GeoPoint::new(lat, lon),
        }
    }
}

impl Leg {
    /// Decoded shape; `precision` applies to encoded shapes only.
    pub fn points(&self, precision: u32) -> MatchResult<Vec<GeoPoint>> {
        match &self.shape {
            Shape::Encoded(s) if s.is_empty() => Ok(Vec::new()),
            Shape::Encoded(s) => decode_shape(s, precision),
            Shape::Points(pts) => Ok(pts.iter().map(|&p| p.into()).collect()),
        }
    }
}

impl MatchedTrip {
    /// A one-leg trip with `points` encoded at `precision`.
    pub fn from_points(points: &[GeoPoint], precision: u32) -> MatchResult<Self> {
        let shape = Shape::Encoded(encode_shape(points, precision)?);
        Ok(Self { trip: Trip { legs: vec![Leg { shape }] } })
    }

    /// All legs' points, concatenated in leg order.
    pub fn points(&self, precision: u32) -> MatchResult<Vec<GeoPoint>> {
        let mut out = Vec::new();
        for leg in &self.trip.legs {
            out.extend(leg.points(precision)?);
        }
        Ok(out)
    }

    /// Concatenate the legs of `trips` in order.  `None` when there is
    /// nothing to merge.
    pub fn merge(trips: impl IntoIterator<Item = MatchedTrip>) -> Option<MatchedTrip> {
        let mut merged: Option<MatchedTrip> = None;
        for t in trips {
            match merged.as_mut() {
                Some(m) => m.trip.legs.extend(t.trip.legs),
                None => merged = Some(t),
            }
        }
        merged
    }

    pub fn from_reader<R: Read>(reader: R) -> MatchResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> MatchResult<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> MatchResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Write to `<path>.tmp`, then rename over `path`.  A crash mid-write
    /// leaves only the temporary file behind, never a truncated `path`.
    pub fn save(&self, path: &Path) -> MatchResult<()> {
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            self.to_writer(&mut w)?;
            w.flush()?;
            w.get_ref().sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Encode as a polyline at `precision` decimal digits.
pub fn encode_shape(points: &[GeoPoint], precision: u32) -> MatchResult<String> {
    polyline::encode_coordinates(points.iter().map(|p| geo::Coord { x: p.lon, y: p.lat }), precision)
        .map_err(|e| MatchError::Polyline(e.to_string()))
}

pub fn decode_shape(encoded: &str, precision: u32) -> MatchResult<Vec<GeoPoint>> {
    let line = polyline::decode_polyline(encoded, precision).map_err(|e| MatchError::Polyline(e.to_string()))?;
    Ok(line.0.into_iter().map(|c| GeoPoint::new(c.y, c.x)).collect())
}
