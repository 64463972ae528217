//! The matching-service seam.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::Serialize;

use ts_core::GeoPoint;

use crate::{MatchConfig, MatchError, MatchResult, MatchedTrip};

/// Matches one shape (a chunk of a trace) onto the road network.
pub trait MatchService {
    fn match_shape(&self, shape: &[GeoPoint]) -> MatchResult<MatchedTrip>;
}

impl<S: MatchService + ?Sized> MatchService for &S {
    fn match_shape(&self, shape: &[GeoPoint]) -> MatchResult<MatchedTrip> {
        (**self).match_shape(shape)
    }
}

// ── Valhalla ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
struct TraceOptions {
    interpolation_distance: f64,
}

#[derive(Serialize)]
struct TraceRouteRequest<'a> {
    shape:         Vec<LatLon>,
    costing:       &'a str,
    shape_match:   &'static str,
    trace_options: TraceOptions,
}

/// Blocking client for Valhalla's `trace_route` endpoint in `map_snap` mode.
pub struct ValhallaService {
    client:                 Client,
    url:                    String,
    costing:                String,
    interpolation_distance: f64,
}

impl ValhallaService {
    pub fn new(config: &MatchConfig) -> MatchResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            costing: config.costing.clone(),
            interpolation_distance: config.interpolation_distance,
        })
    }
}

impl MatchService for ValhallaService {
    fn match_shape(&self, shape: &[GeoPoint]) -> MatchResult<MatchedTrip> {
        let body = TraceRouteRequest {
            shape:         shape.iter().map(|p| LatLon { lat: p.lat, lon: p.lon }).collect(),
            costing:       &self.costing,
            shape_match:   "map_snap",
            trace_options: TraceOptions { interpolation_distance: self.interpolation_distance },
        };
        debug!("POST {} ({} points)", self.url, shape.len());
        let resp = self.client.post(&self.url).json(&body).send()?;
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(MatchError::Status { status: status.as_u16(), body: text });
        }
        let value: serde_json::Value = serde_json::from_str(&text)?;
        if value.get("trip").is_none() {
            return Err(MatchError::NoTrip);
        }
        Ok(serde_json::from_value(value)?)
    }
}
