//! Pipeline configuration file.
//!
//! Every section is optional; missing sections and fields take their
//! defaults.
//!
//! ```json
//! {
//!   "enrich":     { "dem_crs": "EPSG:2154", "popularity_samples": 5 },
//!   "cleaner":    { "max_speed_kmh": 59 },
//!   "filter":     { "min_distance_m": 10000, "bbox": { "min_lat": 48.0, "min_lon": 2.0, "max_lat": 49.0, "max_lon": 3.0 } },
//!   "matching":   { "url": "http://localhost:8002/trace_route", "request_delay_ms": 1000 },
//!   "associator": { "max_pair_distance_m": 200 }
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ts_dataset::AssociatorConfig;
use ts_enrich::EnrichConfig;
use ts_match::MatchConfig;
use ts_trace::{CleanerConfig, TraceFilter};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub enrich:     EnrichConfig,
    pub cleaner:    CleanerConfig,
    pub filter:     TraceFilter,
    pub matching:   MatchConfig,
    pub associator: AssociatorConfig,
}

impl PipelineConfig {
    /// Load from `path`, or defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {}", path.display()))
    }
}
