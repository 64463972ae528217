//! Map-matching configuration.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// `trace_route` endpoint of the matching service.
    pub url:                    String,
    pub costing:                String,
    /// Traces of at most this many points are sent whole.
    pub chunk_size:             usize,
    /// Points shared by adjacent chunks.
    pub overlap:                usize,
    /// Metres; forwarded as `trace_options.interpolation_distance`.
    pub interpolation_distance: f64,
    /// Coverage at or above this is a good match.
    pub quality_threshold:      f64,
    /// Sleep after each trace.
    pub request_delay_ms:       u64,
    /// Traces per batch group.
    pub batch_size:             usize,
    /// Sleep between batch groups, e.g. to let the service restart.
    pub batch_pause_ms:         u64,
    pub timeout_secs:           u64,
    /// Precision of encoded shapes in responses.
    pub shape_precision:        u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            url:                    "http://localhost:8002/trace_route".into(),
            costing:                "bicycle".into(),
            chunk_size:             400,
            overlap:                50,
            interpolation_distance: 10.0,
            quality_threshold:      0.7,
            request_delay_ms:       1000,
            batch_size:             100,
            batch_pause_ms:         0,
            timeout_secs:           60,
            shape_precision:        6,
        }
    }
}
