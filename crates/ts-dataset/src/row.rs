//! Plain data row types written by dataset backends.

use ts_core::EdgeKey;

/// One traversal of one enriched edge by one matched trace.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub trace_file: String,
    pub edge_id:    EdgeKey,
    /// OSM id of the edge's source node.
    pub from_node:  i64,
    pub to_node:    i64,
    /// Metres.
    pub distance:   f64,
    /// Metres of positive elevation gain.
    pub dplus:      f64,
    pub surface:    String,
    /// Heatmap intensity; 0.0 when unknown.
    pub popularity: f64,
}

/// Derived model features for one `DatasetRow`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFeatures {
    /// `dplus / (distance + 1e-6)`.
    pub slope:        f64,
    /// `ln(1 + distance)`.
    pub log_distance: f64,
    pub is_asphalt:   bool,
}

impl EdgeFeatures {
    pub fn from_row(row: &DatasetRow) -> Self {
        Self {
            slope:        row.dplus / (row.distance + 1e-6),
            log_distance: row.distance.ln_1p(),
            is_asphalt:   row.surface == "asphalt",
        }
    }
}
