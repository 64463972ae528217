//! Edge length.

use ts_core::{EdgeId, Measure};
use ts_graph::RoadGraph;

/// Geodesic length of `edge`'s geometry, falling back to the straight
/// segment between its endpoints.  `Unknown` when the edge has neither a
/// geometry nor located endpoints.
pub fn edge_distance(graph: &RoadGraph, edge: EdgeId) -> Measure {
    match graph.edge_geometry(edge) {
        Some(line) => Measure::Known(ts_core::path_length_m(&line)),
        None => Measure::Unknown,
    }
}
