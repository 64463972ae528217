//! Per-pass counters.

use std::fmt;

use ts_graph::EdgeAttr;

/// Aggregate outcome of one enrichment pass, logged when the pass ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassReport {
    pub attr:          EdgeAttr,
    /// Edges the pass wrote.
    pub edges:         usize,
    /// Edges computed from a geometry.
    pub with_geometry: usize,
    /// Edges that fell back to the no-geometry rule.
    pub no_geometry:   usize,
    /// Edges left `Unknown`.
    pub unknown:       usize,
    /// Raster samples that missed (outside the grid or nodata).
    pub sample_misses: usize,
}

impl PassReport {
    pub(crate) fn new(attr: EdgeAttr) -> Self {
        Self { attr, edges: 0, with_geometry: 0, no_geometry: 0, unknown: 0, sample_misses: 0 }
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} edges ({} with geometry, {} without, {} unknown, {} sample misses)",
            self.attr, self.edges, self.with_geometry, self.no_geometry, self.unknown, self.sample_misses,
        )
    }
}
