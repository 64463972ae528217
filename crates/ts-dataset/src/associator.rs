//! Matched polyline → ordered enriched edges.
//!
//! Each consecutive pair of matched points is snapped to its nearest graph
//! nodes `(u, v)`:
//!
//! - `u == v`: stationary, skipped.
//! - `u`, `v` further apart than `max_pair_distance_m`: unmatched.
//! - otherwise the first enriched parallel edge `u → v`, then `v → u`,
//!   in key order, becomes one row; no such edge is unmatched.
//!
//! Unmatched pairs are a diagnostic, not an error.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use ts_core::{EdgeId, GeoPoint, Measure, NodeId};
use ts_graph::RoadGraph;
use ts_match::MatchedTrip;

use crate::{DatasetResult, DatasetRow, DatasetWriter};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociatorConfig {
    /// Snapped node pairs further apart than this are not a traversal.
    pub max_pair_distance_m: f64,
}

impl Default for AssociatorConfig {
    fn default() -> Self {
        Self { max_pair_distance_m: 200.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssociationReport {
    pub matched:    usize,
    pub unmatched:  usize,
    pub stationary: usize,
}

impl AssociationReport {
    pub fn merge(&mut self, other: &AssociationReport) {
        self.matched += other.matched;
        self.unmatched += other.unmatched;
        self.stationary += other.stationary;
    }

    /// Unmatched share of the non-stationary pairs.
    pub fn failure_rate(&self) -> f64 {
        let pairs = self.matched + self.unmatched;
        if pairs == 0 { 0.0 } else { self.unmatched as f64 / pairs as f64 }
    }
}

impl fmt::Display for AssociationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matched, {} unmatched, {} stationary",
            self.matched, self.unmatched, self.stationary
        )
    }
}

pub struct EdgeAssociator<'g> {
    graph:  &'g RoadGraph,
    config: AssociatorConfig,
}

impl<'g> EdgeAssociator<'g> {
    pub fn new(graph: &'g RoadGraph, config: AssociatorConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &'g RoadGraph {
        self.graph
    }

    /// First enriched edge between `u` and `v`, trying `u → v` first.
    fn enriched_edge(&self, u: NodeId, v: NodeId) -> Option<EdgeId> {
        [(u, v), (v, u)].into_iter().find_map(|(a, b)| {
            self.graph
                .edges_between(a, b)
                .iter()
                .copied()
                .find(|&e| self.graph.edge_attrs(e).is_enriched())
        })
    }

    fn row(&self, edge: EdgeId, trace_file: &str) -> DatasetRow {
        let g = self.graph;
        let key = g.edge_key(edge);
        let attrs = g.edge_attrs(edge);
        let value = |m: Option<Measure>| m.map_or(0.0, Measure::value_or_zero);
        DatasetRow {
            trace_file: trace_file.to_owned(),
            edge_id:    key,
            from_node:  key.from,
            to_node:    key.to,
            distance:   value(attrs.distance),
            dplus:      value(attrs.dplus),
            surface:    g.edge_surface[edge.index()].as_str().to_owned(),
            popularity: value(attrs.popularity),
        }
    }

    /// Rows for one matched polyline, in traversal order.
    pub fn associate(&self, points: &[GeoPoint], trace_file: &str) -> (Vec<DatasetRow>, AssociationReport) {
        let mut rows = Vec::new();
        let mut report = AssociationReport::default();
        let snapped: Vec<Option<NodeId>> = points.iter().map(|&p| self.graph.nearest_node(p, None)).collect();

        for pair in snapped.windows(2) {
            let (Some(u), Some(v)) = (pair[0], pair[1]) else {
                report.unmatched += 1;
                continue;
            };
            if u == v {
                report.stationary += 1;
                continue;
            }
            let close = match (self.graph.node_pos(u), self.graph.node_pos(v)) {
                (Some(a), Some(b)) => a.distance_m(b) < self.config.max_pair_distance_m,
                _ => false,
            };
            match self.enriched_edge(u, v).filter(|_| close) {
                Some(e) => {
                    rows.push(self.row(e, trace_file));
                    report.matched += 1;
                }
                None => {
                    debug!(
                        "{trace_file}: no enriched edge between {} and {}",
                        self.graph.node_osm_id[u.index()],
                        self.graph.node_osm_id[v.index()]
                    );
                    report.unmatched += 1;
                }
            }
        }
        (rows, report)
    }

    /// Rows for a matched-trip file; `trace_file` is its file name.
    pub fn associate_file(&self, path: &Path, precision: u32) -> DatasetResult<(Vec<DatasetRow>, AssociationReport)> {
        let trip = MatchedTrip::load(path)?;
        let points = trip.points(precision)?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Ok(self.associate(&points, &name))
    }
}

/// Associate every `*_matched.json` under `dir`, in name order, and feed
/// the rows to `writer`.  Unreadable files are skipped with a warning.
pub fn associate_directory<W: DatasetWriter + ?Sized>(
    associator: &EdgeAssociator<'_>,
    dir:        &Path,
    precision:  u32,
    writer:     &mut W,
) -> DatasetResult<AssociationReport> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with("_matched.json")))
        .collect();
    files.sort();

    let mut total = AssociationReport::default();
    for path in &files {
        match associator.associate_file(path, precision) {
            Ok((rows, report)) => {
                debug!("{}: {report}", path.display());
                writer.write_rows(&rows)?;
                total.merge(&report);
            }
            Err(e) => warn!("{}: skipped: {e}", path.display()),
        }
    }
    writer.finish()?;
    info!(
        "associated {} traces: {total} ({:.1}% unmatched)",
        files.len(),
        total.failure_rate() * 100.0
    );
    Ok(total)
}
