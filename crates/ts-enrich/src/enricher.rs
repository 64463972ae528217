//! Pass orchestration.

use log::info;
use serde::{Deserialize, Serialize};

use ts_core::{EdgeId, GeoPoint, Measure, Projection};
use ts_graph::{EdgeAttr, RoadGraph};
use ts_raster::Sampler;

use crate::distance::edge_distance;
use crate::elevation::edge_dplus;
use crate::popularity::edge_popularity;
use crate::{EnrichResult, PassReport};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// CRS of the elevation model, e.g. `"EPSG:2154"`.
    pub dem_crs:                String,
    /// CRS of the popularity heatmap.
    pub heatmap_crs:            String,
    /// Heatmap samples per edge, evenly spaced along the geometry.
    pub popularity_samples:     usize,
    /// Treat edges without stored geometry as the straight segment between
    /// their endpoints in the elevation and popularity passes.
    pub straight_line_fallback: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            dem_crs:                "EPSG:2154".into(),
            heatmap_crs:            "EPSG:4326".into(),
            popularity_samples:     5,
            straight_line_fallback: false,
        }
    }
}

// ── EdgeEnricher ──────────────────────────────────────────────────────────────

/// Runs the elevation, distance, and popularity passes over a graph.
///
/// The passes write disjoint attributes and can run in any order.
///
/// | Pass       | Edge with geometry                 | Edge without geometry          |
/// |------------|------------------------------------|--------------------------------|
/// | elevation  | `dplus` = Σ positive DEM deltas    | `dplus` = 0, straight `distance` |
/// | distance   | geodesic length of the geometry    | straight-line length           |
/// | popularity | mean positive heatmap sample       | `Unknown` (reads as 0.0)       |
///
/// `distance` is `Unknown` when an edge has no geometry and an endpoint
/// has no coordinates.
pub struct EdgeEnricher {
    config:  EnrichConfig,
    dem:     Projection,
    heatmap: Projection,
}

impl EdgeEnricher {
    /// # Errors
    ///
    /// A CRS code in `config` that PROJ cannot resolve.
    pub fn new(config: EnrichConfig) -> EnrichResult<Self> {
        let dem = Projection::from_crs(&config.dem_crs)?;
        let heatmap = Projection::from_crs(&config.heatmap_crs)?;
        Ok(Self { config, dem, heatmap })
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// Geometry the elevation and popularity passes work on.
    fn sampling_line<'g>(&self, graph: &'g RoadGraph, edge: EdgeId) -> Option<std::borrow::Cow<'g, [GeoPoint]>> {
        if self.config.straight_line_fallback {
            graph.edge_geometry(edge)
        } else {
            graph.stored_geometry(edge).map(std::borrow::Cow::Borrowed)
        }
    }

    /// Elevation pass: writes `dplus` for every edge, and `distance` for
    /// edges without geometry.
    pub fn elevation_pass<S>(&self, graph: &mut RoadGraph, dem: &S) -> PassReport
    where
        S: Sampler + ?Sized,
    {
        info!("elevation pass over {} edges", graph.edge_count());
        let results = map_edges(graph, |e| match self.sampling_line(graph, e) {
            Some(line) => {
                let (dplus, misses) = edge_dplus(&line, dem, &self.dem);
                (Measure::Known(dplus), None, misses)
            }
            None => (Measure::Known(0.0), Some(edge_distance(graph, e)), 0),
        });

        let mut report = PassReport::new(EdgeAttr::Dplus);
        let mut column = Vec::with_capacity(results.len());
        let attrs = graph.attrs_mut();
        for (i, (dplus, straight, misses)) in results.into_iter().enumerate() {
            report.edges += 1;
            report.sample_misses += misses;
            match straight {
                Some(distance) => {
                    report.no_geometry += 1;
                    if !distance.is_known() {
                        report.unknown += 1;
                    }
                    attrs.set(EdgeId(i as u32), EdgeAttr::Distance, distance);
                }
                None => report.with_geometry += 1,
            }
            column.push(dplus);
        }
        attrs.apply(EdgeAttr::Dplus, column);
        info!("{report}");
        report
    }

    /// Distance pass: writes `distance` for every edge.
    pub fn distance_pass(&self, graph: &mut RoadGraph) -> PassReport {
        info!("distance pass over {} edges", graph.edge_count());
        let column = map_edges(graph, |e| edge_distance(graph, e));

        let mut report = PassReport::new(EdgeAttr::Distance);
        for (i, m) in column.iter().enumerate() {
            report.edges += 1;
            if graph.stored_geometry(EdgeId(i as u32)).is_some() {
                report.with_geometry += 1;
            } else {
                report.no_geometry += 1;
            }
            if !m.is_known() {
                report.unknown += 1;
            }
        }
        graph.attrs_mut().apply(EdgeAttr::Distance, column);
        info!("{report}");
        report
    }

    /// Popularity pass: writes `popularity` for every edge.
    pub fn popularity_pass<S>(&self, graph: &mut RoadGraph, heatmap: &S) -> PassReport
    where
        S: Sampler + ?Sized,
    {
        info!("popularity pass over {} edges", graph.edge_count());
        let samples = self.config.popularity_samples;
        let results = map_edges(graph, |e| match self.sampling_line(graph, e) {
            Some(line) => {
                let (m, misses) = edge_popularity(&line, heatmap, &self.heatmap, samples);
                (m, true, misses)
            }
            None => (Measure::Unknown, false, 0),
        });

        let mut report = PassReport::new(EdgeAttr::Popularity);
        let mut column = Vec::with_capacity(results.len());
        for (m, had_geometry, misses) in results {
            report.edges += 1;
            report.sample_misses += misses;
            if had_geometry {
                report.with_geometry += 1;
            } else {
                report.no_geometry += 1;
            }
            if !m.is_known() {
                report.unknown += 1;
            }
            column.push(m);
        }
        graph.attrs_mut().apply(EdgeAttr::Popularity, column);
        info!("{report}");
        report
    }

    /// All three passes in order: elevation, distance, popularity.  A pass
    /// whose raster is `None` is skipped.
    pub fn run<D, H>(&self, graph: &mut RoadGraph, dem: Option<&D>, heatmap: Option<&H>) -> Vec<PassReport>
    where
        D: Sampler + ?Sized,
        H: Sampler + ?Sized,
    {
        let mut reports = Vec::with_capacity(3);
        if let Some(dem) = dem {
            reports.push(self.elevation_pass(graph, dem));
        }
        reports.push(self.distance_pass(graph));
        if let Some(heatmap) = heatmap {
            reports.push(self.popularity_pass(graph, heatmap));
        }
        reports
    }
}

// ── Column evaluation ─────────────────────────────────────────────────────────

/// Evaluate `f` for every edge, in `EdgeId` order.
fn map_edges<T, F>(graph: &RoadGraph, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(EdgeId) -> T + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        (0..graph.edge_count()).map(|i| f(EdgeId(i as u32))).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        (0..graph.edge_count())
            .into_par_iter()
            .map(|i| f(EdgeId(i as u32)))
            .collect()
    }
}
