//! Single-pass trace cleaner.
//!
//! Walks the raw fixes once, keeping a cursor on the last accepted fix:
//!
//! 1. The first valid fix is always accepted.
//! 2. A fix whose implied speed from the cursor exceeds
//!    `max_speed_kmh` is dropped.  Speed is only checked when both fixes
//!    carry timestamps; a non-positive time delta counts as speed 0.
//! 3. A fix farther than `gap_threshold_m` from the cursor opens a gap.
//!    Both ends are snapped to graph nodes within `snap_max_distance_m`
//!    and the shortest path's intermediate node coordinates are inserted;
//!    a hop along the route still longer than `gap_threshold_m` is
//!    interpolated.  When either snap or the path fails, or the path has
//!    no intermediate node, points are linearly interpolated every
//!    `interpolation_step_m` instead.
//! 4. Any other fix is accepted only if farther than `min_spacing_m`
//!    from the cursor.
//!
//! The last output point is always the cursor, and inserted points keep
//! `min_spacing_m` from both neighbours, so no two consecutive output
//! points are within `min_spacing_m`.  A result with fewer than
//! `min_points` points is reported as [`CleanOutcome::Insufficient`].

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use ts_core::{densify, GeoPoint};
use ts_graph::RoadGraph;

use crate::{CleanedTrace, RawTracePoint};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Tunables for [`TraceCleaner`].  Defaults suit bike and MTB traces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Fixes implying a higher speed from the last accepted fix are dropped.
    pub max_speed_kmh:        f64,
    /// Jumps longer than this are treated as gaps to fill.
    pub gap_threshold_m:      f64,
    /// Step of the linear-interpolation fallback.
    pub interpolation_step_m: f64,
    /// Fixes closer than this to the last accepted one are dropped.
    pub min_spacing_m:        f64,
    /// Snap bound for gap endpoints.
    pub snap_max_distance_m:  f64,
    /// Cleaned traces with fewer points are rejected.
    pub min_points:           usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            max_speed_kmh:        59.0,
            gap_threshold_m:      300.0,
            interpolation_step_m: 20.0,
            min_spacing_m:        2.0,
            snap_max_distance_m:  100.0,
            min_points:           10,
        }
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Counters describing one `clean` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub raw_points:        usize,
    pub kept_points:       usize,
    /// Fixes with non-finite or out-of-range coordinates.
    pub dropped_invalid:   usize,
    pub dropped_speed:     usize,
    pub dropped_spacing:   usize,
    pub gaps_routed:       usize,
    pub gaps_interpolated: usize,
    /// Points added by gap filling.
    pub inserted_points:   usize,
}

impl CleanReport {
    /// Accumulate another report's counters into this one.
    pub fn merge(&mut self, other: &CleanReport) {
        self.raw_points        += other.raw_points;
        self.kept_points       += other.kept_points;
        self.dropped_invalid   += other.dropped_invalid;
        self.dropped_speed     += other.dropped_speed;
        self.dropped_spacing   += other.dropped_spacing;
        self.gaps_routed       += other.gaps_routed;
        self.gaps_interpolated += other.gaps_interpolated;
        self.inserted_points   += other.inserted_points;
    }
}

/// Result of cleaning one trace.
#[derive(Clone, Debug, PartialEq)]
pub enum CleanOutcome {
    Cleaned(CleanedTrace),
    /// Fewer than `min_points` points survived.  Not an error.
    Insufficient { kept: usize },
}

impl CleanOutcome {
    pub fn into_trace(self) -> Option<CleanedTrace> {
        match self {
            CleanOutcome::Cleaned(t) => Some(t),
            CleanOutcome::Insufficient { .. } => None,
        }
    }
}

// ── TraceCleaner ──────────────────────────────────────────────────────────────

/// Cleans raw traces, optionally filling gaps by routing over a graph.
///
/// ```
/// use ts_trace::{CleanerConfig, RawTracePoint, TraceCleaner};
///
/// let raw: Vec<_> = (0..12)
///     .map(|i| RawTracePoint::new(48.4 + i as f64 * 1e-4, 2.7, Some(i as f64 * 5.0)))
///     .collect();
/// let (outcome, report) = TraceCleaner::new(CleanerConfig::default()).clean(&raw);
/// assert_eq!(report.kept_points, 12);
/// assert!(outcome.into_trace().is_some());
/// ```
pub struct TraceCleaner<'g> {
    config: CleanerConfig,
    graph:  Option<&'g RoadGraph>,
}

impl<'g> TraceCleaner<'g> {
    /// Cleaner without a graph; gaps are always interpolated.
    pub fn new(config: CleanerConfig) -> Self {
        Self { config, graph: None }
    }

    /// Fill gaps by shortest path over `graph` where possible.
    pub fn with_graph(mut self, graph: &'g RoadGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    pub fn clean(&self, raw: &[RawTracePoint]) -> (CleanOutcome, CleanReport) {
        let cfg = &self.config;
        let mut report = CleanReport { raw_points: raw.len(), ..CleanReport::default() };
        let mut out: Vec<GeoPoint> = Vec::with_capacity(raw.len());
        let mut cursor: Option<RawTracePoint> = None;

        for &p in raw {
            if !p.pos.is_valid() {
                report.dropped_invalid += 1;
                continue;
            }
            let Some(last) = cursor else {
                out.push(p.pos);
                cursor = Some(p);
                continue;
            };

            let dist = last.pos.distance_m(p.pos);
            if let (Some(t0), Some(t1)) = (last.time, p.time) {
                let dt = t1 - t0;
                let speed_kmh = if dt > 0.0 { dist / dt * 3.6 } else { 0.0 };
                if speed_kmh > cfg.max_speed_kmh {
                    trace!("drop fix {}: {speed_kmh:.1} km/h", p.pos);
                    report.dropped_speed += 1;
                    continue;
                }
            }

            if dist > cfg.gap_threshold_m {
                let before = out.len();
                let fill = match self.route_gap(last.pos, p.pos) {
                    Some(path) => {
                        report.gaps_routed += 1;
                        path
                    }
                    None => {
                        report.gaps_interpolated += 1;
                        densify(last.pos, p.pos, cfg.interpolation_step_m)
                    }
                };
                self.extend_spaced(&mut out, fill, p.pos);
                report.inserted_points += out.len() - before;
                out.push(p.pos);
                cursor = Some(p);
            } else if dist > cfg.min_spacing_m {
                out.push(p.pos);
                cursor = Some(p);
            } else {
                report.dropped_spacing += 1;
            }
        }

        report.kept_points = out.len();
        debug!(
            "cleaned {} → {} points ({} speed, {} spacing, {} routed, {} interpolated)",
            report.raw_points,
            report.kept_points,
            report.dropped_speed,
            report.dropped_spacing,
            report.gaps_routed,
            report.gaps_interpolated,
        );

        let outcome = if out.len() < cfg.min_points {
            CleanOutcome::Insufficient { kept: out.len() }
        } else {
            CleanOutcome::Cleaned(CleanedTrace::new(out))
        };
        (outcome, report)
    }

    /// Intermediate node coordinates of the shortest path between the nodes
    /// nearest to `a` and `b`, with hops longer than `gap_threshold_m`
    /// densified.  `None` on a snap or routing miss, or when the path has no
    /// located intermediate node.
    fn route_gap(&self, a: GeoPoint, b: GeoPoint) -> Option<Vec<GeoPoint>> {
        let graph = self.graph?;
        let cfg = &self.config;
        let max = Some(cfg.snap_max_distance_m);
        let u = graph.nearest_node(a, max)?;
        let v = graph.nearest_node(b, max)?;
        if u == v {
            return None;
        }
        let path = graph.shortest_path(u, v).ok()?;
        let inner = path.get(1..path.len().saturating_sub(1)).unwrap_or(&[]);
        let nodes: Vec<GeoPoint> = inner.iter().filter_map(|&n| graph.node_pos(n)).collect();
        if nodes.is_empty() {
            return None;
        }

        let mut fill = Vec::with_capacity(nodes.len());
        let mut prev = a;
        for &n in &nodes {
            if prev.distance_m(n) > cfg.gap_threshold_m {
                fill.extend(densify(prev, n, cfg.interpolation_step_m));
            }
            fill.push(n);
            prev = n;
        }
        if prev.distance_m(b) > cfg.gap_threshold_m {
            fill.extend(densify(prev, b, cfg.interpolation_step_m));
        }
        Some(fill)
    }

    /// Append `fill`, skipping points within `min_spacing_m` of the point
    /// before them or of `end`, the fix that closes the gap.
    fn extend_spaced(&self, out: &mut Vec<GeoPoint>, fill: Vec<GeoPoint>, end: GeoPoint) {
        let min = self.config.min_spacing_m;
        for p in fill {
            let clear_of_prev = out.last().is_none_or(|&last| last.distance_m(p) > min);
            if clear_of_prev && p.distance_m(end) > min {
                out.push(p);
            }
        }
    }
}
