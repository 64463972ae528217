//! Unit tests for ts-trace.

#[cfg(test)]
mod helpers {
    use ts_core::GeoPoint;
    use ts_graph::{EdgeSpec, RoadGraph, RoadGraphBuilder};

    use crate::RawTracePoint;

    /// 1 Hz trace heading north, `step_deg` of latitude per fix.
    pub fn northbound(n: usize, step_deg: f64) -> Vec<RawTracePoint> {
        (0..n)
            .map(|i| RawTracePoint::new(48.4 + i as f64 * step_deg, 2.7, Some(i as f64)))
            .collect()
    }

    /// Five nodes due east along 48.4° N, 0.0015° (~111 m) apart, two-way.
    pub fn eastbound_road() -> (RoadGraph, Vec<GeoPoint>) {
        let mut b = RoadGraphBuilder::new();
        let pts: Vec<GeoPoint> = (0..5).map(|i| GeoPoint::new(48.4, 2.7 + i as f64 * 0.0015)).collect();
        let ids: Vec<_> = pts.iter().enumerate().map(|(i, &p)| b.add_node(i as i64, Some(p))).collect();
        for w in ids.windows(2) {
            b.add_edge(w[0], w[1], EdgeSpec::new().highway("path")).unwrap();
            b.add_edge(w[1], w[0], EdgeSpec::new().highway("path")).unwrap();
        }
        (b.build(), pts)
    }
}

// ── Cleaner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cleaner {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use ts_core::GeoPoint;
    use ts_graph::{EdgeSpec, RoadGraphBuilder};

    use super::helpers::{eastbound_road, northbound};
    use crate::{CleanOutcome, CleanerConfig, RawTracePoint, TraceCleaner};

    fn loose() -> CleanerConfig {
        CleanerConfig { min_points: 2, ..CleanerConfig::default() }
    }

    #[test]
    fn defaults() {
        let c = CleanerConfig::default();
        assert_eq!(c.max_speed_kmh, 59.0);
        assert_eq!(c.gap_threshold_m, 300.0);
        assert_eq!(c.interpolation_step_m, 20.0);
        assert_eq!(c.min_spacing_m, 2.0);
        assert_eq!(c.min_points, 10);
    }

    #[test]
    fn speed_jump_drops_later_point() {
        // 1e-4° per second is ~40 km/h.  Fix 5 jumps 5e-4° in one second
        // (~200 km/h); fix 6 is back on track, 2e-4° in 2 s from fix 4.
        let mut raw = northbound(5, 1e-4);
        raw.push(RawTracePoint::new(48.4 + 9e-4, 2.7, Some(5.0)));
        raw.push(RawTracePoint::new(48.4 + 6e-4, 2.7, Some(6.0)));

        let (outcome, report) = TraceCleaner::new(loose()).clean(&raw);
        let trace = outcome.into_trace().unwrap();
        assert_eq!(report.dropped_speed, 1);
        assert_eq!(trace.len(), 6);
        assert!(!trace.points().contains(&raw[5].pos));
        // Survivors keep their original order.
        assert!(trace.points().windows(2).all(|w| w[0].lat < w[1].lat));
    }

    #[test]
    fn speed_unchecked_without_timestamps() {
        let raw = vec![
            RawTracePoint::new(48.4, 2.7, None),
            RawTracePoint::new(48.4005, 2.7, Some(1.0)),
        ];
        let (_, report) = TraceCleaner::new(loose()).clean(&raw);
        assert_eq!(report.dropped_speed, 0);
        assert_eq!(report.kept_points, 2);
    }

    #[test]
    fn non_positive_time_delta_counts_as_stationary() {
        let raw = vec![
            RawTracePoint::new(48.4, 2.7, Some(10.0)),
            RawTracePoint::new(48.4002, 2.7, Some(10.0)),
            RawTracePoint::new(48.4004, 2.7, Some(9.0)),
        ];
        let (_, report) = TraceCleaner::new(loose()).clean(&raw);
        assert_eq!(report.dropped_speed, 0);
        assert_eq!(report.kept_points, 3);
    }

    #[test]
    fn near_duplicates_are_dropped() {
        // 1e-5° is ~1.1 m, under the 2 m spacing.
        let raw = vec![
            RawTracePoint::new(48.4, 2.7, None),
            RawTracePoint::new(48.40001, 2.7, None),
            RawTracePoint::new(48.4001, 2.7, None),
        ];
        let (outcome, report) = TraceCleaner::new(loose()).clean(&raw);
        assert_eq!(report.dropped_spacing, 1);
        assert_eq!(outcome.into_trace().unwrap().points(), &[raw[0].pos, raw[2].pos]);
    }

    #[test]
    fn invalid_fixes_are_skipped() {
        let raw = vec![
            RawTracePoint::new(f64::NAN, 2.7, None),
            RawTracePoint::new(48.4, 2.7, None),
            RawTracePoint::new(95.0, 2.7, None),
            RawTracePoint::new(48.4001, 2.7, None),
        ];
        let (_, report) = TraceCleaner::new(loose()).clean(&raw);
        assert_eq!(report.dropped_invalid, 2);
        assert_eq!(report.kept_points, 2);
    }

    #[test]
    fn gap_without_graph_is_interpolated() {
        // ~1.1 km jump, far above the 300 m threshold.
        let raw = vec![
            RawTracePoint::new(48.40, 2.7, None),
            RawTracePoint::new(48.41, 2.7, None),
        ];
        let (outcome, report) = TraceCleaner::new(loose()).clean(&raw);
        let trace = outcome.into_trace().unwrap();
        assert_eq!(report.gaps_interpolated, 1);
        assert_eq!(report.gaps_routed, 0);
        assert_eq!(trace.points().first(), Some(&raw[0].pos));
        assert_eq!(trace.points().last(), Some(&raw[1].pos));
        assert_eq!(report.inserted_points, trace.len() - 2);
        for w in trace.points().windows(2) {
            let d = w[0].distance_m(w[1]);
            assert!(d <= 20.0 + 1e-6 && d > 2.0, "step {d}");
        }
    }

    #[test]
    fn gap_is_filled_along_shortest_path() {
        let (graph, nodes) = eastbound_road();
        // ~444 m in 60 s: fast enough to be a gap, slow enough to keep.
        let raw = vec![
            RawTracePoint::new(48.4, 2.7, Some(0.0)),
            RawTracePoint::new(48.4, 2.706, Some(60.0)),
        ];
        let (outcome, report) = TraceCleaner::new(loose()).with_graph(&graph).clean(&raw);
        assert_eq!(report.gaps_routed, 1);
        assert_eq!(report.inserted_points, 3);
        let expected: Vec<GeoPoint> = vec![raw[0].pos, nodes[1], nodes[2], nodes[3], raw[1].pos];
        assert_eq!(outcome.into_trace().unwrap().into_points(), expected);
    }

    #[test]
    fn adjacent_snapped_nodes_fall_back_to_interpolation() {
        // Two nodes ~445 m apart joined by one edge: the route has no
        // intermediate node to insert.
        let mut b = RoadGraphBuilder::new();
        let (p, q) = (GeoPoint::new(48.4, 2.7), GeoPoint::new(48.4, 2.706));
        let (u, v) = (b.add_node(1, Some(p)), b.add_node(2, Some(q)));
        b.add_edge(u, v, EdgeSpec::new().highway("path")).unwrap();
        let graph = b.build();

        let raw = vec![RawTracePoint::new(48.4, 2.7, None), RawTracePoint::new(48.4, 2.706, None)];
        let (outcome, report) = TraceCleaner::new(loose()).with_graph(&graph).clean(&raw);
        assert_eq!(report.gaps_routed, 0);
        assert_eq!(report.gaps_interpolated, 1);
        let trace = outcome.into_trace().unwrap();
        assert!(trace.len() > 2);
        for w in trace.points().windows(2) {
            assert!(w[0].distance_m(w[1]) <= 20.0 + 1e-6);
        }
    }

    #[test]
    fn long_routed_hops_are_densified() {
        // Nodes 0, 1 and 2 due east, ~445 m apart; the route 0 → 2 has a
        // single intermediate node with a long hop on each side.
        let mut b = RoadGraphBuilder::new();
        let pts: Vec<GeoPoint> = (0..3).map(|i| GeoPoint::new(48.4, 2.7 + i as f64 * 0.006)).collect();
        let ids: Vec<_> = pts.iter().enumerate().map(|(i, &p)| b.add_node(i as i64, Some(p))).collect();
        b.add_edge(ids[0], ids[1], EdgeSpec::new()).unwrap();
        b.add_edge(ids[1], ids[2], EdgeSpec::new()).unwrap();
        let graph = b.build();

        let raw = vec![RawTracePoint::new(48.4, 2.7, None), RawTracePoint::new(48.4, 2.712, None)];
        let (outcome, report) = TraceCleaner::new(loose()).with_graph(&graph).clean(&raw);
        assert_eq!(report.gaps_routed, 1);
        let trace = outcome.into_trace().unwrap();
        assert!(trace.points().contains(&pts[1]));
        for w in trace.points().windows(2) {
            assert!(w[0].distance_m(w[1]) <= 300.0, "hop {}", w[0].distance_m(w[1]));
        }
    }

    #[test]
    fn snap_miss_falls_back_to_interpolation() {
        let (graph, _) = eastbound_road();
        // Both ends ~1 km north of the road: beyond the 100 m snap bound.
        let raw = vec![
            RawTracePoint::new(48.41, 2.7, None),
            RawTracePoint::new(48.41, 2.706, None),
        ];
        let (_, report) = TraceCleaner::new(loose()).with_graph(&graph).clean(&raw);
        assert_eq!(report.gaps_routed, 0);
        assert_eq!(report.gaps_interpolated, 1);
    }

    #[test]
    fn too_few_points_is_insufficient() {
        let raw = northbound(5, 1e-4);
        let (outcome, _) = TraceCleaner::new(CleanerConfig::default()).clean(&raw);
        assert_eq!(outcome, CleanOutcome::Insufficient { kept: 5 });
    }

    #[test]
    fn cleaning_is_idempotent() {
        let raw = northbound(30, 1e-4);
        let cleaner = TraceCleaner::new(CleanerConfig::default());
        let once = cleaner.clean(&raw).0.into_trace().unwrap();
        let twice = cleaner.clean(&once.to_raw()).0.into_trace().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn output_spacing_holds_on_random_walks() {
        let mut rng = SmallRng::seed_from_u64(11);
        let cleaner = TraceCleaner::new(loose());
        for _ in 0..20 {
            let mut p = GeoPoint::new(48.4, 2.7);
            let raw: Vec<RawTracePoint> = (0..200)
                .map(|i| {
                    // Mostly small steps, occasional long jumps.
                    let scale = if rng.gen_bool(0.05) { 5e-3 } else { 5e-5 };
                    p.lat += rng.gen_range(-scale..scale);
                    p.lon += rng.gen_range(-scale..scale);
                    RawTracePoint { pos: p, time: Some(i as f64 * 2.0) }
                })
                .collect();
            let (outcome, _) = cleaner.clean(&raw);
            if let Some(t) = outcome.into_trace() {
                for w in t.points().windows(2) {
                    assert!(w[0].distance_m(w[1]) > 2.0);
                }
            }
        }
    }
}

// ── Filter ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod filter {
    use ts_core::{BoundingBox, GeoPoint};

    use crate::{CleanedTrace, TraceFilter, TraceVerdict};

    /// `n` points heading north, 0.001° (~111 m) apart.
    fn line(n: usize) -> CleanedTrace {
        CleanedTrace::new((0..n).map(|i| GeoPoint::new(48.2 + i as f64 * 1e-3, 2.7)).collect())
    }

    #[test]
    fn accepts_long_enough_trace() {
        let mut f = TraceFilter::default();
        assert_eq!(f.check(200, &line(100)), TraceVerdict::Accept);
        assert_eq!(f.accepted(), 1);
    }

    #[test]
    fn rules_in_order() {
        let mut f = TraceFilter::default();
        assert_eq!(f.check(5, &line(100)), TraceVerdict::TooFewRawPoints(5));
        assert_eq!(f.check(50, &line(5)), TraceVerdict::TooFewPoints(5));
        assert_eq!(f.check(50, &line(3001)), TraceVerdict::TooManyPoints(3001));
        assert!(matches!(f.check(50, &line(20)), TraceVerdict::TooShort { .. }));
    }

    #[test]
    fn bounding_box_is_enforced() {
        let mut f = TraceFilter {
            bbox: Some(BoundingBox::new(48.145309, 2.188650, 48.35, 3.411287)),
            ..TraceFilter::default()
        };
        assert_eq!(f.check(200, &line(100)), TraceVerdict::Accept);
        assert_eq!(f.check(200, &line(200)), TraceVerdict::OutsideBounds);
    }

    #[test]
    fn duplicates_detected_after_rounding() {
        let mut f = TraceFilter::default();
        let a = line(100);
        let jittered = CleanedTrace::new(
            a.points().iter().map(|p| GeoPoint::new(p.lat + 1e-7, p.lon)).collect(),
        );
        assert!(f.check(100, &a).is_accept());
        assert_eq!(f.check(100, &jittered), TraceVerdict::Duplicate);
        assert!(f.check(100, &line(101)).is_accept());
    }

    #[test]
    fn verdict_messages() {
        assert_eq!(TraceVerdict::TooShort { length_m: 2500.0 }.to_string(), "too short (2.50 km)");
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use ts_core::GeoPoint;

    use crate::{load_trace_csv, load_trace_reader, write_trace_csv, CleanedTrace, RawTracePoint};

    #[test]
    fn reads_with_and_without_time() {
        let csv = "lat,lon,time\n48.4,2.7,100\n48.5, 2.8,\n";
        let pts = load_trace_reader(Cursor::new(csv)).unwrap();
        assert_eq!(pts, vec![
            RawTracePoint::new(48.4, 2.7, Some(100.0)),
            RawTracePoint::new(48.5, 2.8, None),
        ]);
    }

    #[test]
    fn time_column_is_optional() {
        let pts = load_trace_reader(Cursor::new("lat,lon\n48.4,2.7\n")).unwrap();
        assert_eq!(pts[0].time, None);
    }

    #[test]
    fn bad_row_reports_position() {
        let err = load_trace_reader(Cursor::new("lat,lon\n48.4,2.7\nx,2.7\n")).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn cleaned_trace_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let trace = CleanedTrace::new(vec![GeoPoint::new(48.40123, 2.70011), GeoPoint::new(48.4, 2.7)]);
        write_trace_csv(&path, &trace).unwrap();
        let back: Vec<GeoPoint> = load_trace_csv(&path).unwrap().iter().map(|p| p.pos).collect();
        assert_eq!(back, trace.points());
    }
}
