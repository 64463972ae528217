//! Unit tests for ts-dataset.

#[cfg(test)]
mod helpers {
    use ts_core::{GeoPoint, Measure, NodeId};
    use ts_graph::{EdgeAttrs, EdgeSpec, RoadGraph, RoadGraphBuilder};

    use crate::{DatasetRow, EdgeFeatures};

    pub const A: GeoPoint = GeoPoint { lat: 48.0000, lon: 2.0 };
    pub const B: GeoPoint = GeoPoint { lat: 48.0009, lon: 2.0 };
    pub const C: GeoPoint = GeoPoint { lat: 48.0018, lon: 2.0 };
    /// ~1.1 km east of A.
    pub const D: GeoPoint = GeoPoint { lat: 48.0000, lon: 2.015 };

    pub fn enriched(distance: f64, dplus: f64, popularity: Option<f64>) -> EdgeAttrs {
        EdgeAttrs {
            dplus:      Some(Measure::Known(dplus)),
            distance:   Some(Measure::Known(distance)),
            popularity: Some(popularity.into()),
        }
    }

    /// A → B → C, each edge 100 m and enriched, plus an enriched A → D edge
    /// whose endpoints are too far apart to pair.
    pub fn chain() -> (RoadGraph, [NodeId; 4]) {
        let mut b = RoadGraphBuilder::new();
        let na = b.add_node(1, Some(A));
        let nb = b.add_node(2, Some(B));
        let nc = b.add_node(3, Some(C));
        let nd = b.add_node(4, Some(D));
        b.add_edge(na, nb, EdgeSpec::new().surface("asphalt").attrs(enriched(100.0, 2.0, Some(7.5)))).unwrap();
        b.add_edge(nb, nc, EdgeSpec::new().highway("track").attrs(enriched(100.0, 5.0, None))).unwrap();
        b.add_edge(na, nd, EdgeSpec::new().attrs(enriched(1100.0, 0.0, Some(1.0)))).unwrap();
        (b.build(), [na, nb, nc, nd])
    }

    pub fn sample_row(surface: &str) -> DatasetRow {
        DatasetRow {
            trace_file: "ride_matched.json".into(),
            edge_id:    ts_core::EdgeKey::new(1, 2, 0),
            from_node:  1,
            to_node:    2,
            distance:   120.0,
            dplus:      6.0,
            surface:    surface.into(),
            popularity: 3.5,
        }
    }

    pub fn features(row: &DatasetRow) -> EdgeFeatures {
        EdgeFeatures::from_row(row)
    }
}

// ── Association ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod association {
    use ts_core::{EdgeKey, GeoPoint, Measure};
    use ts_graph::{EdgeAttrs, EdgeSpec, RoadGraphBuilder};

    use super::helpers::{chain, enriched, A, B, C, D};
    use crate::{AssociationReport, AssociatorConfig, EdgeAssociator};

    #[test]
    fn exact_chain_yields_both_edges_in_order() {
        let (g, _) = chain();
        let assoc = EdgeAssociator::new(&g, AssociatorConfig::default());
        let (rows, report) = assoc.associate(&[A, B, C], "t.json");

        let keys: Vec<EdgeKey> = rows.iter().map(|r| r.edge_id).collect();
        assert_eq!(keys, vec![EdgeKey::new(1, 2, 0), EdgeKey::new(2, 3, 0)]);
        assert_eq!(report, AssociationReport { matched: 2, unmatched: 0, stationary: 0 });

        assert_eq!((rows[0].from_node, rows[0].to_node), (1, 2));
        assert_eq!(rows[0].surface, "asphalt");
        assert_eq!(rows[0].popularity, 7.5);
        assert_eq!(rows[1].surface, "gravel");
        assert_eq!(rows[1].dplus, 5.0);
        assert_eq!(rows[1].popularity, 0.0);
        assert!(rows.iter().all(|r| r.trace_file == "t.json"));
    }

    #[test]
    fn reverse_traversal_uses_opposite_direction() {
        let (g, _) = chain();
        let assoc = EdgeAssociator::new(&g, AssociatorConfig::default());
        let (rows, report) = assoc.associate(&[C, B, A], "t.json");
        let keys: Vec<EdgeKey> = rows.iter().map(|r| r.edge_id).collect();
        assert_eq!(keys, vec![EdgeKey::new(2, 3, 0), EdgeKey::new(1, 2, 0)]);
        assert_eq!(report.unmatched, 0);
    }

    #[test]
    fn points_snapping_to_one_node_are_stationary() {
        let (g, _) = chain();
        let assoc = EdgeAssociator::new(&g, AssociatorConfig::default());
        let near_a = GeoPoint::new(A.lat + 0.00005, A.lon);
        let (rows, report) = assoc.associate(&[A, near_a, B], "t.json");
        assert_eq!(rows.len(), 1);
        assert_eq!(report, AssociationReport { matched: 1, unmatched: 0, stationary: 1 });
    }

    #[test]
    fn distant_pair_is_unmatched() {
        let (g, _) = chain();
        let assoc = EdgeAssociator::new(&g, AssociatorConfig::default());
        let (rows, report) = assoc.associate(&[A, D], "t.json");
        assert!(rows.is_empty());
        assert_eq!(report.unmatched, 1);

        let loose = EdgeAssociator::new(&g, AssociatorConfig { max_pair_distance_m: 2_000.0 });
        assert_eq!(loose.associate(&[A, D], "t.json").0.len(), 1);
    }

    #[test]
    fn first_enriched_parallel_edge_wins() {
        let mut b = RoadGraphBuilder::new();
        let u = b.add_node(10, Some(A));
        let v = b.add_node(11, Some(B));
        let partial = EdgeAttrs { distance: Some(Measure::Unknown), ..enriched(0.0, 1.0, None) };
        b.add_edge(u, v, EdgeSpec::new().attrs(partial)).unwrap();
        b.add_edge(u, v, EdgeSpec::new().attrs(enriched(90.0, 1.0, None))).unwrap();
        b.add_edge(u, v, EdgeSpec::new().attrs(enriched(80.0, 1.0, None))).unwrap();
        let g = b.build();

        let (rows, _) = EdgeAssociator::new(&g, AssociatorConfig::default()).associate(&[A, B], "t");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].edge_id, EdgeKey::new(10, 11, 1));
        assert_eq!(rows[0].distance, 90.0);
    }

    #[test]
    fn unenriched_edges_are_not_emitted() {
        let mut b = RoadGraphBuilder::new();
        let u = b.add_node(10, Some(A));
        let v = b.add_node(11, Some(B));
        b.add_edge(u, v, EdgeSpec::new()).unwrap();
        let g = b.build();

        let (rows, report) = EdgeAssociator::new(&g, AssociatorConfig::default()).associate(&[A, B], "t");
        assert!(rows.is_empty());
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.failure_rate(), 1.0);
    }

    #[test]
    fn short_polylines_produce_nothing() {
        let (g, _) = chain();
        let assoc = EdgeAssociator::new(&g, AssociatorConfig::default());
        assert_eq!(assoc.associate(&[A], "t").1, AssociationReport::default());
        assert!(assoc.associate(&[], "t").0.is_empty());
    }
}

// ── Features ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod features {
    use super::helpers::{features, sample_row};

    #[test]
    fn derived_columns() {
        let f = features(&sample_row("asphalt"));
        assert!((f.slope - 0.05).abs() < 1e-9);
        assert!((f.log_distance - 121f64.ln()).abs() < 1e-12);
        assert!(f.is_asphalt);
        assert!(!features(&sample_row("gravel")).is_asphalt);
    }

    #[test]
    fn zero_distance_slope_is_finite() {
        let mut row = sample_row("dirt");
        row.distance = 0.0;
        assert!(features(&row).slope.is_finite());
        assert_eq!(features(&row).log_distance, 0.0);
    }
}

// ── Writers ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use ts_core::GeoPoint;
    use ts_match::MatchedTrip;

    use super::helpers::{chain, sample_row, A, B, C};
    use crate::csv::CsvWriter;
    use crate::writer::DatasetWriter;
    use crate::{associate_directory, AssociatorConfig, EdgeAssociator};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert_eq!(
            headers(&dir.path().join("edge_dataset.csv")),
            ["trace_file", "edge_id", "from_node", "to_node", "distance", "dplus", "surface", "popularity"]
        );
        let feature_headers = headers(&dir.path().join("edge_features.csv"));
        assert_eq!(&feature_headers[8..], ["slope", "log_distance", "is_asphalt"]);
    }

    #[test]
    fn csv_rows_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_rows(&[sample_row("asphalt"), sample_row("gravel")]).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("edge_dataset.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "[1, 2, 0]");
        assert_eq!(&rows[0][4], "120");
        assert_eq!(&rows[1][6], "gravel");

        let mut rdr = csv::Reader::from_path(dir.path().join("edge_features.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][10], "1");
        assert_eq!(&rows[1][10], "0");
    }

    #[test]
    fn directory_association_writes_rows() {
        let matched = tmp();
        let out = tmp();
        MatchedTrip::from_points(&[A, B, C], 6).unwrap().save(&matched.path().join("ride_matched.json")).unwrap();
        MatchedTrip::from_points(&[C, B], 6).unwrap().save(&matched.path().join("back_matched.json")).unwrap();
        std::fs::write(matched.path().join("broken_matched.json"), "{not json").unwrap();
        MatchedTrip::from_points(&[A, GeoPoint::new(0.0, 0.0)], 6)
            .unwrap()
            .save(&matched.path().join("ignored.json"))
            .unwrap();

        let (g, _) = chain();
        let assoc = EdgeAssociator::new(&g, AssociatorConfig::default());
        let mut w = CsvWriter::new(out.path()).unwrap();
        let report = associate_directory(&assoc, matched.path(), 6, &mut w).unwrap();
        assert_eq!((report.matched, report.unmatched), (3, 0));

        let mut rdr = csv::Reader::from_path(out.path().join("edge_dataset.csv")).unwrap();
        let files: Vec<String> = rdr.records().map(|r| r.unwrap()[0].to_owned()).collect();
        assert_eq!(files, ["back_matched.json", "ride_matched.json", "ride_matched.json"]);
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use rusqlite::Connection;

    use super::helpers::sample_row;
    use crate::sqlite::SqliteWriter;
    use crate::writer::DatasetWriter;

    #[test]
    fn sqlite_rows_inserted() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_rows(&[sample_row("asphalt"), sample_row("dirt")]).unwrap();
        w.finish().unwrap();

        let conn = Connection::open(dir.path().join("edge_dataset.db")).unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM edge_dataset", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 2);
        let asphalt: i64 = conn.query_row("SELECT SUM(is_asphalt) FROM edge_dataset", [], |r| r.get(0)).unwrap();
        assert_eq!(asphalt, 1);
        let (edge_id, from, to): (String, i64, i64) = conn
            .query_row("SELECT edge_id, from_node, to_node FROM edge_dataset LIMIT 1", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!((edge_id.as_str(), from, to), ("[1, 2, 0]", 1, 2));
    }

    #[test]
    fn rerun_replaces_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..2 {
            let mut w = SqliteWriter::new(dir.path()).unwrap();
            w.write_rows(&[sample_row("asphalt"), sample_row("dirt"), sample_row("gravel")]).unwrap();
            w.finish().unwrap();
        }

        let conn = Connection::open(dir.path().join("edge_dataset.db")).unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM edge_dataset", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 3);
    }
}

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::helpers::sample_row;
    use crate::parquet::ParquetWriter;
    use crate::writer::DatasetWriter;

    #[test]
    fn parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_rows(&[sample_row("asphalt"), sample_row("gravel"), sample_row("sand")]).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("edge_dataset.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let total: usize = builder.build().unwrap().map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total, 3);
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            [
                "trace_file", "edge_id", "from_node", "to_node", "distance", "dplus", "surface",
                "popularity", "slope", "log_distance", "is_asphalt",
            ]
        );
    }
}
