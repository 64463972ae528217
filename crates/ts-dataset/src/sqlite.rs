//! SQLite dataset backend (feature `sqlite`).
//!
//! Creates `edge_dataset.db` in the output directory with one table,
//! `edge_dataset`, holding the rows and their derived features.  The table
//! is recreated on open, so a re-run replaces the previous rows as the CSV
//! backend does.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::DatasetWriter;
use crate::{DatasetResult, DatasetRow, EdgeFeatures};

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `edge_dataset.db` in `dir` and reset the table.
    pub fn new(dir: &Path) -> DatasetResult<Self> {
        let conn = Connection::open(dir.join("edge_dataset.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             DROP TABLE IF EXISTS edge_dataset;
             CREATE TABLE edge_dataset (
                 trace_file   TEXT    NOT NULL,
                 edge_id      TEXT    NOT NULL,
                 from_node    INTEGER NOT NULL,
                 to_node      INTEGER NOT NULL,
                 distance     REAL    NOT NULL,
                 dplus        REAL    NOT NULL,
                 surface      TEXT    NOT NULL,
                 popularity   REAL    NOT NULL,
                 slope        REAL    NOT NULL,
                 log_distance REAL    NOT NULL,
                 is_asphalt   INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl DatasetWriter for SqliteWriter {
    fn write_rows(&mut self, rows: &[DatasetRow]) -> DatasetResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO edge_dataset \
                 (trace_file, edge_id, from_node, to_node, distance, dplus, surface, \
                  popularity, slope, log_distance, is_asphalt) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                let f = EdgeFeatures::from_row(row);
                stmt.execute(rusqlite::params![
                    row.trace_file,
                    row.edge_id.to_string(),
                    row.from_node,
                    row.to_node,
                    row.distance,
                    row.dplus,
                    row.surface,
                    row.popularity,
                    f.slope,
                    f.log_distance,
                    f.is_asphalt as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> DatasetResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
