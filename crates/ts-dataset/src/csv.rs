//! CSV dataset backend.
//!
//! Creates two files in the output directory:
//! - `edge_dataset.csv`: one row per edge traversal
//! - `edge_features.csv`: the same rows plus derived features

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::DatasetWriter;
use crate::{DatasetResult, DatasetRow, EdgeFeatures};

const ROW_HEADER: [&str; 8] =
    ["trace_file", "edge_id", "from_node", "to_node", "distance", "dplus", "surface", "popularity"];

fn row_record(row: &DatasetRow) -> Vec<String> {
    vec![
        row.trace_file.clone(),
        row.edge_id.to_string(),
        row.from_node.to_string(),
        row.to_node.to_string(),
        row.distance.to_string(),
        row.dplus.to_string(),
        row.surface.clone(),
        row.popularity.to_string(),
    ]
}

pub struct CsvWriter {
    dataset:  Writer<File>,
    features: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create both CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> DatasetResult<Self> {
        let mut dataset = Writer::from_path(dir.join("edge_dataset.csv"))?;
        dataset.write_record(ROW_HEADER)?;

        let mut features = Writer::from_path(dir.join("edge_features.csv"))?;
        features.write_record(ROW_HEADER.iter().chain(&["slope", "log_distance", "is_asphalt"]))?;

        Ok(Self { dataset, features, finished: false })
    }
}

impl DatasetWriter for CsvWriter {
    fn write_rows(&mut self, rows: &[DatasetRow]) -> DatasetResult<()> {
        for row in rows {
            let mut record = row_record(row);
            self.dataset.write_record(&record)?;

            let f = EdgeFeatures::from_row(row);
            record.push(f.slope.to_string());
            record.push(f.log_distance.to_string());
            record.push((f.is_asphalt as u8).to_string());
            self.features.write_record(&record)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> DatasetResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.dataset.flush()?;
        self.features.flush()?;
        Ok(())
    }
}
