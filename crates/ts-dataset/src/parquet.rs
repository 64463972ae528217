//! Parquet dataset backend (feature `parquet`).
//!
//! Creates `edge_dataset.parquet` in the output directory, one record
//! batch per `write_rows` call.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::DatasetWriter;
use crate::{DatasetResult, DatasetRow, EdgeFeatures};

fn dataset_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("trace_file",   DataType::Utf8,    false),
        Field::new("edge_id",      DataType::Utf8,    false),
        Field::new("from_node",    DataType::Int64,   false),
        Field::new("to_node",      DataType::Int64,   false),
        Field::new("distance",     DataType::Float64, false),
        Field::new("dplus",        DataType::Float64, false),
        Field::new("surface",      DataType::Utf8,    false),
        Field::new("popularity",   DataType::Float64, false),
        Field::new("slope",        DataType::Float64, false),
        Field::new("log_distance", DataType::Float64, false),
        Field::new("is_asphalt",   DataType::Boolean, false),
    ]))
}

/// Writes the dataset to one Parquet file.
///
/// `finish()` **must** be called to write the Parquet footer.
pub struct ParquetWriter {
    writer: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(dir: &Path) -> DatasetResult<Self> {
        let schema = dataset_schema();
        let props = WriterProperties::builder().set_compression(Compression::SNAPPY).build();
        let file = File::create(dir.join("edge_dataset.parquet"))?;
        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(props))?;
        Ok(Self { writer: Some(writer), schema })
    }
}

impl DatasetWriter for ParquetWriter {
    fn write_rows(&mut self, rows: &[DatasetRow]) -> DatasetResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let mut trace_files  = StringBuilder::new();
        let mut edge_ids     = StringBuilder::new();
        let mut froms        = Int64Builder::new();
        let mut tos          = Int64Builder::new();
        let mut distances    = Float64Builder::new();
        let mut dpluses      = Float64Builder::new();
        let mut surfaces     = StringBuilder::new();
        let mut popularities = Float64Builder::new();
        let mut slopes       = Float64Builder::new();
        let mut log_dists    = Float64Builder::new();
        let mut asphalt      = BooleanBuilder::new();

        for row in rows {
            let f = EdgeFeatures::from_row(row);
            trace_files.append_value(&row.trace_file);
            edge_ids.append_value(row.edge_id.to_string());
            froms.append_value(row.from_node);
            tos.append_value(row.to_node);
            distances.append_value(row.distance);
            dpluses.append_value(row.dplus);
            surfaces.append_value(&row.surface);
            popularities.append_value(row.popularity);
            slopes.append_value(f.slope);
            log_dists.append_value(f.log_distance);
            asphalt.append_value(f.is_asphalt);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                Arc::new(trace_files.finish()),
                Arc::new(edge_ids.finish()),
                Arc::new(froms.finish()),
                Arc::new(tos.finish()),
                Arc::new(distances.finish()),
                Arc::new(dpluses.finish()),
                Arc::new(surfaces.finish()),
                Arc::new(popularities.finish()),
                Arc::new(slopes.finish()),
                Arc::new(log_dists.finish()),
                Arc::new(asphalt.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> DatasetResult<()> {
        if let Some(w) = self.writer.take() {
            w.close()?;
        }
        Ok(())
    }
}
