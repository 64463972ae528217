//! The `DatasetWriter` trait implemented by all backend writers.

use crate::{DatasetResult, DatasetRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
pub trait DatasetWriter {
    /// Append a batch of rows, typically one trace's worth.
    fn write_rows(&mut self, rows: &[DatasetRow]) -> DatasetResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> DatasetResult<()>;
}

impl<W: DatasetWriter + ?Sized> DatasetWriter for Box<W> {
    fn write_rows(&mut self, rows: &[DatasetRow]) -> DatasetResult<()> {
        (**self).write_rows(rows)
    }

    fn finish(&mut self) -> DatasetResult<()> {
        (**self).finish()
    }
}
