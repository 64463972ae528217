//! `ts-dataset`: turns matched traces into per-edge training rows.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                  |
//! |-----------|---------|------------------------------------------------|
//! | *(none)*  | CSV     | `edge_dataset.csv`, `edge_features.csv`        |
//! | `sqlite`  | SQLite  | `edge_dataset.db` (`edge_dataset` table)       |
//! | `parquet` | Parquet | `edge_dataset.parquet`                         |
//!
//! All backends implement [`DatasetWriter`] and are fed by
//! [`EdgeAssociator`] or [`associate_directory`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use ts_dataset::{associate_directory, AssociatorConfig, CsvWriter, EdgeAssociator};
//!
//! let assoc = EdgeAssociator::new(&graph, AssociatorConfig::default());
//! let mut writer = CsvWriter::new(Path::new("./dataset"))?;
//! let report = associate_directory(&assoc, Path::new("./matched"), 6, &mut writer)?;
//! ```

pub mod associator;
pub mod csv;
pub mod error;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use associator::{associate_directory, AssociationReport, AssociatorConfig, EdgeAssociator};
pub use crate::csv::CsvWriter;
pub use error::{DatasetError, DatasetResult};
pub use row::{DatasetRow, EdgeFeatures};
pub use writer::DatasetWriter;

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetWriter;
