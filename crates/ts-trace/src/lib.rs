//! `ts-trace`: from raw GPS fixes to a cleaned coordinate sequence.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`trace`]   | `RawTracePoint`, `CleanedTrace`                             |
//! | [`cleaner`] | `TraceCleaner`, `CleanerConfig`, `CleanOutcome`, `CleanReport` |
//! | [`filter`]  | `TraceFilter`, `TraceVerdict` (acceptance rules, duplicates) |
//! | [`loader`]  | Trace CSV read/write                                        |
//! | [`error`]   | `TraceError`, `TraceResult<T>`                              |
//!
//! # Pipeline position
//!
//! ```text
//! load_trace_csv ─► TraceCleaner::clean ─► TraceFilter::check ─► write_trace_csv
//!                        │
//!                        └── gap filling routes over a ts_graph::RoadGraph
//! ```

pub mod cleaner;
pub mod error;
pub mod filter;
pub mod loader;
pub mod trace;

#[cfg(test)]
mod tests;

pub use cleaner::{CleanOutcome, CleanReport, CleanerConfig, TraceCleaner};
pub use error::{TraceError, TraceResult};
pub use filter::{TraceFilter, TraceVerdict};
pub use loader::{load_trace_csv, load_trace_reader, write_trace_csv, write_trace_writer};
pub use trace::{CleanedTrace, RawTracePoint};
