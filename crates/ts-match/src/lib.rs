//! `ts-match`: aligns cleaned traces onto the road network through an
//! external map-matching service.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`config`]  | `MatchConfig`                                                 |
//! | [`service`] | `MatchService` trait, `ValhallaService` (blocking HTTP)       |
//! | [`trip`]    | `MatchedTrip` response model, polyline decoding, JSON files   |
//! | [`matcher`] | `MapMatcher`: chunking, merging, coverage                     |
//! | [`batch`]   | `BatchCursor`, `match_directory`, `match_report.csv`          |
//! | [`error`]   | `MatchError`, `MatchResult<T>`                                |
//!
//! # Failure model
//!
//! A failed service call drops its chunk; the remaining chunks still make
//! up the match.  Only file I/O on inputs and outputs returns `Err` from
//! the batch driver.

pub mod batch;
pub mod config;
pub mod error;
pub mod matcher;
pub mod service;
pub mod trip;


pub use batch::{match_directory, BatchCursor, BatchSummary, MatchReportRow};
pub use config::MatchConfig;
pub use error::{MatchError, MatchResult};
pub use matcher::{chunk_ranges, MapMatcher, MatchOutcome, MatchQuality};
pub use service::{MatchService, ValhallaService};
pub use trip::{Leg, MatchedTrip, Shape, ShapePoint};
