//! Trace CSV reader and writer.
//!
//! # CSV format
//!
//! ```csv
//! lat,lon,time
//! 48.40123,2.70011,1717225200
//! 48.40131,2.70029,1717225201
//! ```
//!
//! `time` (unix seconds, fractional allowed) is optional, both as a column
//! and per row.  Cleaned traces are written with `lat,lon` only.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use crate::{CleanedTrace, RawTracePoint, TraceError, TraceResult};

#[derive(Deserialize)]
struct TraceRecord {
    lat:  f64,
    lon:  f64,
    #[serde(default)]
    time: Option<f64>,
}

/// Load raw fixes from a CSV file.
pub fn load_trace_csv(path: &Path) -> TraceResult<Vec<RawTracePoint>> {
    let file = File::open(path)?;
    load_trace_reader(file)
}

/// Like [`load_trace_csv`] but accepts any `Read` source.
pub fn load_trace_reader<R: Read>(reader: R) -> TraceResult<Vec<RawTracePoint>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv_reader
        .deserialize::<TraceRecord>()
        .enumerate()
        .map(|(i, row)| {
            let r = row.map_err(|e| TraceError::Parse(format!("row {}: {e}", i + 1)))?;
            Ok(RawTracePoint::new(r.lat, r.lon, r.time))
        })
        .collect()
}

/// Write a cleaned trace as `lat,lon` CSV.
pub fn write_trace_csv(path: &Path, trace: &CleanedTrace) -> TraceResult<()> {
    let file = File::create(path)?;
    write_trace_writer(file, trace)
}

/// Like [`write_trace_csv`] but accepts any `Write` sink.
pub fn write_trace_writer<W: Write>(writer: W, trace: &CleanedTrace) -> TraceResult<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(["lat", "lon"])?;
    for p in trace.points() {
        w.write_record([p.lat.to_string(), p.lon.to_string()])?;
    }
    w.flush()?;
    Ok(())
}
