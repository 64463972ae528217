//! Resumable matching of a directory of cleaned traces.
//!
//! Output directory layout:
//!
//! ```text
//! <out>/<trace>_matched.json   one per matched trace
//! <out>/matched.done           trace ids already matched, one per line
//! <out>/match_report.csv       per-trace coverage and chunk counts
//! ```
//!
//! Outputs are written to a temporary file and renamed into place before the
//! trace is recorded in `matched.done`.  A restart skips every trace listed
//! there, so an interrupted run can simply be started again.  An output file
//! with no `matched.done` entry is adopted if it parses and re-matched if
//! it does not.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use serde::Serialize;

use ts_trace::{load_trace_csv, CleanedTrace};

use crate::{MapMatcher, MatchQuality, MatchResult, MatchService, MatchedTrip};

// ── BatchCursor ───────────────────────────────────────────────────────────────

/// Persistent set of trace ids already matched.
pub struct BatchCursor {
    path: PathBuf,
    done: FxHashSet<String>,
    file: File,
}

impl BatchCursor {
    pub const FILE_NAME: &'static str = "matched.done";

    /// Open the cursor in `dir`, creating the directory and file as needed.
    pub fn open(dir: &Path) -> MatchResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);
        let mut done = FxHashSet::default();
        if path.exists() {
            for line in BufReader::new(File::open(&path)?).lines() {
                let line = line?;
                let id = line.trim();
                if !id.is_empty() {
                    done.insert(id.to_owned());
                }
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, done, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_done(&self, id: &str) -> bool {
        self.done.contains(id)
    }

    /// Record `id` and append it to the file.
    pub fn mark_done(&mut self, id: &str) -> MatchResult<()> {
        if self.done.insert(id.to_owned()) {
            writeln!(self.file, "{id}")?;
            self.file.flush()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// One `match_report.csv` record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchReportRow {
    pub trace:         String,
    pub points:        usize,
    pub chunks_ok:     usize,
    pub chunks_failed: usize,
    pub coverage:      f64,
    pub quality:       String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub traces:       usize,
    pub matched:      usize,
    pub low_coverage: usize,
    pub failed:       usize,
    pub skipped:      usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} traces: {} matched ({} low coverage), {} failed, {} skipped",
            self.traces, self.matched, self.low_coverage, self.failed, self.skipped
        )
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

/// Trace CSV files directly under `dir`, sorted by name.
fn trace_files(dir: &Path) -> MatchResult<Vec<PathBuf>> {
    let files: BTreeSet<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    Ok(files.into_iter().collect())
}

/// Match every trace CSV in `trace_dir` into `out_dir`.
///
/// Traces are processed in name order, in groups of `batch_size`.  The
/// matcher sleeps `request_delay_ms` after each trace and
/// `batch_pause_ms` between groups.  Unreadable traces and traces with no
/// matched chunk are counted as failed and retried on the next run.
pub fn match_directory<S: MatchService>(
    matcher:   &MapMatcher<S>,
    trace_dir: &Path,
    out_dir:   &Path,
) -> MatchResult<BatchSummary> {
    let config = matcher.config();
    let files = trace_files(trace_dir)?;
    let mut cursor = BatchCursor::open(out_dir)?;

    let report_path = out_dir.join("match_report.csv");
    let fresh = fs::metadata(&report_path).map(|m| m.len() == 0).unwrap_or(true);
    let report_file = OpenOptions::new().create(true).append(true).open(&report_path)?;
    let mut report = csv::WriterBuilder::new().has_headers(fresh).from_writer(report_file);

    let mut summary = BatchSummary { traces: files.len(), ..BatchSummary::default() };
    let delay = Duration::from_millis(config.request_delay_ms);
    let groups: Vec<&[PathBuf]> = files.chunks(config.batch_size.max(1)).collect();

    for (g, group) in groups.iter().enumerate() {
        info!("batch {}/{}: {} traces", g + 1, groups.len(), group.len());
        for path in group.iter() {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let out = out_dir.join(format!("{id}_matched.json"));
            if cursor.is_done(id) {
                debug!("{id}: already matched, skipping");
                summary.skipped += 1;
                continue;
            }
            if out.exists() {
                match MatchedTrip::load(&out) {
                    Ok(_) => {
                        debug!("{id}: complete output without a done entry, adopting it");
                        cursor.mark_done(id)?;
                        summary.skipped += 1;
                        continue;
                    }
                    Err(e) => warn!("{id}: discarding unreadable output ({e}), matching again"),
                }
            }

            let trace = match load_trace_csv(path) {
                Ok(raw) => CleanedTrace::new(raw.into_iter().map(|p| p.pos).collect()),
                Err(e) => {
                    warn!("{id}: unreadable trace: {e}");
                    summary.failed += 1;
                    continue;
                }
            };

            let outcome = matcher.match_trace(&trace);
            report.serialize(MatchReportRow {
                trace:         id.to_owned(),
                points:        trace.len(),
                chunks_ok:     outcome.chunks_ok,
                chunks_failed: outcome.chunks_failed,
                coverage:      outcome.coverage,
                quality:       outcome.quality.to_string(),
            })?;
            report.flush()?;

            match &outcome.trip {
                Some(trip) => {
                    trip.save(&out)?;
                    cursor.mark_done(id)?;
                    summary.matched += 1;
                    if outcome.quality == MatchQuality::Low {
                        summary.low_coverage += 1;
                        warn!("{id}: low coverage {:.1}%", outcome.coverage * 100.0);
                    } else {
                        info!("{id}: coverage {:.1}%", outcome.coverage * 100.0);
                    }
                }
                None => {
                    warn!("{id}: no chunk matched");
                    summary.failed += 1;
                }
            }

            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        if g + 1 < groups.len() && config.batch_pause_ms > 0 {
            info!("batch {} done; pausing {} ms before the next group", g + 1, config.batch_pause_ms);
            thread::sleep(Duration::from_millis(config.batch_pause_ms));
        }
    }

    info!("{summary}");
    Ok(summary)
}
