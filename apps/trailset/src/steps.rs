//! One function per pipeline stage.  Each logs its own summary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use ts_dataset::{associate_directory, AssociationReport, CsvWriter, DatasetWriter, EdgeAssociator};
use ts_enrich::EdgeEnricher;
use ts_graph::RoadGraph;
use ts_match::{match_directory, BatchSummary, MapMatcher, ValhallaService};
use ts_raster::RasterMosaic;
use ts_trace::{load_trace_csv, write_trace_csv, CleanReport, TraceCleaner};

use crate::config::PipelineConfig;

/// Dataset backend selected on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Sqlite,
    Parquet,
}

pub fn load_graph(path: &Path) -> Result<RoadGraph> {
    let graph = RoadGraph::load_json(path).with_context(|| format!("loading graph {}", path.display()))?;
    info!("graph {}: {} nodes, {} edges", path.display(), graph.node_count(), graph.edge_count());
    Ok(graph)
}

fn open_raster(path: &Path, what: &str) -> Result<RasterMosaic> {
    let mosaic = RasterMosaic::open(path).with_context(|| format!("loading {what} {}", path.display()))?;
    info!("{what}: {} tile(s) from {}", mosaic.tiles().len(), path.display());
    Ok(mosaic)
}

/// Files directly under `dir` with extension `ext`, sorted by name.
fn files_with_ext(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|x| x.eq_ignore_ascii_case(ext)))
        .collect();
    files.sort();
    Ok(files)
}

// ── enrich ────────────────────────────────────────────────────────────────────

/// Run every enrichment pass over `graph` in place.
pub fn enrich(cfg: &PipelineConfig, graph: &mut RoadGraph, dem: &Path, heatmap: &Path) -> Result<()> {
    let dem = open_raster(dem, "DEM")?;
    let heatmap = open_raster(heatmap, "heatmap")?;
    let enricher = EdgeEnricher::new(cfg.enrich.clone())?;
    enricher.run(graph, Some(&dem), Some(&heatmap));
    Ok(())
}

// ── clean ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CleanSummary {
    pub traces:   usize,
    pub accepted: usize,
    pub rejected: usize,
    pub report:   CleanReport,
}

/// Clean and filter every trace CSV in `input`, writing accepted traces to
/// `out` under the same file name.
pub fn clean(cfg: &PipelineConfig, graph: Option<&RoadGraph>, input: &Path, out: &Path) -> Result<CleanSummary> {
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let mut cleaner = TraceCleaner::new(cfg.cleaner.clone());
    if let Some(g) = graph {
        cleaner = cleaner.with_graph(g);
    }
    let mut filter = cfg.filter.clone();
    let mut summary = CleanSummary::default();

    for path in files_with_ext(input, "csv")? {
        summary.traces += 1;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let raw = match load_trace_csv(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{name}: unreadable: {e}");
                summary.rejected += 1;
                continue;
            }
        };

        let (outcome, report) = cleaner.clean(&raw);
        summary.report.merge(&report);
        let Some(trace) = outcome.into_trace() else {
            debug!("{name}: rejected: too few points after cleaning");
            summary.rejected += 1;
            continue;
        };

        let verdict = filter.check(raw.len(), &trace);
        if !verdict.is_accept() {
            debug!("{name}: rejected: {verdict}");
            summary.rejected += 1;
            continue;
        }
        write_trace_csv(&out.join(&name), &trace).with_context(|| format!("writing cleaned {name}"))?;
        summary.accepted += 1;
    }

    info!(
        "cleaned {} traces: {} accepted, {} rejected ({} speed drops, {} gaps routed, {} gaps interpolated)",
        summary.traces,
        summary.accepted,
        summary.rejected,
        summary.report.dropped_speed,
        summary.report.gaps_routed,
        summary.report.gaps_interpolated
    );
    Ok(summary)
}

// ── match ─────────────────────────────────────────────────────────────────────

pub fn match_traces(cfg: &PipelineConfig, input: &Path, out: &Path) -> Result<BatchSummary> {
    let service = ValhallaService::new(&cfg.matching)?;
    let matcher = MapMatcher::new(service, cfg.matching.clone());
    Ok(match_directory(&matcher, input, out)?)
}

// ── associate ─────────────────────────────────────────────────────────────────

fn dataset_writer(format: OutputFormat, out: &Path) -> Result<Box<dyn DatasetWriter>> {
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(out)?),
        #[cfg(feature = "sqlite")]
        OutputFormat::Sqlite => Box::new(ts_dataset::SqliteWriter::new(out)?),
        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => Box::new(ts_dataset::ParquetWriter::new(out)?),
        #[allow(unreachable_patterns)]
        other => bail!("{other:?} output needs the `{}` feature", format!("{other:?}").to_lowercase()),
    })
}

pub fn associate(
    cfg:    &PipelineConfig,
    graph:  &RoadGraph,
    input:  &Path,
    out:    &Path,
    format: OutputFormat,
) -> Result<AssociationReport> {
    let associator = EdgeAssociator::new(graph, cfg.associator.clone());
    let mut writer = dataset_writer(format, out)?;
    Ok(associate_directory(&associator, input, cfg.matching.shape_precision, &mut writer)?)
}
