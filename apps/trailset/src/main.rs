//! trailset: builds a per-edge training dataset from a road graph, an
//! elevation model, a popularity heatmap, and a directory of GPS traces.
//!
//! ```text
//! trailset enrich    --graph g.json --dem dem/ --heatmap heat.asc --out g_enriched.json
//! trailset clean     --input raw/ --out clean/ [--graph g_enriched.json]
//! trailset match     --input clean/ --out matched/
//! trailset associate --graph g_enriched.json --input matched/ --out dataset/
//! trailset run       --graph g.json --dem dem/ --heatmap heat.asc --traces raw/ --work work/
//! ```
//!
//! Stage settings come from `--config <file.json>` (see `config.rs`);
//! `RUST_LOG` or `-v` controls logging.

mod config;
mod steps;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use config::PipelineConfig;
use steps::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON pipeline configuration.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Write dplus, distance and popularity onto every graph edge
    Enrich {
        #[arg(long)]
        graph: PathBuf,
        /// DEM tile directory or single ASCII grid
        #[arg(long)]
        dem: PathBuf,
        #[arg(long)]
        heatmap: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Clean and filter raw trace CSVs
    Clean {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Graph used to route across gaps; gaps are interpolated without one
        #[arg(long)]
        graph: Option<PathBuf>,
    },
    /// Map-match cleaned traces (resumable)
    Match {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Turn matched traces into dataset rows
    Associate {
        /// Enriched graph
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// All stages, with intermediate files under --work
    Run {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        dem: PathBuf,
        #[arg(long)]
        heatmap: PathBuf,
        #[arg(long)]
        traces: PathBuf,
        #[arg(long)]
        work: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let cfg = PipelineConfig::load(args.config.as_deref())?;

    match args.cmd {
        Command::Enrich { graph, dem, heatmap, out } => {
            let mut g = steps::load_graph(&graph)?;
            steps::enrich(&cfg, &mut g, &dem, &heatmap)?;
            g.save_json(&out).with_context(|| format!("writing {}", out.display()))?;
            info!("enriched graph written to {}", out.display());
        }
        Command::Clean { input, out, graph } => {
            let g = graph.as_deref().map(steps::load_graph).transpose()?;
            steps::clean(&cfg, g.as_ref(), &input, &out)?;
        }
        Command::Match { input, out } => {
            steps::match_traces(&cfg, &input, &out)?;
        }
        Command::Associate { graph, input, out, format } => {
            let g = steps::load_graph(&graph)?;
            steps::associate(&cfg, &g, &input, &out, format)?;
        }
        Command::Run { graph, dem, heatmap, traces, work, format } => {
            std::fs::create_dir_all(&work).with_context(|| format!("creating {}", work.display()))?;
            let mut g = steps::load_graph(&graph)?;
            steps::enrich(&cfg, &mut g, &dem, &heatmap)?;
            let enriched = work.join("graph_enriched.json");
            g.save_json(&enriched).with_context(|| format!("writing {}", enriched.display()))?;

            let clean_dir = work.join("clean");
            let matched_dir = work.join("matched");
            steps::clean(&cfg, Some(&g), &traces, &clean_dir)?;
            steps::match_traces(&cfg, &clean_dir, &matched_dir)?;
            let report = steps::associate(&cfg, &g, &matched_dir, &work.join("dataset"), format)?;
            info!("pipeline done: {report}");
        }
    }
    Ok(())
}
