//! Command-line front end for wire-chamber stereo reconstruction.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use wirestereo_algorithms::{reconstruct_events, EventReconstruction, ReconstructionStatistics};
use wirestereo_core::{DetectorGeometry, ReconstructionConfig, View, WireId};
use wirestereo_io::{EventFileReader, Settings, TrackFileWriter};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    WirestereoIo(#[from] wirestereo_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] wirestereo_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Unsupported output extension '{0}' (expected csv or json)")]
    OutputFormat(String),
}

/// Wire-chamber stereo matching and 3D track reconstruction.
#[derive(Parser)]
#[command(name = "wirestereo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct 3D tracks from clustered event files
    Reconstruct {
        /// Input event file(s) (JSON)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.csv space points or .json results)
        #[arg(short, long)]
        output: PathBuf,

        /// Settings file with geometry and reconstruction sections
        #[arg(short, long)]
        settings: Option<PathBuf>,

        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Worker threads (defaults to one per core)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Print run statistics as JSON
        #[arg(long)]
        json_stats: bool,
    },

    /// Show information about an event file
    Info {
        /// Input event file (JSON)
        input: PathBuf,

        /// Settings file used to map channels to views
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

/// Command-line values that take precedence over the settings file.
#[derive(Args, Debug, Default)]
struct ConfigOverrides {
    /// Presampling offset subtracted from raw times (ticks)
    #[arg(long)]
    presampling_offset: Option<f64>,

    /// Endpoint match tolerance (samples)
    #[arg(long)]
    match_tolerance_samples: Option<f64>,

    /// Vertex consistency window (ticks)
    #[arg(long)]
    vertex_window_ticks: Option<f64>,

    /// Hit correspondence wire gate (collection wire pitches)
    #[arg(long)]
    wire_gate_pitches: Option<f64>,

    /// Allow each projection in at most one matched pair
    #[arg(long)]
    exclusive: bool,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut ReconstructionConfig) {
        if let Some(ticks) = self.presampling_offset {
            config.presampling_offset = ticks;
        }
        if let Some(samples) = self.match_tolerance_samples {
            config.match_tolerance_samples = samples;
        }
        if let Some(ticks) = self.vertex_window_ticks {
            config.vertex_window_ticks = ticks;
        }
        if let Some(pitches) = self.wire_gate_pitches {
            config.wire_gate_pitches = pitches;
        }
        if self.exclusive {
            config.exclusive_matching = true;
        }
    }
}

/// Output formats picked from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
}

fn output_format(path: &Path) -> Result<OutputFormat> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(OutputFormat::Csv),
        "json" => Ok(OutputFormat::Json),
        _ => Err(CliError::OutputFormat(ext)),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => Ok(Settings::default()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_statistics(stats: &ReconstructionStatistics) {
    println!("Events: {}", stats.events);
    println!(
        "Clusters: {} seen, {} ignored, {} vertex-rejected, {} degenerate",
        stats.clusters_seen,
        stats.clusters_ignored,
        stats.clusters_vertex_rejected,
        stats.clusters_degenerate
    );
    println!(
        "Projections: {} induction, {} collection",
        stats.induction_projections, stats.collection_projections
    );
    println!(
        "Pairs: {} matched, {} discarded",
        stats.matched_pairs, stats.pairs_discarded
    );
    println!("Tracks: {}", stats.tracks);
    println!(
        "Space points: {} ({} hits unmatched)",
        stats.space_points, stats.unmatched_hits
    );
}

/// Reconstructs every event of every input and writes one output file.
///
/// Events that fail are reported and skipped; the rest are written.
fn run_reconstruct(
    input: &[PathBuf],
    output: &Path,
    settings: &Settings,
) -> Result<(Vec<EventReconstruction>, usize)> {
    let format = output_format(output)?;
    settings.validate()?;

    let mut results = Vec::new();
    let mut failed = 0usize;

    for path in input {
        info!("reading {}", path.display());
        let reader = EventFileReader::open(path)?;
        let events = reader.read_events()?;

        for outcome in reconstruct_events(&events, &settings.geometry, &settings.reconstruction) {
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    log::error!("{}: {err}", path.display());
                    failed += 1;
                }
            }
        }
    }

    let mut writer = TrackFileWriter::create(output)?;
    match format {
        OutputFormat::Csv => writer.write_tracks_csv(&results, true)?,
        OutputFormat::Json => writer.write_json(&results)?,
    }
    info!("wrote {}", output.display());

    Ok((results, failed))
}

fn run_info(input: &Path, settings: &Settings) -> Result<()> {
    let reader = EventFileReader::open(input)?;
    let file_size = reader.file_size();
    let events = reader.read_events()?;
    let geometry = &settings.geometry;

    let mut hits = [0usize; 2];
    let mut clusters = [0usize; 2];
    let mut vertices = [0usize; 2];
    let mut other_hits = 0usize;
    let mut other_clusters = 0usize;
    let mut other_vertices = 0usize;

    for event in &events {
        for hit in &event.hits {
            match geometry
                .channel_to_wire(hit.channel)
                .and_then(|WireId { plane, .. }| View::from_plane(plane))
            {
                Some(view) => hits[view.index()] += 1,
                None => other_hits += 1,
            }
        }
        for cluster in &event.clusters {
            match cluster.view() {
                Some(view) => clusters[view.index()] += 1,
                None => other_clusters += 1,
            }
        }
        for vertex in &event.vertices {
            match View::from_plane(vertex.plane) {
                Some(view) => vertices[view.index()] += 1,
                None => other_vertices += 1,
            }
        }
    }

    println!("File: {}", input.display());
    println!(
        "Size: {} bytes ({:.2} MB)",
        file_size,
        file_size as f64 / 1_000_000.0
    );
    println!("Events: {}", events.len());
    println!(
        "{:<12} | {:>10} | {:>10} | {:>10}",
        "View", "Hits", "Clusters", "Vertices"
    );
    println!("{:-<50}", "");
    for view in View::ALL {
        let i = view.index();
        println!(
            "{:<12} | {:>10} | {:>10} | {:>10}",
            view.to_string(),
            hits[i],
            clusters[i],
            vertices[i]
        );
    }
    println!(
        "{:<12} | {:>10} | {:>10} | {:>10}",
        "other", other_hits, other_clusters, other_vertices
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Reconstruct {
            input,
            output,
            settings,
            overrides,
            threads,
            json_stats,
        } => {
            let mut settings = load_settings(settings.as_deref())?;
            overrides.apply(&mut settings.reconstruction);

            if let Some(threads) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()?;
            }

            let start = Instant::now();
            let (results, failed) = run_reconstruct(&input, &output, &settings)?;
            let elapsed = start.elapsed();

            let mut total = ReconstructionStatistics::default();
            for result in &results {
                total.merge(&result.statistics);
            }

            println!(
                "Processed {} files in {:.2}s",
                input.len(),
                elapsed.as_secs_f64()
            );
            if json_stats {
                println!("{}", serde_json::to_string_pretty(&total)?);
            } else {
                print_statistics(&total);
            }
            if failed > 0 {
                println!("Failed events: {}", failed);
            }
        }

        Commands::Info { input, settings } => {
            let settings = load_settings(settings.as_deref())?;
            run_info(&input, &settings)?;
        }
    }

    Ok(())
}
