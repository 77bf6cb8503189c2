//!
//! Command-line driver for drift-tube track reconstruction.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Parser, Subcommand};

use mdtrack_algorithms::{reconstruct, PipelineOptions};
use mdtrack_core::{GeometryTable, ReconstructionConfig, RtRelation};
use mdtrack_io::{read_hits, read_rt_samples, read_timed_hits, HitWriter, TrackWriter};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    MdtrackIo(#[from] mdtrack_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] mdtrack_core::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Drift-tube track reconstruction for multi-layer muon chambers.
#[derive(Parser)]
#[command(name = "mdtrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct tracks from a hit table
    Process {
        /// Input hit CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output track CSV
        #[arg(short, long)]
        output: PathBuf,

        /// JSON configuration file (defaults apply where absent)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the trigger-timestamp window width
        #[arg(long)]
        window_width: Option<i64>,

        /// Override the chi2/ndf acceptance cut
        #[arg(long)]
        chi2ndf_cut: Option<f64>,

        /// Process windows sequentially instead of on the thread pool
        #[arg(long)]
        sequential: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Attach drift radii to a timed hit table via an RT relation
    Radii {
        /// Input hit CSV (drift_radius column optional, ignored)
        #[arg(short, long)]
        input: PathBuf,

        /// RT calibration CSV with time_ns and radius_mm columns
        #[arg(long)]
        rt_table: PathBuf,

        /// Output hit CSV with drift_radius attached
        #[arg(short, long)]
        output: PathBuf,

        /// Drift-time offset subtracted before the RT lookup
        #[arg(long, default_value = "0.0")]
        t0: f64,
    },

    /// Show information about a hit table
    Info {
        /// Input hit CSV
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            config,
            window_width,
            chi2ndf_cut,
            sequential,
            verbose,
        } => {
            let mut config = match config {
                Some(path) => serde_json::from_reader(File::open(path)?)?,
                None => ReconstructionConfig::default(),
            };
            if let Some(width) = window_width {
                config.window_width = width;
            }
            if let Some(cut) = chi2ndf_cut {
                config.chi2ndf_cut = cut;
            }

            if verbose {
                eprintln!("Reading: {}", input.display());
                eprintln!("Window width: {}", config.window_width);
                eprintln!("chi2/ndf cut: {}", config.chi2ndf_cut);
            }

            let start = Instant::now();
            let (store, read_stats) = read_hits(&input)?;
            if verbose {
                eprintln!(
                    "  {} hits loaded, {} rows skipped",
                    read_stats.rows_parsed, read_stats.rows_skipped
                );
                if let Some((t_min, t_max)) = store.trigger_range() {
                    eprintln!("  trigger range: {} - {}", t_min, t_max);
                }
            }

            let geometry = GeometryTable::from_config(&config.geometry);
            let options = PipelineOptions { parallel: !sequential };
            let (bundles, stats) = reconstruct(&store, &geometry, &config, &options)?;

            let mut writer = TrackWriter::create(&output)?;
            writer.write_tracks(&bundles)?;

            let elapsed = start.elapsed();
            println!(
                "Processed {} hits in {:.2}s ({} rows skipped)",
                stats.hits,
                elapsed.as_secs_f64(),
                read_stats.rows_skipped
            );
            println!("Windows: {}", stats.windows);
            println!("Candidates tested: {}", stats.candidates_tested);
            println!("  rejected by chi2 cut: {}", stats.rejected_chi2);
            println!("  degenerate fits: {}", stats.degenerate_fits);
            println!("  unknown addresses: {}", stats.unknown_address);
            println!("Tracks before global dedup: {}", stats.tracks_before_dedup);
            println!("Tracks after global dedup:  {}", stats.tracks_after_dedup);
            println!(
                "Wrote {} rows ({} tracks) to {}",
                stats.tracks_after_dedup * 6,
                stats.tracks_after_dedup,
                output.display()
            );
        }

        Commands::Radii { input, rt_table, output, t0 } => {
            let (samples, sample_stats) = read_rt_samples(&rt_table)?;
            let rt = RtRelation::from_samples(&samples, t0)?;
            let (store, read_stats) = read_timed_hits(&input)?;

            let hits: Vec<_> = store
                .iter()
                .map(|(_, hit)| {
                    let mut with_radius = *hit;
                    with_radius.drift_radius = rt.radius_at(hit.drift_time);
                    with_radius
                })
                .collect();

            let mut writer = HitWriter::create(&output)?;
            writer.write_hits(&hits)?;

            println!(
                "Attached radii to {} hits ({} rows skipped, {} RT samples)",
                hits.len(),
                read_stats.rows_skipped + sample_stats.rows_skipped,
                samples.len()
            );
            println!("Wrote: {}", output.display());
        }

        Commands::Info { input } => {
            let (store, read_stats) = read_timed_hits(&input)?;
            println!("File: {}", input.display());
            println!("Hits: {}", store.len());
            println!("Rows skipped: {}", read_stats.rows_skipped);

            if let Some((t_min, t_max)) = store.trigger_range() {
                println!("Trigger range: {} - {}", t_min, t_max);
            }
            if !store.is_empty() {
                let min_module = store.iter().map(|(_, h)| h.module).min().unwrap();
                let max_module = store.iter().map(|(_, h)| h.module).max().unwrap();
                let min_channel = store.iter().map(|(_, h)| h.channel).min().unwrap();
                let max_channel = store.iter().map(|(_, h)| h.channel).max().unwrap();
                println!("Module range: {} - {}", min_module, max_module);
                println!("Channel range: {} - {}", min_channel, max_channel);
            }
        }
    }

    Ok(())
}
