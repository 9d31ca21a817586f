//! Touch Gesture Features CLI
//!
//! Extracts per-gesture feature tables from touch logs and scores them.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use touch_gesture_features::{
    config::Config,
    core::{self, ExportMeta, ExtractOptions, FeatureTable, OutputFormat, PipelineError},
    model::{Scorer, Verdict},
    report::{create_shared_log_with_persistence, PersistedStats},
    stream, table_header, VERSION,
};
use tracing_subscriber::EnvFilter;

/// Exit code when the log holds no complete gesture.
const EXIT_NO_GESTURES: i32 = 2;

#[derive(Parser)]
#[command(name = "touch-features")]
#[command(version = VERSION)]
#[command(about = "Touch gesture segmentation and feature extraction", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one feature row per gesture from a touch log
    Extract {
        /// Touch log CSV
        #[arg(long, short)]
        input: PathBuf,

        /// Output file (defaults to a timestamped file in the export directory)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Time tolerance around each gesture, in milliseconds
        #[arg(long)]
        padding: Option<u32>,

        /// Output format (csv, json or jsonl)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Drop repeated samples before segmentation
        #[arg(long)]
        dedup: bool,
    },

    /// Score a feature table with a trained boundary model
    Score {
        /// Feature table CSV written by `extract`
        #[arg(long, short)]
        features: PathBuf,

        /// Normalization parameters JSON
        #[arg(long)]
        scaler: Option<PathBuf>,

        /// Boundary-model parameters JSON
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output file (.csv or .json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the feature table header
    Schema,

    /// Show configuration
    Config,

    /// Show cumulative extraction statistics
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load().context("loading configuration")?;

    match cli.command {
        Commands::Extract {
            input,
            output,
            padding,
            format,
            dedup,
        } => cmd_extract(&config, &input, output, padding, format, dedup),
        Commands::Score {
            features,
            scaler,
            model,
            output,
        } => cmd_score(&config, &features, scaler, model, output),
        Commands::Schema => {
            cmd_schema();
            Ok(())
        }
        Commands::Config => cmd_config(&config),
        Commands::Status => {
            cmd_status(&config);
            Ok(())
        }
    }
}

fn cmd_extract(
    config: &Config,
    input: &Path,
    output: Option<PathBuf>,
    padding: Option<u32>,
    format: Option<OutputFormat>,
    dedup: bool,
) -> Result<()> {
    let options = ExtractOptions {
        padding_ms: padding.unwrap_or(config.padding_ms),
        dedup_samples: dedup || config.dedup_samples,
    };
    let format = format.unwrap_or(config.output_format);

    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let log = create_shared_log_with_persistence(config.stats_path());
    let stream =
        stream::read_stream(input).with_context(|| format!("reading touch log {input:?}"))?;

    println!("Touch Gesture Features v{VERSION}");
    println!("  Input: {input:?} ({} samples)", stream.len());
    println!("  Padding: {} ms", options.padding_ms);
    println!("  De-duplication: {}", if options.dedup_samples { "on" } else { "off" });
    println!();

    let table = match core::run(stream, &options, &log) {
        Ok(table) => table,
        Err(PipelineError::NoGestures) => {
            eprintln!("No complete gesture (press, slide, release) found in {input:?}.");
            eprintln!("Nothing to write.");
            if let Err(e) = log.save() {
                eprintln!("Warning: Could not save extraction stats: {e}");
            }
            std::process::exit(EXIT_NO_GESTURES);
        }
        Err(e) => return Err(e).context("extracting features"),
    };

    let output_path = output.unwrap_or_else(|| {
        config.export_path.join(format!(
            "features_{}.{}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            format.extension()
        ))
    });

    let meta = ExportMeta::new(log.run_id(), options.padding_ms);
    table
        .save(&output_path, format, &meta)
        .with_context(|| format!("writing feature table {output_path:?}"))?;

    println!("Wrote {} gesture rows to {:?}", table.len(), output_path);

    if let Err(e) = log.save() {
        eprintln!("Warning: Could not save extraction stats: {e}");
    }

    println!();
    println!("{}", log.summary());
    Ok(())
}

fn cmd_score(
    config: &Config,
    features: &Path,
    scaler: Option<PathBuf>,
    model: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let scaler_path = scaler.unwrap_or_else(|| config.scaler_path.clone());
    let model_path = model.unwrap_or_else(|| config.model_path.clone());

    let table = FeatureTable::load_csv(features)
        .with_context(|| format!("reading feature table {features:?}"))?;
    let scorer = Scorer::load(&scaler_path, &model_path)
        .context("loading model artifacts")?
        .with_min_gestures(config.min_gestures);
    let report = scorer.score_table(&table).context("scoring gestures")?;

    if let Some(path) = output {
        let file =
            File::create(&path).with_context(|| format!("creating score report {path:?}"))?;
        let writer = BufWriter::new(file);
        let is_json = path.extension().map(|e| e == "json").unwrap_or(false);
        if is_json {
            report.write_json(writer)?;
        } else {
            report.write_csv(writer)?;
        }
        println!("Wrote {} scores to {:?}", report.scores.len(), path);
    } else {
        report.write_csv(std::io::stdout().lock())?;
    }

    println!();
    println!("{}", report.summary());

    match report.verdict() {
        Verdict::Owner => println!("Verdict: gestures match the device owner"),
        Verdict::NotOwner => println!("Verdict: gestures do not match the device owner"),
        Verdict::Insufficient => eprintln!(
            "Not enough gestures for a verdict (need {}, got {}).",
            report.min_gestures,
            report.scores.len()
        ),
    }
    Ok(())
}

fn cmd_schema() {
    println!("{}", table_header().join(","));
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn cmd_status(config: &Config) {
    println!("Touch Gesture Features Status");
    println!("=============================");
    println!();

    println!("Configuration:");
    println!("  Padding: {} ms", config.padding_ms);
    println!("  De-duplication: {}", config.dedup_samples);
    println!("  Output format: {}", config.output_format.extension());
    println!(
        "  Scaler parameters: {:?} ({})",
        config.scaler_path,
        if config.scaler_path.exists() { "found" } else { "missing" }
    );
    println!(
        "  Model parameters: {:?} ({})",
        config.model_path,
        if config.model_path.exists() { "found" } else { "missing" }
    );
    println!();

    let stats_path = config.stats_path();
    if !stats_path.exists() {
        println!("No previous extraction runs found.");
        return;
    }

    match PersistedStats::read(&stats_path) {
        Ok(stats) => {
            println!("Cumulative Statistics:");
            println!("  Runs: {}", stats.runs);
            println!("  Samples read: {}", stats.samples_read);
            println!("  Duplicate samples dropped: {}", stats.duplicates_dropped);
            println!("  Actions detected: {}", stats.segments_detected);
            println!("  Actions discarded: {}", stats.gestures_discarded);
            println!("  Feature rows written: {}", stats.rows_emitted);
            if let Some(updated) = stats.last_updated {
                println!("  Last run: {}", updated.to_rfc3339());
            }
        }
        Err(e) => eprintln!("Warning: Could not read extraction stats: {e}"),
    }
}
