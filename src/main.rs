//! Kireme - Segment & Subtitle Reconciliation Engine
//!
//! Command-line entry point: cuts media into part files from user-chosen
//! cut points, reconciles previously generated outputs, and merges
//! per-segment subtitle tracks into one SubRip file per language.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use kireme::cli::{Args, Commands};
use kireme::config::Config;
use kireme::confirm::AnswerAll;
use kireme::error::KiremeError;
use kireme::merge::MergeStatus;
use kireme::runner::{EngineRunner, OperationOutcome, log_outcome};
use kireme::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let workflow = Arc::new(Workflow::new(config)?);
    let mut runner = EngineRunner::new();

    match args.command {
        Commands::Plan { input, cuts } => {
            let cut_points = parse_cut_points(&cuts)?;
            let segments = workflow.plan(&input, &cut_points).await?;

            println!("\nPlanned segments for {}:", input.display());
            println!("{:<6} {:>12} {:>12} {:>12}", "Part", "Start (s)", "End (s)", "Length (s)");
            println!("{}", "-".repeat(46));
            for (i, segment) in segments.iter().enumerate() {
                println!(
                    "{:<6} {:>12.3} {:>12.3} {:>12.3}",
                    i + 1,
                    segment.start,
                    segment.end,
                    segment.length()
                );
            }
        }
        Commands::Cut { input, cuts, base_name, yes } => {
            let cut_points = parse_cut_points(&cuts)?;
            let base_name = match base_name {
                Some(name) => name,
                None => input
                    .file_stem()
                    .ok_or_else(|| KiremeError::Config("Invalid source filename".to_string()))?
                    .to_string_lossy()
                    .to_string(),
            };
            info!("Cutting {} as '{}'", input.display(), base_name);

            let worker = Arc::clone(&workflow);
            let worker_base = base_name.clone();
            runner.submit(&base_name, async move {
                let outcome = worker
                    .cut(&input, &worker_base, &cut_points, &AnswerAll(yes))
                    .await;
                OperationOutcome::Cut(outcome)
            })?;

            while let Some(event) = runner.next_event().await {
                log_outcome(&event);
                match event.outcome {
                    OperationOutcome::Cut(Ok(outcome)) => {
                        println!("\nCut '{}' into {} part(s):", event.base_name, outcome.new_files.len());
                        for path in &outcome.new_files {
                            println!("  {}", path.display());
                        }
                        if !outcome.deleted_files.is_empty() {
                            println!("Deleted {} orphan file(s)", outcome.deleted_files.len());
                        }
                        if !outcome.failed_deletes.is_empty() {
                            println!("Failed to delete {} file(s); see log", outcome.failed_deletes.len());
                        }
                    }
                    OperationOutcome::Cut(Err(KiremeError::Cancelled)) => {
                        println!("Cut cancelled: destructive steps need confirmation (re-run with --yes)");
                    }
                    OperationOutcome::Cut(Err(e)) => return Err(e.into()),
                    _ => {}
                }
            }
        }
        Commands::Status { dir, base_name } => {
            let report = workflow.completeness(&dir, &base_name)?;

            if report.is_empty() {
                println!("No subtitle part files found for '{}'.", base_name);
            } else {
                println!("\nSubtitle completeness for '{}':", base_name);
                println!("{:<10} {:<10} {}", "Language", "Status", "Missing parts");
                println!("{}", "-".repeat(40));
                for (language, missing) in &report {
                    if missing.is_empty() {
                        println!("{:<10} {:<10}", language, "complete");
                    } else {
                        let indices: Vec<String> = missing.iter().map(|i| i.to_string()).collect();
                        println!("{:<10} {:<10} {}", language, "partial", indices.join(", "));
                    }
                }
            }
        }
        Commands::Merge { dir, base_name, langs, yes } => {
            let languages: Vec<String> = langs
                .map(|l| l.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default();

            let worker = Arc::clone(&workflow);
            let worker_base = base_name.clone();
            runner.submit(&base_name, async move {
                let report = worker
                    .merge(&dir, &worker_base, &languages, &AnswerAll(yes))
                    .await;
                OperationOutcome::Merge(report)
            })?;

            while let Some(event) = runner.next_event().await {
                log_outcome(&event);
                match event.outcome {
                    OperationOutcome::Merge(Ok(report)) => {
                        println!(
                            "\nMerge finished: {} succeeded, {} failed",
                            report.succeeded(),
                            report.failed()
                        );
                        for (language, status) in &report.results {
                            print_merge_status(language, status);
                        }
                        if let Some((language, status)) = &report.duplicate {
                            print_merge_status(&format!("{} (copy)", language), status);
                        }
                    }
                    OperationOutcome::Merge(Err(KiremeError::Cancelled)) => {
                        println!("Merge cancelled: overwriting needs confirmation (re-run with --yes)");
                    }
                    OperationOutcome::Merge(Err(e)) => return Err(e.into()),
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn print_merge_status(language: &str, status: &MergeStatus) {
    match status {
        MergeStatus::Succeeded { output } => {
            println!("  {:<12} -> {}", language, output.display());
        }
        MergeStatus::Failed { reason } => {
            println!("  {:<12} failed: {}", language, reason);
        }
    }
}

/// Parse a comma-separated cut point list like "5.0, 40.0".
fn parse_cut_points(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|e| {
                KiremeError::Config(format!("Invalid cut point '{}': {}", s, e)).into()
            })
        })
        .collect()
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let kireme_dir = std::env::current_dir()?.join(".kireme");
    let log_dir = kireme_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "kireme.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("kireme.log").display()
    );

    Ok(())
}
