//! zhsub - Subtitle preparation pipeline for Traditional Chinese translation
//!
//! Entry point for the command line tool. Each subcommand runs one stage of
//! the pipeline (or the preprocess + extract pair) over a project directory.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zhsub::cli::{Args, Commands, ConfigAction, StageDirs};
use zhsub::config::Config;
use zhsub::stage::{FileReport, StageKind};
use zhsub::workflow::{BatchReport, Workflow};

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
            // Try to load config.toml from current directory first
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let workflow = Workflow::new(config)?.with_progress(!args.json);

    // Execute command
    let reports = match args.command {
        Commands::Preprocess(dirs) => {
            vec![run_stage(&workflow, StageKind::Preprocess, &dirs).await?]
        }
        Commands::Extract(dirs) => {
            vec![run_stage(&workflow, StageKind::Extract, &dirs).await?]
        }
        Commands::Assemble(dirs) => {
            vec![run_stage(&workflow, StageKind::Assemble, &dirs).await?]
        }
        Commands::Run { path } => workflow.run_pipeline(&path).await?,
        Commands::Normalize { input, output } => {
            let output = match output {
                Some(path) => path,
                None => {
                    let suffix = &workflow.config().preprocess.cleaned_suffix;
                    default_normalized_path(&input, suffix)?
                }
            };
            let report = workflow.run_file(StageKind::Preprocess, &input, &output).await?;
            print_file_report(&report, args.json)?;
            return Ok(());
        }
        Commands::Config { action } => return run_config_action(&action, workflow.config()),
    };

    let failed: usize = reports.iter().map(|r| r.failed.len()).sum();
    print_batch_reports(&reports, args.json)?;

    if failed > 0 {
        anyhow::bail!("{} file(s) failed", failed);
    }

    Ok(())
}

async fn run_stage(workflow: &Workflow, kind: StageKind, dirs: &StageDirs) -> Result<BatchReport> {
    let (default_input, default_output) = workflow.stage_dirs(kind, &dirs.path);

    if !dirs.path.is_dir() {
        anyhow::bail!("The specified path '{}' is not a valid directory", dirs.path.display());
    }

    let input_dir = match &dirs.input {
        Some(name) => dirs.path.join(name),
        None => default_input,
    };
    let output_dir = match &dirs.output {
        Some(name) => dirs.path.join(name),
        None => default_output,
    };

    Ok(workflow.run_directory(kind, &input_dir, &output_dir).await?)
}

fn run_config_action(action: &ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "{} already exists, use --force to overwrite",
                    output.display()
                );
            }
            Config::default().save_to_file(output)?;
            println!("Wrote default configuration to {}", output.display());
        }
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}

fn default_normalized_path(input: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| anyhow::anyhow!("Invalid input filename: {}", input.display()))?
        .to_string_lossy();
    Ok(input.with_file_name(format!("{}{}.srt", stem, suffix)))
}

fn print_batch_reports(reports: &[BatchReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!(
            "\n{} ({} -> {})",
            report.stage,
            report.input_dir.display(),
            report.output_dir.display()
        );
        println!("{:<50} {:>8} {:>8}", "File", "In", "Out");
        println!("{}", "-".repeat(68));
        for file in &report.processed {
            println!(
                "{:<50} {:>8} {:>8}",
                file_name(&file.input),
                file.items_in,
                file.items_out
            );
        }
        for failure in &report.failed {
            println!("{:<50} FAILED: {}", file_name(&failure.input), failure.error);
        }
    }

    Ok(())
}

fn print_file_report(report: &FileReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!(
            "Processed '{}' -> '{}' ({} cues -> {})",
            file_name(&report.input),
            file_name(&report.output),
            report.items_in,
            report.items_out
        );
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".zhsub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "zhsub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("zhsub.log").display());

    Ok(())
}
