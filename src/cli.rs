use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print run reports as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Project directory and the subdirectories a stage reads from and writes to
#[derive(ClapArgs, Debug, Clone)]
pub struct StageDirs {
    /// Project directory containing the stage subdirectories
    #[arg(short, long)]
    pub path: PathBuf,

    /// Input subdirectory name (defaults to the configured one)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output subdirectory name (defaults to the configured one)
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean raw SRT files: merge multi-line cues and join unfinished sentences
    Preprocess(StageDirs),

    /// Extract preprocessed SRT files into CSV
    Extract(StageDirs),

    /// Re-assemble translated CSV files into SRT
    Assemble(StageDirs),

    /// Preprocess and extract a project directory in one go
    Run {
        /// Project directory containing the raw subtitles folder
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Preprocess a single SRT file
    Normalize {
        /// Input SRT file
        #[arg(short, long)]
        input: PathBuf,

        /// Output SRT file (defaults to <stem>_cleaned.srt next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration to a file
    Init {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}
