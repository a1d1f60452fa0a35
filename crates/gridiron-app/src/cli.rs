// Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default location of the pipeline configuration, relative to the working
/// directory. A missing file here is not an error.
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

#[derive(Parser, Debug)]
#[command(name = "gridiron")]
#[command(about = "Validate, rank and defense-adjust scraped NFL statistics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to pipeline.toml (defaults to config/pipeline.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a validation report for a scraped dataset
    Validate {
        /// Scraped dataset (JSON)
        input: PathBuf,
    },
    /// Write a copy of the dataset with invalid records removed
    Clean {
        /// Scraped dataset (JSON)
        input: PathBuf,
        /// Output file (defaults to <output dir>/cleaned_<year>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rank defenses and adjust players, writing JSON and CSV results
    Transform {
        /// Scraped dataset (JSON)
        input: PathBuf,
        /// Output directory (defaults to the configured output dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip removing invalid records before transforming
        #[arg(long)]
        no_clean: bool,
    },
}
