//! Command-line interface definitions.
//!
//! Defines the CLI structure for the wearwolf application using `clap`.
//! The CLI supports subcommands for detecting non-wear time, comparing
//! algorithms against reference annotations, inspecting and resampling
//! recordings, and managing configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Non-wear detection and algorithm comparison for wearable recordings
#[derive(Parser, Debug)]
#[command(name = "wearwolf")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the wearwolf CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect non-wear periods in a recording
    Detect(DetectArgs),

    /// Score detections against reference annotations
    Compare(CompareArgs),

    /// Resample a recording's epoch counts and export them
    Epochs(EpochsArgs),

    /// Show what a recording file contains
    Info(InfoArgs),

    /// Explore available detection algorithms
    #[command(subcommand)]
    Algorithms(AlgorithmCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Initialize configuration interactively
    Init(InitArgs),
}

/// Subcommands for `wearwolf algorithms`.
///
/// Provides exploration and documentation of the built-in non-wear
/// detection algorithms.
#[derive(Subcommand, Debug)]
pub enum AlgorithmCommand {
    /// List all built-in detection algorithms.
    List,
    /// Display detailed explanation of a specific algorithm.
    Explain {
        /// Name of the algorithm to explain (e.g., "choi_2011").
        name: String,
    },
}

/// Subcommands for `wearwolf config`.
///
/// Provides configuration management utilities including generation,
/// display, and validation of configuration files.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
///
/// Provides a reusable argument definition with a default path to the
/// standard configuration file location.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `detect` subcommand.
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Recording file to classify (.gt3x, .edf, or .csv).
    pub input: PathBuf,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Comma-separated list of algorithms to run (e.g., "choi_2011,hees_2013").
    ///
    /// Overrides the enabled list from configuration. Selecting an
    /// algorithm the input cannot feed is an error.
    #[arg(short, long)]
    pub algorithms: Option<String>,

    /// Write detected intervals to a CSV file.
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

/// Arguments for the `compare` subcommand.
///
/// Runs in one of two modes: a single recording scored against one
/// annotation file, or a directory of recordings paired with a directory
/// of annotation files by file stem.
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Recording file to evaluate.
    #[arg(
        required_unless_present = "recordings_dir",
        conflicts_with = "recordings_dir",
        requires = "reference"
    )]
    pub input: Option<PathBuf>,

    /// Reference annotation CSV with true non-wear intervals.
    #[arg(short, long, conflicts_with = "annotations_dir")]
    pub reference: Option<PathBuf>,

    /// Directory of recordings to evaluate as a batch.
    #[arg(long, requires = "annotations_dir")]
    pub recordings_dir: Option<PathBuf>,

    /// Directory of annotation CSVs, paired with recordings by file stem.
    #[arg(long, requires = "recordings_dir")]
    pub annotations_dir: Option<PathBuf>,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Comma-separated list of algorithms to run.
    #[arg(short, long)]
    pub algorithms: Option<String>,

    /// Write per-recording and pooled metrics to a CSV file.
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Number of recordings to process in parallel (default: CPU count).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for the `epochs` subcommand.
#[derive(Parser, Debug)]
pub struct EpochsArgs {
    /// Epoch recording to resample (.csv epoch export).
    pub input: PathBuf,

    /// Target epoch length in seconds (default: from configuration).
    #[arg(short, long)]
    pub length: Option<u32>,

    /// Output CSV path (default: derived from the input name).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `info` subcommand.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Recording file to inspect.
    pub input: PathBuf,
}

/// Arguments for the `config init` subcommand.
///
/// Controls configuration file generation from the built-in template.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the generated configuration file.
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,
    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the interactive `init` command.
///
/// Controls the interactive configuration wizard that guides users through
/// initial setup.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output path for the generated configuration file.
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}
