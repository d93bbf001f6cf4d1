//! Handler for the `epochs` command.

use std::path::PathBuf;

use crate::app::export;
use crate::cli::command::EpochsArgs;
use crate::cli::{config as config_cmd, output};
use crate::error::{ReaderError, Result};
use crate::reader::{self, Recording};

/// Execute `epochs`: resample an epoch recording and export it as CSV.
pub fn execute(args: &EpochsArgs) -> Result<()> {
    let config = config_cmd::resolve_config(&args.config)?;
    config.logging.init();

    let spinner = output::spinner(&format!("Reading {}", args.input.display()));
    let recording = reader::read_recording(&args.input);
    match &recording {
        Ok(_) => output::spinner_success(&spinner, "Read recording"),
        Err(_) => output::spinner_fail(&spinner, "Read failed"),
    }

    let epochs = match recording? {
        Recording::Epochs(epochs) => epochs,
        Recording::Raw(_) => {
            return Err(ReaderError::NotEpochData {
                path: args.input.display().to_string(),
            }
            .into())
        }
    };

    let target_secs = args.length.unwrap_or(config.epoch.length_secs);
    let resampled = epochs.resample(target_secs)?;
    let output_path = output_path(args, &config);
    export::write_epochs(&output_path, &resampled)?;

    output::section("Epochs");
    output::field("Input", format!("{} epochs of {}s", epochs.len(), epochs.epoch_length_secs()));
    output::field("Output", format!("{} epochs of {}s", resampled.len(), target_secs));
    output::success(&format!("Wrote {}", output_path.display()));

    Ok(())
}

/// Output path: explicit `--output`, else `<stem>_epochs.csv` in the
/// configured output directory.
fn output_path(args: &EpochsArgs, config: &crate::app::Config) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }
    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording");
    config
        .output
        .directory
        .join(format!("{stem}_epochs.csv"))
}
