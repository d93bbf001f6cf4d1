//! Handler for the `info` command.

use std::path::Path;

use crate::cli::output;
use crate::error::Result;
use crate::reader::{self, RecordingDetail};

/// Execute `info`: probe a recording file and print its metadata.
pub fn execute(path: &Path) -> Result<()> {
    let spinner = output::spinner(&format!("Probing {}", path.display()));
    let probed = reader::probe(path);
    match &probed {
        Ok(_) => output::spinner_success(&spinner, "Probed recording"),
        Err(_) => output::spinner_fail(&spinner, "Probe failed"),
    }
    let info = probed?;

    if output::is_json() {
        output::json_output(serde_json::to_value(&info)?);
        return Ok(());
    }

    output::section("Recording");
    output::field("File", path.display());
    output::field("Format", info.format);
    output::field("Start", info.start.format("%Y-%m-%d %H:%M:%S"));
    output::field("Duration", format_duration(info.duration_secs));

    match &info.detail {
        Some(RecordingDetail::Raw {
            sample_rate_hz,
            samples,
        }) => {
            output::field("Data", "raw acceleration");
            output::field("Rate", format!("{sample_rate_hz}Hz"));
            output::field("Samples", samples);
        }
        Some(RecordingDetail::Epochs {
            epoch_length_secs,
            count,
        }) => {
            output::field("Data", "epoch counts");
            output::field("Epoch", format!("{epoch_length_secs}s"));
            output::field("Epochs", count);
        }
        None => {
            output::field("Data", "none");
            output::note("file carries no acceleration channels");
        }
    }

    if !info.channels.is_empty() {
        output::field("Channels", info.channels.join(", "));
    }

    Ok(())
}

/// Render a duration in the largest two useful units.
fn format_duration(secs: f64) -> String {
    let total = secs.round() as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}
