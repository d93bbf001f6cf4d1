//! Readers for the recording formats the comparison consumes.
//!
//! Four on-disk formats are supported:
//!
//! - **.gt3x** - ActiGraph archives with raw acceleration samples
//! - **.edf** - European Data Format, as written by ECG holters and
//!   combined recorders; acceleration channels are picked out by label
//! - **.csv** - ActiLife exports (banner header) and plain exports, both
//!   in raw-sample and epoch-count form
//!
//! [`read_recording`] sniffs the format and returns whichever data kind
//! the file carries; [`probe`] returns metadata without requiring the
//! file to contain acceleration data at all.

mod actilife;
mod annotations;
mod csv_epoch;
mod csv_raw;
mod edf;
mod gt3x;

pub use annotations::read_annotations;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::algorithm::DetectionContext;
use crate::domain::{EpochSeries, RawRecording};
use crate::error::ReaderError;

/// A recording loaded from disk, in whichever form the file carried.
#[derive(Debug, Clone)]
pub enum Recording {
    /// Raw acceleration samples.
    Raw(RawRecording),
    /// Epoch activity counts.
    Epochs(EpochSeries),
}

impl Recording {
    /// Timestamp of the first sample or epoch.
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        match self {
            Recording::Raw(raw) => raw.start(),
            Recording::Epochs(epochs) => epochs.start(),
        }
    }

    /// Build a detection context borrowing this recording's data.
    #[must_use]
    pub fn context(&self) -> DetectionContext<'_> {
        match self {
            Recording::Raw(raw) => DetectionContext::new().with_raw(raw),
            Recording::Epochs(epochs) => DetectionContext::new().with_epochs(epochs),
        }
    }
}

/// What a recording file contains, per data kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordingDetail {
    Raw { sample_rate_hz: u32, samples: usize },
    Epochs { epoch_length_secs: u32, count: usize },
}

/// Metadata about a recording file.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingInfo {
    /// Short format name, e.g. `gt3x` or `actilife-csv`.
    pub format: &'static str,
    /// Timestamp of the first sample or epoch.
    pub start: NaiveDateTime,
    /// Recording length in seconds.
    pub duration_secs: f64,
    /// Data carried by the file, absent for files without acceleration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<RecordingDetail>,
    /// Signal labels, for formats that name their channels.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
}

/// Supported on-disk layouts, resolved by extension and content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Gt3x,
    Edf,
    ActiLifeRaw,
    ActiLifeEpoch,
    PlainRaw,
    PlainEpoch,
}

/// Read a recording file, returning whichever data kind it carries.
pub fn read_recording(path: &Path) -> Result<Recording, ReaderError> {
    match detect_format(path)? {
        Format::Gt3x => Ok(Recording::Raw(gt3x::read(path)?)),
        Format::Edf => Ok(Recording::Raw(edf::read(path)?)),
        Format::ActiLifeRaw => Ok(Recording::Raw(csv_raw::read_actilife(path)?)),
        Format::PlainRaw => Ok(Recording::Raw(csv_raw::read_plain(path)?)),
        Format::ActiLifeEpoch => Ok(Recording::Epochs(csv_epoch::read_actilife(path)?)),
        Format::PlainEpoch => Ok(Recording::Epochs(csv_epoch::read_plain(path)?)),
    }
}

/// Read metadata about a recording file.
///
/// Unlike [`read_recording`], this succeeds on EDF files that carry no
/// acceleration channels, so ECG-only recordings can still be inspected.
pub fn probe(path: &Path) -> Result<RecordingInfo, ReaderError> {
    let format = detect_format(path)?;
    if format == Format::Edf {
        return edf::probe(path);
    }

    let name = match format {
        Format::Gt3x => "gt3x",
        Format::ActiLifeRaw | Format::ActiLifeEpoch => "actilife-csv",
        Format::PlainRaw | Format::PlainEpoch => "csv",
        Format::Edf => unreachable!(),
    };
    match read_recording(path)? {
        Recording::Raw(raw) => Ok(RecordingInfo {
            format: name,
            start: raw.start(),
            duration_secs: raw.duration_secs() as f64,
            detail: Some(RecordingDetail::Raw {
                sample_rate_hz: raw.sample_rate(),
                samples: raw.len(),
            }),
            channels: Vec::new(),
        }),
        Recording::Epochs(epochs) => Ok(RecordingInfo {
            format: name,
            start: epochs.start(),
            duration_secs: epochs.duration().num_seconds() as f64,
            detail: Some(RecordingDetail::Epochs {
                epoch_length_secs: epochs.epoch_length_secs(),
                count: epochs.len(),
            }),
            channels: Vec::new(),
        }),
    }
}

fn detect_format(path: &Path) -> Result<Format, ReaderError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("gt3x") => Ok(Format::Gt3x),
        Some("edf") => Ok(Format::Edf),
        Some("csv") => sniff_csv(path),
        _ => Err(ReaderError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Distinguish the four CSV layouts by their first lines.
fn sniff_csv(path: &Path) -> Result<Format, ReaderError> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let first = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(ReaderError::Empty {
                path: path.display().to_string(),
            })
        }
    };

    if first.starts_with("---") {
        // ActiLife banner: the epoch period line tells raw from epochs
        for line in lines.take(actilife::BANNER_LINES) {
            let line = line?;
            if let Some(value) = line.strip_prefix(actilife::EPOCH_PERIOD_PREFIX) {
                let secs = actilife::parse_epoch_period(value.trim()).ok_or_else(|| {
                    ReaderError::Malformed {
                        format: "actilife-csv",
                        location: path.display().to_string(),
                        reason: format!("unreadable epoch period '{}'", value.trim()),
                    }
                })?;
                return if secs == 0 {
                    Ok(Format::ActiLifeRaw)
                } else {
                    Ok(Format::ActiLifeEpoch)
                };
            }
        }
        return Err(ReaderError::Malformed {
            format: "actilife-csv",
            location: path.display().to_string(),
            reason: "banner has no epoch period line".to_string(),
        });
    }

    let columns: Vec<String> = first
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_ascii_lowercase())
        .collect();
    if columns.iter().any(|c| c == "axis1") {
        Ok(Format::PlainEpoch)
    } else if columns.iter().any(|c| c == "x") {
        Ok(Format::PlainRaw)
    } else {
        Err(ReaderError::UnsupportedFormat {
            path: path.display().to_string(),
        })
    }
}

/// Parse a timestamp in either space- or T-separated form, with an
/// optional fractional part.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2017-06-01 08:00:00").is_some());
        assert!(parse_timestamp("2017-06-01T08:00:00.500").is_some());
        assert!(parse_timestamp("06/01/2017 08:00").is_none());
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = detect_format(Path::new("recording.bin")).unwrap_err();
        assert!(matches!(err, ReaderError::UnsupportedFormat { .. }));
    }
}
