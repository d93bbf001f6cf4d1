//! Epoch count CSV readers.
//!
//! Two layouts: ActiLife exports with the banner header and implicit
//! timestamps, and plain exports with a `timestamp,axis1,axis2,axis3`
//! header where the epoch length is inferred from the timestamp grid.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::{EpochCounts, EpochSeries};
use crate::error::ReaderError;

use super::actilife;

fn malformed(location: String, reason: impl Into<String>) -> ReaderError {
    ReaderError::Malformed {
        format: "epoch-csv",
        location,
        reason: reason.into(),
    }
}

/// Read an ActiLife epoch export.
///
/// Rows hold counts only; timestamps follow from the banner's start and
/// epoch period. A header row after the banner is skipped, and columns
/// beyond the three axes (ActiLife appends VMU and step columns on
/// request) are ignored.
pub(super) fn read_actilife(path: &Path) -> Result<EpochSeries, ReaderError> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let (banner, banner_lines) = actilife::parse_banner(&mut lines, path)?;
    if banner.epoch_secs == 0 {
        return Err(malformed(
            path.display().to_string(),
            "epoch period is zero, this is a raw export",
        ));
    }

    let mut epochs = Vec::new();
    let mut seen_header = false;
    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_no = banner_lines + i + 1;
        if line.trim().is_empty() {
            continue;
        }
        // an optional column header directly after the banner
        if !seen_header && epochs.is_empty() && line.chars().any(|c| c.is_ascii_alphabetic()) {
            seen_header = true;
            continue;
        }

        let mut fields = line.split(',');
        let mut axis = |name: &str| -> Result<u32, ReaderError> {
            let field = fields
                .next()
                .ok_or_else(|| {
                    malformed(format!("{}:{line_no}", path.display()), format!("missing {name}"))
                })?
                .trim();
            field.parse().map_err(|_| {
                malformed(
                    format!("{}:{line_no}", path.display()),
                    format!("unreadable {name} count '{field}'"),
                )
            })
        };
        let x = axis("axis1")?;
        let y = axis("axis2")?;
        let z = axis("axis3")?;
        epochs.push(EpochCounts::new(x, y, z));
    }

    if epochs.is_empty() {
        return Err(ReaderError::Empty {
            path: path.display().to_string(),
        });
    }
    Ok(EpochSeries::new(banner.start, banner.epoch_secs, epochs))
}

/// Read a plain epoch CSV with a `timestamp,axis1,axis2,axis3` header.
///
/// The epoch length is the gap between the first two rows; every later
/// row must stay on that grid.
pub(super) fn read_plain(path: &Path) -> Result<EpochSeries, ReaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, ReaderError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                malformed(
                    path.display().to_string(),
                    format!("missing column '{name}'"),
                )
            })
    };
    let ts_col = column("timestamp")?;
    let axis_cols = [column("axis1")?, column("axis2")?, column("axis3")?];

    let mut timestamps = Vec::new();
    let mut epochs = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2; // header is row 1
        let location = format!("{}:{row}", path.display());

        let ts_field = record.get(ts_col).unwrap_or_default();
        let timestamp = super::parse_timestamp(ts_field)
            .ok_or_else(|| malformed(location.clone(), format!("unreadable timestamp '{ts_field}'")))?;
        timestamps.push(timestamp);

        let mut counts = [0u32; 3];
        for (slot, &col) in counts.iter_mut().zip(&axis_cols) {
            let field = record.get(col).unwrap_or_default();
            *slot = field.parse().map_err(|_| {
                malformed(location.clone(), format!("unreadable count '{field}'"))
            })?;
        }
        epochs.push(EpochCounts::new(counts[0], counts[1], counts[2]));
    }

    if epochs.is_empty() {
        return Err(ReaderError::Empty {
            path: path.display().to_string(),
        });
    }
    if timestamps.len() < 2 {
        return Err(malformed(
            path.display().to_string(),
            "need at least two rows to infer the epoch length",
        ));
    }

    let step = timestamps[1] - timestamps[0];
    let step_secs = step.num_seconds();
    if step_secs <= 0 || step.num_milliseconds() != step_secs * 1000 {
        return Err(malformed(
            path.display().to_string(),
            format!("rows are {}ms apart, expected a positive whole-second epoch", step.num_milliseconds()),
        ));
    }
    for (i, pair) in timestamps.windows(2).enumerate().skip(1) {
        let found = (pair[1] - pair[0]).num_seconds();
        if found != step_secs {
            return Err(ReaderError::NonUniformSampling {
                expected_secs: step_secs,
                found_secs: found,
                row: i + 3,
            });
        }
    }

    Ok(EpochSeries::new(timestamps[0], step_secs as u32, epochs))
}
