//! Raw sample CSV readers.
//!
//! ActiLife raw exports reuse the banner layout with an epoch period of
//! zero and rows of plain accelerations at the device rate. Plain exports
//! carry a `timestamp,x,y,z` header and the sample rate is inferred from
//! the span the timestamps cover.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::{RawRecording, RawSample};
use crate::error::ReaderError;

use super::actilife;

fn malformed(location: String, reason: impl Into<String>) -> ReaderError {
    ReaderError::Malformed {
        format: "raw-csv",
        location,
        reason: reason.into(),
    }
}

/// Read an ActiLife raw export.
///
/// Rows are accelerations in g at the banner's sample rate. Exports may
/// carry a column header and a leading timestamp column; both are
/// detected and skipped.
pub(super) fn read_actilife(path: &Path) -> Result<RawRecording, ReaderError> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let (banner, banner_lines) = actilife::parse_banner(&mut lines, path)?;
    if banner.epoch_secs != 0 {
        return Err(malformed(
            path.display().to_string(),
            "epoch period is not zero, this is an epoch export",
        ));
    }
    if banner.sample_rate_hz == 0 {
        return Err(malformed(
            path.display().to_string(),
            "banner does not state a sample rate",
        ));
    }

    let mut samples = Vec::new();
    let mut skip_timestamps = false;
    let mut seen_header = false;
    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_no = banner_lines + i + 1;
        if line.trim().is_empty() {
            continue;
        }
        if !seen_header && samples.is_empty() && line.chars().any(|c| c.is_ascii_alphabetic()) {
            seen_header = true;
            skip_timestamps = line.to_ascii_lowercase().contains("timestamp");
            continue;
        }

        let mut fields = line.split(',');
        if skip_timestamps {
            fields.next();
        }
        let mut axis = |name: &str| -> Result<f32, ReaderError> {
            let field = fields
                .next()
                .ok_or_else(|| {
                    malformed(format!("{}:{line_no}", path.display()), format!("missing {name}"))
                })?
                .trim();
            field.parse().map_err(|_| {
                malformed(
                    format!("{}:{line_no}", path.display()),
                    format!("unreadable {name} acceleration '{field}'"),
                )
            })
        };
        let x = axis("x")?;
        let y = axis("y")?;
        let z = axis("z")?;
        samples.push(RawSample::new(x, y, z));
    }

    if samples.is_empty() {
        return Err(ReaderError::Empty {
            path: path.display().to_string(),
        });
    }
    Ok(RawRecording::new(
        banner.start,
        banner.sample_rate_hz,
        samples,
    ))
}

/// Read a plain raw CSV with a `timestamp,x,y,z` header.
///
/// Timestamps are usually rounded to milliseconds, so the rate comes
/// from the full span rather than a single row gap.
pub(super) fn read_plain(path: &Path) -> Result<RawRecording, ReaderError> {
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
    let axis_cols = [column("x")?, column("y")?, column("z")?];

    let mut first = None;
    let mut last = None;
    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let location = format!("{}:{}", path.display(), i + 2);

        let ts_field = record.get(ts_col).unwrap_or_default();
        let timestamp = super::parse_timestamp(ts_field)
            .ok_or_else(|| malformed(location.clone(), format!("unreadable timestamp '{ts_field}'")))?;
        first.get_or_insert(timestamp);
        last = Some(timestamp);

        let mut values = [0f32; 3];
        for (slot, &col) in values.iter_mut().zip(&axis_cols) {
            let field = record.get(col).unwrap_or_default();
            *slot = field.parse().map_err(|_| {
                malformed(location.clone(), format!("unreadable acceleration '{field}'"))
            })?;
        }
        samples.push(RawSample::new(values[0], values[1], values[2]));
    }

    let (Some(first), Some(last)) = (first, last) else {
        return Err(ReaderError::Empty {
            path: path.display().to_string(),
        });
    };
    if samples.len() < 2 {
        return Err(malformed(
            path.display().to_string(),
            "need at least two rows to infer the sample rate",
        ));
    }

    let span = last - first;
    let span_nanos = span
        .num_nanoseconds()
        .filter(|&n| n > 0)
        .ok_or_else(|| {
            malformed(
                path.display().to_string(),
                "timestamps do not advance".to_string(),
            )
        })?;
    let rate = ((samples.len() - 1) as f64 * 1e9 / span_nanos as f64).round() as u32;
    if rate == 0 {
        return Err(malformed(
            path.display().to_string(),
            "rows are too far apart to be raw samples".to_string(),
        ));
    }

    Ok(RawRecording::new(first, rate, samples))
}
