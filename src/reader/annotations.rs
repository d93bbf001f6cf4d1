//! Reference non-wear annotations.
//!
//! Annotation files are CSVs with `start` and `end` columns and an optional
//! `label` column. With a label column present, only rows labelled as
//! non-wear are kept, so a mixed event log (sleep, exercise, non-wear) can
//! be used directly. Without one, every row is a non-wear interval.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;

use super::parse_timestamp;
use crate::error::ReaderError;

/// Labels treated as non-wear, compared case-insensitively.
const NON_WEAR_LABELS: [&str; 5] = ["non-wear", "non_wear", "non wear", "nonwear", "nw"];

fn is_non_wear_label(label: &str) -> bool {
    let label = label.trim();
    NON_WEAR_LABELS
        .iter()
        .any(|known| label.eq_ignore_ascii_case(known))
}

/// Read reference non-wear intervals, sorted by start time.
pub fn read_annotations(
    path: &Path,
) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>, ReaderError> {
    let location = path.display().to_string();
    let malformed = |reason: String| ReaderError::Malformed {
        format: "annotations",
        location: location.clone(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(File::open(path)?);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let start_col = column("start")
        .ok_or_else(|| malformed("missing 'start' column".to_string()))?;
    let end_col =
        column("end").ok_or_else(|| malformed("missing 'end' column".to_string()))?;
    let label_col = column("label");

    let mut intervals = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2;

        if let Some(col) = label_col {
            let label = record.get(col).unwrap_or("");
            if !is_non_wear_label(label) {
                continue;
            }
        }

        let field = |col: usize, name: &str| {
            record
                .get(col)
                .ok_or_else(|| malformed(format!("row {row} is missing '{name}'")))
        };
        let start = parse_timestamp(field(start_col, "start")?)
            .ok_or_else(|| malformed(format!("unreadable start timestamp on row {row}")))?;
        let end = parse_timestamp(field(end_col, "end")?)
            .ok_or_else(|| malformed(format!("unreadable end timestamp on row {row}")))?;
        if end <= start {
            return Err(malformed(format!(
                "interval on row {row} ends at or before its start"
            )));
        }
        intervals.push((start, end));
    }

    intervals.sort_by_key(|&(start, _)| start);
    Ok(intervals)
}
