//! ActiLife export banner parsing.
//!
//! ActiLife CSV exports open with a ten-line banner before the data:
//!
//! ```text
//! ------------ Data File Created By ActiGraph GT3X+ ActiLife v6.11.9
//!   Firmware v2.5.0 date format M/d/yyyy at 30 Hz  Filter Normal ------------
//! Serial Number: NEO1F16120123
//! Start Time 08:00:00
//! Start Date 6/1/2017
//! Epoch Period (hh:mm:ss) 00:01:00
//! ...
//! --------------------------------------------------
//! ```
//!
//! The first line carries the device sample rate and the date format the
//! rest of the banner uses. An epoch period of zero marks a raw export.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ReaderError;

/// Banner lines following the opening dashed line.
pub(super) const BANNER_LINES: usize = 9;

/// Prefix of the line naming the epoch period.
pub(super) const EPOCH_PERIOD_PREFIX: &str = "Epoch Period (hh:mm:ss)";

const START_TIME_PREFIX: &str = "Start Time";
const START_DATE_PREFIX: &str = "Start Date";

/// Parsed export banner.
#[derive(Debug, Clone)]
pub(super) struct Banner {
    pub start: NaiveDateTime,
    /// Device sample rate; zero when the banner does not state one.
    pub sample_rate_hz: u32,
    /// Zero for raw exports.
    pub epoch_secs: u32,
}

/// Parse `hh:mm:ss` into seconds.
pub(super) fn parse_epoch_period(value: &str) -> Option<u32> {
    let mut parts = value.split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

fn malformed(path: &Path, reason: impl Into<String>) -> ReaderError {
    ReaderError::Malformed {
        format: "actilife-csv",
        location: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Map the banner's date format token onto a chrono format string.
fn date_format(header: &str) -> &'static str {
    let token = header
        .split("date format")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("M/d/yyyy")
        .to_ascii_lowercase();
    if token.starts_with("yyyy") {
        "%Y-%m-%d"
    } else if token.starts_with('d') {
        "%d/%m/%Y"
    } else {
        "%m/%d/%Y"
    }
}

fn sample_rate(header: &str) -> u32 {
    header
        .split(" at ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|token| token.parse().ok())
        .unwrap_or(0)
}

/// Consume the banner from a line iterator.
///
/// Returns the parsed banner and the number of lines consumed, so callers
/// can report data-row positions relative to the whole file.
pub(super) fn parse_banner<I>(lines: &mut I, path: &Path) -> Result<(Banner, usize), ReaderError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(malformed(path, "missing banner")),
    };
    if !header.starts_with("---") {
        return Err(malformed(path, "banner does not open with a dashed line"));
    }
    let mut consumed = 1usize;

    let format = date_format(&header);
    let rate = sample_rate(&header);

    let mut start_time = None;
    let mut start_date = None;
    let mut epoch_secs = None;

    loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(malformed(path, "banner is not terminated")),
        };
        consumed += 1;
        if line.starts_with("---") {
            break;
        }
        if consumed > BANNER_LINES + 1 {
            return Err(malformed(path, "banner is longer than expected"));
        }

        if let Some(value) = line.strip_prefix(START_TIME_PREFIX) {
            start_time = Some(value.trim_start_matches(':').trim().to_string());
        } else if let Some(value) = line.strip_prefix(START_DATE_PREFIX) {
            start_date = Some(value.trim_start_matches(':').trim().to_string());
        } else if let Some(value) = line.strip_prefix(EPOCH_PERIOD_PREFIX) {
            let value = value.trim_start_matches(':').trim();
            epoch_secs = Some(
                parse_epoch_period(value)
                    .ok_or_else(|| malformed(path, format!("unreadable epoch period '{value}'")))?,
            );
        }
    }

    let date = start_date.ok_or_else(|| malformed(path, "banner has no start date"))?;
    let time = start_time.ok_or_else(|| malformed(path, "banner has no start time"))?;
    let date = NaiveDate::parse_from_str(&date, format)
        .map_err(|_| malformed(path, format!("unreadable start date '{date}'")))?;
    let time = NaiveTime::parse_from_str(&time, "%H:%M:%S")
        .map_err(|_| malformed(path, format!("unreadable start time '{time}'")))?;
    let epoch_secs =
        epoch_secs.ok_or_else(|| malformed(path, "banner has no epoch period line"))?;

    Ok((
        Banner {
            start: date.and_time(time),
            sample_rate_hz: rate,
            epoch_secs,
        },
        consumed,
    ))
}
