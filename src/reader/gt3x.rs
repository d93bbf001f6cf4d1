//! ActiGraph .gt3x reader.
//!
//! A .gt3x file is a zip archive holding `info.txt` (key-value device
//! metadata) and `log.bin` (a stream of framed records). Each record is:
//!
//! ```text
//! separator 0x1E | type 1B | unix timestamp 4B LE | size 2B LE | payload | checksum 1B
//! ```
//!
//! The checksum is the 1's complement of the XOR over everything from the
//! separator through the payload. Acceleration lives in two record types:
//! `ACTIVITY` packs 12-bit big-endian two's complement values in YXZ order
//! at 341 counts per g, `ACTIVITY2` holds 16-bit little-endian XYZ values
//! scaled by the `Acceleration Scale` metadata key. Each record carries one
//! second of samples; missing seconds repeat the last known sample, which
//! is how the devices themselves latch during idle sleep.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use tracing::warn;

use crate::domain::{RawRecording, RawSample};
use crate::error::ReaderError;

const RECORD_SEPARATOR: u8 = 0x1E;
const RECORD_ACTIVITY: u8 = 0x00;
const RECORD_ACTIVITY2: u8 = 0x1A;

/// Counts per g for the packed 12-bit activity format.
const ACTIVITY_SCALE: f64 = 341.0;
/// Fallback counts per g for 16-bit activity records.
const ACTIVITY2_DEFAULT_SCALE: f64 = 256.0;

struct DeviceInfo {
    sample_rate_hz: u32,
    acceleration_scale: Option<f64>,
}

pub(super) fn read(path: &Path) -> Result<RawRecording, ReaderError> {
    read_from(File::open(path)?, path)
}

fn read_from<R: Read + Seek>(reader: R, path: &Path) -> Result<RawRecording, ReaderError> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let info = parse_info(&read_entry(&mut archive, "info.txt", path)?, path)?;
    let log = read_entry(&mut archive, "log.bin", path)?;
    parse_log(&log, &info, path)
}

fn malformed(path: &Path, reason: impl Into<String>) -> ReaderError {
    ReaderError::Malformed {
        format: "gt3x",
        location: path.display().to_string(),
        reason: reason.into(),
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
    path: &Path,
) -> Result<Vec<u8>, ReaderError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(malformed(path, format!("archive has no {name}")))
        }
        Err(err) => return Err(err.into()),
    };
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

fn parse_info(raw: &[u8], path: &Path) -> Result<DeviceInfo, ReaderError> {
    let text = String::from_utf8_lossy(raw);
    let mut sample_rate_hz = None;
    let mut acceleration_scale = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "Sample Rate" => sample_rate_hz = value.trim().parse::<u32>().ok(),
            "Acceleration Scale" => acceleration_scale = value.trim().parse::<f64>().ok(),
            _ => {}
        }
    }

    let sample_rate_hz = sample_rate_hz
        .filter(|&rate| rate > 0)
        .ok_or_else(|| malformed(path, "info.txt has no usable sample rate"))?;
    Ok(DeviceInfo {
        sample_rate_hz,
        acceleration_scale,
    })
}

fn record_timestamp(secs: i64, path: &Path) -> Result<NaiveDateTime, ReaderError> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| malformed(path, format!("record timestamp {secs} is out of range")))
}

fn parse_log(log: &[u8], info: &DeviceInfo, path: &Path) -> Result<RawRecording, ReaderError> {
    let rate = info.sample_rate_hz as usize;
    let activity2_scale = info
        .acceleration_scale
        .unwrap_or(ACTIVITY2_DEFAULT_SCALE);

    let mut samples: Vec<RawSample> = Vec::new();
    let mut start = None;
    let mut last_second: Option<i64> = None;
    let mut offset = 0usize;

    while offset < log.len() {
        if log.len() - offset < 9 {
            return Err(malformed(
                path,
                format!("truncated record header at offset {offset}"),
            ));
        }
        if log[offset] != RECORD_SEPARATOR {
            return Err(malformed(
                path,
                format!("bad record separator at offset {offset}"),
            ));
        }
        let record_type = log[offset + 1];
        let timestamp = i64::from(u32::from_le_bytes([
            log[offset + 2],
            log[offset + 3],
            log[offset + 4],
            log[offset + 5],
        ]));
        let size = u16::from_le_bytes([log[offset + 6], log[offset + 7]]) as usize;
        let record_end = offset + 8 + size;
        if log.len() <= record_end {
            return Err(malformed(
                path,
                format!("truncated record payload at offset {offset}"),
            ));
        }
        let payload = &log[offset + 8..record_end];
        let stored_checksum = log[record_end];
        let computed = !log[offset..record_end].iter().fold(0u8, |acc, &b| acc ^ b);
        let next_offset = record_end + 1;

        if computed != stored_checksum {
            warn!(
                record_type,
                offset, "checksum mismatch in gt3x record, skipping"
            );
            offset = next_offset;
            continue;
        }

        let decoded = match record_type {
            RECORD_ACTIVITY => Some(decode_activity(payload)),
            RECORD_ACTIVITY2 => Some(decode_activity2(payload, activity2_scale)),
            _ => None,
        };
        if let Some(record_samples) = decoded {
            if let Some(prev) = last_second {
                if timestamp <= prev {
                    warn!(
                        record_type,
                        offset, "out of order gt3x record, skipping"
                    );
                    offset = next_offset;
                    continue;
                }
                // latch the last sample across idle-sleep gaps
                let gap_secs = timestamp - prev - 1;
                if gap_secs > 0 {
                    if let Some(&last) = samples.last() {
                        let fill = gap_secs as usize * rate;
                        samples.extend(std::iter::repeat(last).take(fill));
                    }
                }
            }
            if start.is_none() {
                start = Some(record_timestamp(timestamp, path)?);
            }
            samples.extend(record_samples);
            last_second = Some(timestamp);
        }
        offset = next_offset;
    }

    let start = start.ok_or_else(|| ReaderError::Empty {
        path: path.display().to_string(),
    })?;
    Ok(RawRecording::new(start, info.sample_rate_hz, samples))
}

/// Unpack the `index`-th 12-bit big-endian value from a packed payload.
fn unpack12(payload: &[u8], index: usize) -> i16 {
    let bit = index * 12;
    let byte = bit / 8;
    let raw = if bit % 8 == 0 {
        (u16::from(payload[byte]) << 4) | (u16::from(payload[byte + 1]) >> 4)
    } else {
        (u16::from(payload[byte] & 0x0F) << 8) | u16::from(payload[byte + 1])
    };
    if raw & 0x800 != 0 {
        (raw | 0xF000) as i16
    } else {
        raw as i16
    }
}

fn decode_activity(payload: &[u8]) -> Vec<RawSample> {
    let values = payload.len() * 8 / 12;
    (0..values / 3)
        .map(|sample| {
            let y = unpack12(payload, sample * 3);
            let x = unpack12(payload, sample * 3 + 1);
            let z = unpack12(payload, sample * 3 + 2);
            RawSample::new(
                (f64::from(x) / ACTIVITY_SCALE) as f32,
                (f64::from(y) / ACTIVITY_SCALE) as f32,
                (f64::from(z) / ACTIVITY_SCALE) as f32,
            )
        })
        .collect()
}

fn decode_activity2(payload: &[u8], scale: f64) -> Vec<RawSample> {
    payload
        .chunks_exact(6)
        .map(|chunk| {
            let x = i16::from_le_bytes([chunk[0], chunk[1]]);
            let y = i16::from_le_bytes([chunk[2], chunk[3]]);
            let z = i16::from_le_bytes([chunk[4], chunk[5]]);
            RawSample::new(
                (f64::from(x) / scale) as f32,
                (f64::from(y) / scale) as f32,
                (f64::from(z) / scale) as f32,
            )
        })
        .collect()
}
