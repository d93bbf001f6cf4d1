//! European Data Format reader.
//!
//! EDF files open with a 256-byte ASCII header followed by one 256-byte
//! header per signal, stored field-major: all labels, then all transducer
//! types, and so on. Data records hold each signal's samples for one
//! record duration as 16-bit little-endian integers, mapped to physical
//! units by the per-signal calibration:
//!
//! ```text
//! physical = phys_min + (digital - dig_min) * (phys_max - phys_min) / (dig_max - dig_min)
//! ```
//!
//! Combined holter recorders write ECG and acceleration side by side; the
//! acceleration channels are picked out by label (`X`, `Acc X`,
//! `Accelerometer X` and friends). [`probe`] succeeds on any EDF file so
//! ECG-only recordings can still be listed and inspected.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use super::{RecordingDetail, RecordingInfo};
use crate::domain::{Axis, RawRecording, RawSample};
use crate::error::ReaderError;

const FIXED_HEADER_BYTES: usize = 256;
const SIGNAL_HEADER_BYTES: usize = 256;

#[derive(Debug, Clone)]
struct SignalHeader {
    label: String,
    physical_dimension: String,
    physical_min: f64,
    physical_max: f64,
    digital_min: f64,
    digital_max: f64,
    samples_per_record: usize,
}

impl SignalHeader {
    fn to_physical(&self, digital: i16) -> f64 {
        let gain = (self.physical_max - self.physical_min) / (self.digital_max - self.digital_min);
        self.physical_min + (f64::from(digital) - self.digital_min) * gain
    }

    /// Scale into g; EDF accelerometer channels are dimensioned g or mg.
    fn to_g(&self, digital: i16) -> f32 {
        let physical = self.to_physical(digital);
        if self.physical_dimension.eq_ignore_ascii_case("mg") {
            (physical / 1000.0) as f32
        } else {
            physical as f32
        }
    }
}

#[derive(Debug, Clone)]
struct EdfHeader {
    start: NaiveDateTime,
    /// -1 when the recorder did not know the count up front.
    num_records: i64,
    record_duration_secs: f64,
    signals: Vec<SignalHeader>,
}

impl EdfHeader {
    fn record_bytes(&self) -> usize {
        self.signals
            .iter()
            .map(|s| s.samples_per_record * 2)
            .sum()
    }

    fn header_bytes(&self) -> usize {
        FIXED_HEADER_BYTES + self.signals.len() * SIGNAL_HEADER_BYTES
    }
}

fn malformed(path: &Path, reason: impl Into<String>) -> ReaderError {
    ReaderError::Malformed {
        format: "edf",
        location: path.display().to_string(),
        reason: reason.into(),
    }
}

fn header_field(buf: &[u8], offset: usize, width: usize) -> String {
    String::from_utf8_lossy(&buf[offset..offset + width])
        .trim()
        .to_string()
}

fn numeric<T: std::str::FromStr>(value: &str, what: &str, path: &Path) -> Result<T, ReaderError> {
    value
        .parse()
        .map_err(|_| malformed(path, format!("unreadable {what} '{value}'")))
}

/// Parse `dd.mm.yy` and `hh.mm.ss`, with the 1985 century pivot the
/// format prescribes.
fn parse_start(date: &str, time: &str, path: &Path) -> Result<NaiveDateTime, ReaderError> {
    let date_parts: Vec<&str> = date.split(['.', ':']).collect();
    let time_parts: Vec<&str> = time.split(['.', ':']).collect();
    if date_parts.len() != 3 || time_parts.len() != 3 {
        return Err(malformed(path, format!("unreadable start '{date} {time}'")));
    }

    let day: u32 = numeric(date_parts[0], "start day", path)?;
    let month: u32 = numeric(date_parts[1], "start month", path)?;
    let short_year: i32 = numeric(date_parts[2], "start year", path)?;
    let year = if short_year >= 85 {
        1900 + short_year
    } else {
        2000 + short_year
    };

    let hour: u32 = numeric(time_parts[0], "start hour", path)?;
    let minute: u32 = numeric(time_parts[1], "start minute", path)?;
    let second: u32 = numeric(time_parts[2], "start second", path)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| malformed(path, format!("start '{date} {time}' is not a valid moment")))
}

fn parse_header<R: Read>(reader: &mut R, path: &Path) -> Result<EdfHeader, ReaderError> {
    let mut fixed = [0u8; FIXED_HEADER_BYTES];
    reader.read_exact(&mut fixed)?;

    let start = parse_start(
        &header_field(&fixed, 168, 8),
        &header_field(&fixed, 176, 8),
        path,
    )?;
    let num_records: i64 = numeric(&header_field(&fixed, 236, 8), "record count", path)?;
    let record_duration_secs: f64 =
        numeric(&header_field(&fixed, 244, 8), "record duration", path)?;
    let ns: usize = numeric(&header_field(&fixed, 252, 4), "signal count", path)?;
    if ns == 0 {
        return Err(malformed(path, "header declares no signals"));
    }
    if record_duration_secs <= 0.0 {
        return Err(malformed(path, "record duration is not positive"));
    }

    let mut signal_headers = vec![0u8; ns * SIGNAL_HEADER_BYTES];
    reader.read_exact(&mut signal_headers)?;

    // field-major layout: ns labels, ns transducers, ...
    let field = |base: usize, width: usize, i: usize| {
        header_field(&signal_headers, base * ns + i * width, width)
    };
    let mut signals = Vec::with_capacity(ns);
    for i in 0..ns {
        signals.push(SignalHeader {
            label: field(0, 16, i),
            physical_dimension: field(96, 8, i),
            physical_min: numeric(&field(104, 8, i), "physical minimum", path)?,
            physical_max: numeric(&field(112, 8, i), "physical maximum", path)?,
            digital_min: numeric(&field(120, 8, i), "digital minimum", path)?,
            digital_max: numeric(&field(128, 8, i), "digital maximum", path)?,
            samples_per_record: numeric(&field(216, 8, i), "samples per record", path)?,
        });
    }

    Ok(EdfHeader {
        start,
        num_records,
        record_duration_secs,
        signals,
    })
}

/// Match a signal label onto an acceleration axis.
fn axis_of_label(label: &str) -> Option<Axis> {
    let upper = label.trim().to_ascii_uppercase();
    for axis in Axis::ALL {
        let letter = axis.label();
        if upper == letter || (upper.contains("ACC") && upper.ends_with(letter)) {
            return Some(axis);
        }
    }
    None
}

/// Indices of the X, Y, Z signals, or the first missing axis label.
fn acceleration_signals(header: &EdfHeader) -> Result<[usize; 3], String> {
    let mut found = [None; 3];
    for (i, signal) in header.signals.iter().enumerate() {
        if let Some(axis) = axis_of_label(&signal.label) {
            let slot = &mut found[axis as usize];
            if slot.is_none() {
                *slot = Some(i);
            }
        }
    }
    match found {
        [Some(x), Some(y), Some(z)] => Ok([x, y, z]),
        _ => {
            let missing = Axis::ALL
                .iter()
                .find(|&&axis| found[axis as usize].is_none())
                .map(|axis| axis.label())
                .unwrap_or("X");
            Err(missing.to_string())
        }
    }
}

pub(super) fn read(path: &Path) -> Result<RawRecording, ReaderError> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = parse_header(&mut reader, path)?;

    let axes = acceleration_signals(&header).map_err(|channel| ReaderError::MissingChannel {
        channel,
        path: path.display().to_string(),
    })?;

    let spr = header.signals[axes[0]].samples_per_record;
    if axes.iter().any(|&i| header.signals[i].samples_per_record != spr) {
        return Err(malformed(
            path,
            "acceleration channels disagree on samples per record",
        ));
    }
    if spr == 0 {
        return Err(malformed(path, "acceleration channels are empty"));
    }
    for &i in &axes {
        let signal = &header.signals[i];
        if signal.digital_max == signal.digital_min {
            return Err(malformed(
                path,
                format!("signal '{}' has a zero digital range", signal.label),
            ));
        }
    }

    let rate = spr as f64 / header.record_duration_secs;
    if rate <= 0.0 || (rate - rate.round()).abs() > 1e-6 {
        return Err(malformed(
            path,
            format!("acceleration rate {rate} is not a whole number of Hz"),
        ));
    }
    let rate = rate.round() as u32;

    let mut channels: [Vec<f32>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut buf = Vec::new();
    let mut records_read: i64 = 0;

    loop {
        if header.num_records >= 0 && records_read == header.num_records {
            break;
        }
        if header.num_records < 0 && reader.fill_buf()?.is_empty() {
            break;
        }

        for (i, signal) in header.signals.iter().enumerate() {
            buf.resize(signal.samples_per_record * 2, 0);
            if let Err(err) = reader.read_exact(&mut buf) {
                if err.kind() == std::io::ErrorKind::UnexpectedEof {
                    return Err(malformed(
                        path,
                        format!("data ends inside record {records_read}"),
                    ));
                }
                return Err(err.into());
            }
            if let Some(slot) = axes.iter().position(|&a| a == i) {
                channels[slot].extend(
                    buf.chunks_exact(2)
                        .map(|b| signal.to_g(i16::from_le_bytes([b[0], b[1]]))),
                );
            }
        }
        records_read += 1;
    }

    if channels[0].is_empty() {
        return Err(ReaderError::Empty {
            path: path.display().to_string(),
        });
    }

    let samples = (0..channels[0].len())
        .map(|i| RawSample::new(channels[0][i], channels[1][i], channels[2][i]))
        .collect();
    Ok(RawRecording::new(header.start, rate, samples))
}

/// Header-only metadata, listing every channel the file carries.
pub(super) fn probe(path: &Path) -> Result<RecordingInfo, ReaderError> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let header = parse_header(&mut reader, path)?;

    let records = if header.num_records >= 0 {
        header.num_records as u64
    } else {
        let record_bytes = header.record_bytes() as u64;
        if record_bytes == 0 {
            0
        } else {
            file_len.saturating_sub(header.header_bytes() as u64) / record_bytes
        }
    };

    let detail = acceleration_signals(&header).ok().and_then(|axes| {
        let spr = header.signals[axes[0]].samples_per_record;
        let rate = spr as f64 / header.record_duration_secs;
        if rate <= 0.0 || (rate - rate.round()).abs() > 1e-6 {
            return None;
        }
        Some(RecordingDetail::Raw {
            sample_rate_hz: rate.round() as u32,
            samples: records as usize * spr,
        })
    });

    Ok(RecordingInfo {
        format: "edf",
        start: header.start,
        duration_secs: records as f64 * header.record_duration_secs,
        detail,
        channels: header.signals.iter().map(|s| s.label.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct TestSignal {
        label: &'static str,
        dimension: &'static str,
        physical: (f64, f64),
        digital: (i64, i64),
        /// samples per record, one inner vec per record
        data: Vec<Vec<i16>>,
    }

    fn accel_signal(label: &'static str, data: Vec<Vec<i16>>) -> TestSignal {
        TestSignal {
            label,
            dimension: "g",
            physical: (-2.0, 2.0),
            digital: (-2000, 2000),
            data,
        }
    }

    fn build_edf(declared_records: Option<i64>, duration: f64, signals: &[TestSignal]) -> Vec<u8> {
        let records = signals[0].data.len();
        let ns = signals.len();
        let mut out = Vec::new();

        let fixed = format!(
            "{:<8}{:<80}{:<80}{:<8}{:<8}{:<8}{:<44}{:<8}{:<8}{:<4}",
            "0",
            "patient",
            "recording",
            "01.06.17",
            "08.00.00",
            256 + ns * 256,
            "",
            declared_records.unwrap_or(records as i64),
            duration,
            ns,
        );
        out.extend(fixed.as_bytes());
        assert_eq!(out.len(), 256);

        let mut push_fields = |width: usize, f: &dyn Fn(&TestSignal) -> String| {
            for signal in signals {
                out.extend(format!("{:<width$}", f(signal)).as_bytes());
            }
        };
        push_fields(16, &|s| s.label.to_string());
        push_fields(80, &|_| String::new()); // transducer
        push_fields(8, &|s| s.dimension.to_string());
        push_fields(8, &|s| s.physical.0.to_string());
        push_fields(8, &|s| s.physical.1.to_string());
        push_fields(8, &|s| s.digital.0.to_string());
        push_fields(8, &|s| s.digital.1.to_string());
        push_fields(80, &|_| String::new()); // prefilter
        push_fields(8, &|s| s.data[0].len().to_string());
        push_fields(32, &|_| String::new()); // reserved

        for record in 0..records {
            for signal in signals {
                for &value in &signal.data[record] {
                    out.extend(value.to_le_bytes());
                }
            }
        }
        out
    }

    fn write_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".edf").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_reads_acceleration_next_to_ecg() {
        let bytes = build_edf(
            None,
            1.0,
            &[
                TestSignal {
                    label: "ECG",
                    dimension: "uV",
                    physical: (-500.0, 500.0),
                    digital: (-32768, 32767),
                    data: vec![vec![0; 8], vec![0; 8]],
                },
                accel_signal("Accelerometer X", vec![vec![1000, 1000, 0, 0]; 2]),
                accel_signal("Accelerometer Y", vec![vec![0; 4]; 2]),
                accel_signal("Accelerometer Z", vec![vec![-1000; 4]; 2]),
            ],
        );
        let file = write_file(&bytes);

        let recording = read(file.path()).unwrap();
        assert_eq!(recording.sample_rate(), 4);
        assert_eq!(recording.len(), 8);
        assert_eq!(
            recording.start(),
            NaiveDate::from_ymd_opt(2017, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
        // digital 1000 on a -2000..2000 / -2..2 calibration is exactly 1 g
        assert!((recording.samples()[0].x - 1.0).abs() < 1e-6);
        assert!(recording.samples()[0].y.abs() < 1e-6);
        assert!((recording.samples()[0].z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_milligravity_channels_are_scaled() {
        let mut x = accel_signal("Acc X", vec![vec![500; 4]]);
        x.dimension = "mg";
        x.physical = (-2000.0, 2000.0);
        let bytes = build_edf(
            None,
            1.0,
            &[
                x,
                accel_signal("Acc Y", vec![vec![0; 4]]),
                accel_signal("Acc Z", vec![vec![0; 4]]),
            ],
        );
        let file = write_file(&bytes);

        let recording = read(file.path()).unwrap();
        // 500 mg is half a g
        assert!((recording.samples()[0].x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_record_count_reads_to_eof() {
        let bytes = build_edf(
            Some(-1),
            1.0,
            &[
                accel_signal("X", vec![vec![0; 4]; 3]),
                accel_signal("Y", vec![vec![0; 4]; 3]),
                accel_signal("Z", vec![vec![0; 4]; 3]),
            ],
        );
        let file = write_file(&bytes);

        let recording = read(file.path()).unwrap();
        assert_eq!(recording.len(), 12);
    }

    #[test]
    fn test_ecg_only_file_reports_missing_channel() {
        let bytes = build_edf(
            None,
            1.0,
            &[TestSignal {
                label: "ECG",
                dimension: "uV",
                physical: (-500.0, 500.0),
                digital: (-32768, 32767),
                data: vec![vec![0; 8]],
            }],
        );
        let file = write_file(&bytes);

        let err = read(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ReaderError::MissingChannel { ref channel, .. } if channel == "X"
        ));

        let info = probe(file.path()).unwrap();
        assert_eq!(info.format, "edf");
        assert_eq!(info.channels, vec!["ECG".to_string()]);
        assert!(info.detail.is_none());
        assert!((info.duration_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_century_pivot() {
        let mut bytes = build_edf(
            None,
            1.0,
            &[
                accel_signal("X", vec![vec![0; 4]]),
                accel_signal("Y", vec![vec![0; 4]]),
                accel_signal("Z", vec![vec![0; 4]]),
            ],
        );
        // patch the start date to 01.06.95
        bytes[168..176].copy_from_slice(b"01.06.95");
        let file = write_file(&bytes);

        let recording = read(file.path()).unwrap();
        assert_eq!(
            recording.start().date(),
            NaiveDate::from_ymd_opt(1995, 6, 1).unwrap()
        );
    }
}
