//! CSV export of detections, comparison metrics, and epoch series.
//!
//! Interval timestamps serialize as ISO 8601, which the annotation reader
//! accepts, so an exported detection can be fed back in as a reference.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::algorithm::Detection;
use crate::domain::{Axis, ConfusionMatrix, EpochSeries};
use crate::error::Result;

/// One detected non-wear interval, flattened for CSV.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalRow {
    pub file: String,
    pub algorithm: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_secs: i64,
}

/// One confusion matrix with its derived scores, flattened for CSV.
///
/// Undefined ratios serialize as empty cells.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRow {
    pub file: String,
    pub algorithm: String,
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub specificity: Option<f64>,
    pub f1: Option<f64>,
    pub kappa: Option<f64>,
}

impl MetricsRow {
    /// Flatten a matrix into a row labelled with its source and algorithm.
    #[must_use]
    pub fn new(file: impl Into<String>, algorithm: impl Into<String>, matrix: &ConfusionMatrix) -> Self {
        Self {
            file: file.into(),
            algorithm: algorithm.into(),
            true_positive: matrix.true_positive,
            false_positive: matrix.false_positive,
            true_negative: matrix.true_negative,
            false_negative: matrix.false_negative,
            accuracy: matrix.accuracy(),
            precision: matrix.precision(),
            recall: matrix.recall(),
            specificity: matrix.specificity(),
            f1: matrix.f1(),
            kappa: matrix.kappa(),
        }
    }
}

/// Flatten detections into interval rows labelled with their source file.
#[must_use]
pub fn interval_rows(file: &str, detections: &[Detection]) -> Vec<IntervalRow> {
    let mut rows = Vec::new();
    for detection in detections {
        for interval in detection.series.non_wear_intervals() {
            rows.push(IntervalRow {
                file: file.to_string(),
                algorithm: detection.algorithm.to_string(),
                start: interval.start(),
                end: interval.end(),
                duration_secs: interval.duration().num_seconds(),
            });
        }
    }
    rows
}

/// Write interval rows to a CSV file, creating parent directories.
pub fn write_intervals(path: &Path, rows: &[IntervalRow]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write metric rows to a CSV file, creating parent directories.
pub fn write_metrics(path: &Path, rows: &[MetricsRow]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write an epoch series as `timestamp,axis1,axis2,axis3,vmu` rows.
///
/// The layout matches the plain epoch CSV input format, so the export can
/// be read back.
pub fn write_epochs(path: &Path, series: &EpochSeries) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "axis1", "axis2", "axis3", "vmu"])?;
    for (i, counts) in series.epochs().iter().enumerate() {
        writer.write_record([
            series
                .timestamp_at(i)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            counts.axis(Axis::X).to_string(),
            counts.axis(Axis::Y).to_string(),
            counts.axis(Axis::Z).to_string(),
            format!("{:.2}", counts.vector_magnitude()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
