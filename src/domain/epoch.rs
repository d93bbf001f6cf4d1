//! Epoch-aggregated activity counts.

use chrono::{Duration, NaiveDateTime};

use super::error::DomainError;
use super::magnitude::vector_magnitude;
use super::sample::Axis;

/// Activity counts for one epoch, one value per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EpochCounts {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl EpochCounts {
    /// Create counts from per-axis values.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Count along a single axis.
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Vector magnitude of the three count axes (the VMU).
    #[must_use]
    pub fn vector_magnitude(&self) -> f64 {
        vector_magnitude(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

/// A uniform series of epoch counts.
#[derive(Debug, Clone)]
pub struct EpochSeries {
    start: NaiveDateTime,
    epoch_length_secs: u32,
    epochs: Vec<EpochCounts>,
}

impl EpochSeries {
    /// Create a series. `epoch_length_secs` must be non-zero; readers
    /// validate this before construction.
    #[must_use]
    pub fn new(start: NaiveDateTime, epoch_length_secs: u32, epochs: Vec<EpochCounts>) -> Self {
        debug_assert!(epoch_length_secs > 0, "epoch length must be non-zero");
        Self {
            start,
            epoch_length_secs,
            epochs,
        }
    }

    /// Timestamp of the first epoch.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Epoch length in seconds.
    #[must_use]
    pub const fn epoch_length_secs(&self) -> u32 {
        self.epoch_length_secs
    }

    /// All epochs in order.
    #[must_use]
    pub fn epochs(&self) -> &[EpochCounts] {
        &self.epochs
    }

    /// Number of epochs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Whether the series holds no epochs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Total covered time.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.epochs.len() as i64 * i64::from(self.epoch_length_secs))
    }

    /// Timestamp of the epoch at `index`.
    #[must_use]
    pub fn timestamp_at(&self, index: usize) -> NaiveDateTime {
        self.start + Duration::seconds(index as i64 * i64::from(self.epoch_length_secs))
    }

    /// Counts of one axis as f64, ready for thresholding.
    #[must_use]
    pub fn axis_values(&self, axis: Axis) -> Vec<f64> {
        self.epochs
            .iter()
            .map(|e| f64::from(e.axis(axis)))
            .collect()
    }

    /// Per-epoch vector magnitudes.
    #[must_use]
    pub fn vmu_values(&self) -> Vec<f64> {
        self.epochs.iter().map(EpochCounts::vector_magnitude).collect()
    }

    /// Aggregate to a coarser epoch length by summing whole groups of
    /// source epochs. `target_secs` must be a positive multiple of the
    /// source length; a trailing partial group is dropped.
    pub fn resample(&self, target_secs: u32) -> Result<EpochSeries, DomainError> {
        if target_secs == 0 {
            return Err(DomainError::InvalidResample {
                reason: "target epoch length is zero".to_string(),
            });
        }
        if target_secs == self.epoch_length_secs {
            return Ok(self.clone());
        }
        if target_secs % self.epoch_length_secs != 0 {
            return Err(DomainError::InvalidResample {
                reason: format!(
                    "target {target_secs}s is not a multiple of source {}s",
                    self.epoch_length_secs
                ),
            });
        }

        let group = (target_secs / self.epoch_length_secs) as usize;
        let epochs = self
            .epochs
            .chunks_exact(group)
            .map(|chunk| {
                chunk.iter().fold(EpochCounts::default(), |acc, e| {
                    EpochCounts::new(
                        acc.x.saturating_add(e.x),
                        acc.y.saturating_add(e.y),
                        acc.z.saturating_add(e.z),
                    )
                })
            })
            .collect();

        Ok(EpochSeries::new(self.start, target_secs, epochs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn series_10s(counts: &[(u32, u32, u32)]) -> EpochSeries {
        let epochs = counts
            .iter()
            .map(|&(x, y, z)| EpochCounts::new(x, y, z))
            .collect();
        EpochSeries::new(start(), 10, epochs)
    }

    #[test]
    fn vmu_is_euclidean_norm() {
        let counts = EpochCounts::new(3, 4, 0);
        assert!((counts.vector_magnitude() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn resample_sums_whole_groups_and_drops_tail() {
        let series = series_10s(&[
            (1, 0, 0),
            (2, 0, 0),
            (3, 0, 0),
            (4, 0, 0),
            (5, 0, 0),
            (6, 0, 0),
            (7, 0, 0), // trailing partial minute
        ]);

        let minute = series.resample(60).unwrap();
        assert_eq!(minute.len(), 1);
        assert_eq!(minute.epochs()[0], EpochCounts::new(21, 0, 0));
        assert_eq!(minute.epoch_length_secs(), 60);
        assert_eq!(minute.start(), start());
    }

    #[test]
    fn resample_to_same_length_is_identity() {
        let series = series_10s(&[(1, 2, 3), (4, 5, 6)]);
        let same = series.resample(10).unwrap();
        assert_eq!(same.epochs(), series.epochs());
    }

    #[test]
    fn resample_rejects_non_multiples() {
        let series = series_10s(&[(1, 0, 0)]);
        assert!(matches!(
            series.resample(15),
            Err(DomainError::InvalidResample { .. })
        ));
        assert!(matches!(
            series.resample(0),
            Err(DomainError::InvalidResample { .. })
        ));
    }

    #[test]
    fn timestamps_follow_epoch_grid() {
        let series = series_10s(&[(0, 0, 0), (0, 0, 0), (0, 0, 0)]);
        assert_eq!(series.timestamp_at(0), start());
        assert_eq!(series.timestamp_at(2), start() + Duration::seconds(20));
        assert_eq!(series.duration(), Duration::seconds(30));
    }
}
