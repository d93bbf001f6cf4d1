//! Wear/non-wear classification series and intervals.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::error::DomainError;

/// Classification of one grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WearState {
    Wear,
    NonWear,
}

impl WearState {
    /// Whether this slot is non-wear (the positive class throughout).
    #[must_use]
    pub const fn is_non_wear(self) -> bool {
        matches!(self, WearState::NonWear)
    }
}

impl fmt::Display for WearState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WearState::Wear => f.write_str("wear"),
            WearState::NonWear => f.write_str("non-wear"),
        }
    }
}

/// Grid resolution of a wear series.
///
/// Epoch algorithms classify whole epochs; raw algorithms classify each
/// sample. Carrying the resolution with the series keeps interval timestamps
/// and resampling exact for rates that do not divide a second evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// One state per epoch of `length_secs` seconds.
    Epoch { length_secs: u32 },
    /// One state per raw sample at `rate_hz` Hz.
    Sample { rate_hz: u32 },
}

impl Resolution {
    /// Grid step as exact integer nanoseconds at slot `index`.
    fn offset_nanos(self, index: usize) -> i64 {
        match self {
            Resolution::Epoch { length_secs } => {
                index as i64 * i64::from(length_secs) * 1_000_000_000
            }
            Resolution::Sample { rate_hz } => {
                (index as i64).saturating_mul(1_000_000_000) / i64::from(rate_hz)
            }
        }
    }

    /// First slot whose span could overlap an instant `millis` after the
    /// series start (floor mapping).
    fn floor_index(self, millis: i64) -> i64 {
        match self {
            Resolution::Epoch { length_secs } => millis.div_euclid(i64::from(length_secs) * 1000),
            Resolution::Sample { rate_hz } => {
                (millis * i64::from(rate_hz)).div_euclid(1000)
            }
        }
    }

    /// First slot that starts at or after an instant `millis` after the
    /// series start (ceiling mapping).
    fn ceil_index(self, millis: i64) -> i64 {
        match self {
            Resolution::Epoch { length_secs } => {
                let step = i64::from(length_secs) * 1000;
                (millis + step - 1).div_euclid(step)
            }
            Resolution::Sample { rate_hz } => {
                let scaled = millis * i64::from(rate_hz);
                (scaled + 999).div_euclid(1000)
            }
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Epoch { length_secs } => write!(f, "{length_secs}s epochs"),
            Resolution::Sample { rate_hz } => write!(f, "{rate_hz}Hz samples"),
        }
    }
}

/// A maximal run of non-wear slots, with half-open index bounds and the
/// corresponding timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonWearInterval {
    start_index: usize,
    end_index: usize,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl NonWearInterval {
    /// Index of the first non-wear slot.
    #[must_use]
    pub const fn start_index(&self) -> usize {
        self.start_index
    }

    /// Index one past the last non-wear slot.
    #[must_use]
    pub const fn end_index(&self) -> usize {
        self.end_index
    }

    /// Timestamp of the interval start.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Timestamp of the interval end (exclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Interval length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Wear classification on a uniform grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WearSeries {
    start: NaiveDateTime,
    resolution: Resolution,
    states: Vec<WearState>,
}

impl WearSeries {
    /// Create a series from classified slots.
    #[must_use]
    pub fn new(start: NaiveDateTime, resolution: Resolution, states: Vec<WearState>) -> Self {
        Self {
            start,
            resolution,
            states,
        }
    }

    /// Create an all-wear series of `len` slots.
    #[must_use]
    pub fn all_wear(start: NaiveDateTime, resolution: Resolution, len: usize) -> Self {
        Self::new(start, resolution, vec![WearState::Wear; len])
    }

    /// Paint reference intervals onto a grid: every slot that overlaps any
    /// interval becomes non-wear, everything else wear. Intervals outside
    /// the grid span are clamped away.
    #[must_use]
    pub fn from_intervals(
        start: NaiveDateTime,
        resolution: Resolution,
        len: usize,
        intervals: &[(NaiveDateTime, NaiveDateTime)],
    ) -> Self {
        let mut states = vec![WearState::Wear; len];
        for &(from, to) in intervals {
            if to <= from {
                continue;
            }
            let from_ms = (from - start).num_milliseconds();
            let to_ms = (to - start).num_milliseconds();
            let first = resolution.floor_index(from_ms).max(0) as usize;
            let last = resolution.ceil_index(to_ms).max(0) as usize;
            let last = last.min(len);
            if first >= last {
                continue;
            }
            for state in &mut states[first..last] {
                *state = WearState::NonWear;
            }
        }
        Self::new(start, resolution, states)
    }

    /// Timestamp of the first slot.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Grid resolution.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Classified slots in order.
    #[must_use]
    pub fn states(&self) -> &[WearState] {
        &self.states
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the series holds no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Timestamp of the slot at `index`.
    #[must_use]
    pub fn timestamp_at(&self, index: usize) -> NaiveDateTime {
        self.start + Duration::nanoseconds(self.resolution.offset_nanos(index))
    }

    /// Fraction of slots classified non-wear, 0.0 for an empty series.
    #[must_use]
    pub fn non_wear_fraction(&self) -> f64 {
        if self.states.is_empty() {
            return 0.0;
        }
        let non_wear = self.states.iter().filter(|s| s.is_non_wear()).count();
        non_wear as f64 / self.states.len() as f64
    }

    /// Total non-wear time.
    #[must_use]
    pub fn total_non_wear(&self) -> Duration {
        let non_wear = self.states.iter().filter(|s| s.is_non_wear()).count();
        Duration::nanoseconds(self.resolution.offset_nanos(non_wear))
    }

    /// Maximal non-wear runs with their timestamps.
    #[must_use]
    pub fn non_wear_intervals(&self) -> Vec<NonWearInterval> {
        let mut intervals = Vec::new();
        let mut run_start: Option<usize> = None;

        for (i, state) in self.states.iter().enumerate() {
            match (state.is_non_wear(), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    intervals.push(self.interval(start, i));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            intervals.push(self.interval(start, self.states.len()));
        }
        intervals
    }

    fn interval(&self, start_index: usize, end_index: usize) -> NonWearInterval {
        NonWearInterval {
            start_index,
            end_index,
            start: self.timestamp_at(start_index),
            end: self.timestamp_at(end_index),
        }
    }

    /// Resample to an epoch grid of `target_secs` by majority vote per
    /// target slot; exactly half non-wear counts as non-wear. The trailing
    /// partial slot is voted over the source states it covers.
    pub fn resample_to(&self, target_secs: u32) -> Result<WearSeries, DomainError> {
        if target_secs == 0 {
            return Err(DomainError::InvalidResample {
                reason: "target step is zero".to_string(),
            });
        }

        let per_slot = match self.resolution {
            Resolution::Epoch { length_secs } => {
                if length_secs == target_secs {
                    return Ok(self.clone());
                }
                if target_secs % length_secs != 0 {
                    return Err(DomainError::InvalidResample {
                        reason: format!(
                            "target {target_secs}s is not a multiple of source {length_secs}s"
                        ),
                    });
                }
                (target_secs / length_secs) as usize
            }
            Resolution::Sample { rate_hz } => rate_hz as usize * target_secs as usize,
        };

        let states = self
            .states
            .chunks(per_slot)
            .map(|chunk| {
                let non_wear = chunk.iter().filter(|s| s.is_non_wear()).count();
                if non_wear * 2 >= chunk.len() {
                    WearState::NonWear
                } else {
                    WearState::Wear
                }
            })
            .collect();

        Ok(WearSeries::new(
            self.start,
            Resolution::Epoch {
                length_secs: target_secs,
            },
            states,
        ))
    }

    /// Verify that another series shares this grid exactly.
    pub fn matches_grid(&self, other: &WearSeries) -> Result<(), DomainError> {
        if self.start != other.start {
            return Err(DomainError::GridMismatch {
                reason: format!("starts differ: {} vs {}", self.start, other.start),
            });
        }
        if self.resolution != other.resolution {
            return Err(DomainError::GridMismatch {
                reason: format!(
                    "resolutions differ: {} vs {}",
                    self.resolution, other.resolution
                ),
            });
        }
        if self.states.len() != other.states.len() {
            return Err(DomainError::GridMismatch {
                reason: format!(
                    "lengths differ: {} vs {}",
                    self.states.len(),
                    other.states.len()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn minute_series(pattern: &[u8]) -> WearSeries {
        let states = pattern
            .iter()
            .map(|&b| {
                if b == 1 {
                    WearState::NonWear
                } else {
                    WearState::Wear
                }
            })
            .collect();
        WearSeries::new(start(), Resolution::Epoch { length_secs: 60 }, states)
    }

    #[test]
    fn intervals_capture_maximal_runs() {
        let series = minute_series(&[0, 1, 1, 1, 0, 0, 1, 1]);
        let intervals = series.non_wear_intervals();
        assert_eq!(intervals.len(), 2);

        assert_eq!(intervals[0].start_index(), 1);
        assert_eq!(intervals[0].end_index(), 4);
        assert_eq!(intervals[0].start(), start() + Duration::minutes(1));
        assert_eq!(intervals[0].end(), start() + Duration::minutes(4));
        assert_eq!(intervals[0].duration(), Duration::minutes(3));

        // trailing run is closed at the end of the series
        assert_eq!(intervals[1].start_index(), 6);
        assert_eq!(intervals[1].end_index(), 8);
    }

    #[test]
    fn from_intervals_paints_overlapping_slots() {
        let intervals = [(
            start() + Duration::seconds(90),
            start() + Duration::seconds(150),
        )];
        let series = WearSeries::from_intervals(
            start(),
            Resolution::Epoch { length_secs: 60 },
            4,
            &intervals,
        );
        // 90s-150s touches minutes 1 and 2
        assert_eq!(
            series.states(),
            &[
                WearState::Wear,
                WearState::NonWear,
                WearState::NonWear,
                WearState::Wear
            ]
        );
    }

    #[test]
    fn from_intervals_clamps_outside_span() {
        let intervals = [
            (start() - Duration::hours(1), start() + Duration::seconds(30)),
            (start() + Duration::hours(5), start() + Duration::hours(6)),
        ];
        let series = WearSeries::from_intervals(
            start(),
            Resolution::Epoch { length_secs: 60 },
            3,
            &intervals,
        );
        assert_eq!(
            series.states(),
            &[WearState::NonWear, WearState::Wear, WearState::Wear]
        );
    }

    #[test]
    fn resample_majority_votes_with_sticky_ties() {
        let half = WearSeries::new(
            start(),
            Resolution::Epoch { length_secs: 30 },
            vec![
                WearState::NonWear,
                WearState::Wear, // exactly half of the first minute
                WearState::Wear,
                WearState::Wear,
            ],
        );
        let minute = half.resample_to(60).unwrap();
        assert_eq!(minute.states(), &[WearState::NonWear, WearState::Wear]);
    }

    #[test]
    fn resample_from_samples_counts_whole_seconds() {
        let mut states = vec![WearState::NonWear; 10 * 30];
        states.extend(vec![WearState::Wear; 50 * 30]);
        let series = WearSeries::new(start(), Resolution::Sample { rate_hz: 30 }, states);

        let minute = series.resample_to(60).unwrap();
        assert_eq!(minute.len(), 1);
        // 10s of 60s non-wear is a minority
        assert_eq!(minute.states(), &[WearState::Wear]);

        let ten_secs = series.resample_to(10).unwrap();
        assert_eq!(ten_secs.len(), 6);
        assert!(ten_secs.states()[0].is_non_wear());
        assert!(!ten_secs.states()[1].is_non_wear());
    }

    #[test]
    fn resample_rejects_incompatible_epoch_targets() {
        let series = minute_series(&[0, 1]);
        assert!(matches!(
            series.resample_to(90),
            Err(DomainError::InvalidResample { .. })
        ));
    }

    #[test]
    fn grid_match_catches_every_axis_of_difference() {
        let a = minute_series(&[0, 1]);
        assert!(a.matches_grid(&minute_series(&[1, 0])).is_ok());

        let shifted = WearSeries::new(
            start() + Duration::seconds(1),
            Resolution::Epoch { length_secs: 60 },
            vec![WearState::Wear, WearState::Wear],
        );
        assert!(a.matches_grid(&shifted).is_err());

        let shorter = minute_series(&[0]);
        assert!(a.matches_grid(&shorter).is_err());

        let sampled = WearSeries::new(
            start(),
            Resolution::Sample { rate_hz: 30 },
            vec![WearState::Wear, WearState::Wear],
        );
        assert!(a.matches_grid(&sampled).is_err());
    }

    #[test]
    fn totals_and_fractions() {
        let series = minute_series(&[1, 1, 0, 0]);
        assert_eq!(series.total_non_wear(), Duration::minutes(2));
        assert!((series.non_wear_fraction() - 0.5).abs() < 1e-12);
    }
}
