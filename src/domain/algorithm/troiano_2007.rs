//! Troiano 2007 non-wear algorithm.
//!
//! Classifies runs of at least 60 minutes of zero counts as non-wear,
//! allowing up to 2 minutes of low counts inside the run. A count at or
//! above the stop level ends the run immediately. This is the algorithm
//! behind the NHANES accelerometer analyses.
//!
//! Troiano RP, Berrigan D, Dodd KW, Masse LC, Tilert T, McDowell M.
//! Physical activity in the United States measured by accelerometer.
//! Med Sci Sports Exerc. 2008;40(1):181-8.

use serde::Deserialize;
use tracing::warn;

use super::{epochs_for_minutes, DataContext, DetectionContext, NonWearAlgorithm};
use crate::domain::epoch::EpochSeries;
use crate::domain::sample::Axis;
use crate::domain::wear::{Resolution, WearSeries, WearState};
use crate::error::AlgorithmError;

/// Configuration for Troiano 2007 detection.
#[derive(Debug, Clone, Deserialize)]
pub struct Troiano2007Config {
    /// Counts at or below this value are treated as zero.
    #[serde(default = "default_activity_threshold")]
    pub activity_threshold: f64,

    /// Minimum run length that counts as non-wear.
    #[serde(default = "default_min_period_minutes")]
    pub min_period_minutes: u32,

    /// Minutes of low nonzero counts tolerated inside one run.
    #[serde(default = "default_spike_tolerance_minutes")]
    pub spike_tolerance_minutes: u32,

    /// Counts at or above this level end the run regardless of tolerance.
    #[serde(default = "default_spike_stoplevel")]
    pub spike_stoplevel: f64,

    /// Use the VMU of all three axes instead of axis 1 alone.
    #[serde(default)]
    pub use_vector_magnitude: bool,
}

fn default_activity_threshold() -> f64 {
    0.0
}

fn default_min_period_minutes() -> u32 {
    60
}

fn default_spike_tolerance_minutes() -> u32 {
    2
}

fn default_spike_stoplevel() -> f64 {
    100.0
}

impl Default for Troiano2007Config {
    fn default() -> Self {
        Self {
            activity_threshold: default_activity_threshold(),
            min_period_minutes: default_min_period_minutes(),
            spike_tolerance_minutes: default_spike_tolerance_minutes(),
            spike_stoplevel: default_spike_stoplevel(),
            use_vector_magnitude: false,
        }
    }
}

/// Troiano 2007 detector.
pub struct Troiano2007Algorithm {
    config: Troiano2007Config,
}

impl Troiano2007Algorithm {
    /// Create a new algorithm with the given configuration.
    #[must_use]
    pub const fn new(config: Troiano2007Config) -> Self {
        Self { config }
    }

    /// Get the algorithm configuration.
    #[must_use]
    pub const fn config(&self) -> &Troiano2007Config {
        &self.config
    }
}

impl NonWearAlgorithm for Troiano2007Algorithm {
    fn name(&self) -> &'static str {
        "troiano_2007"
    }

    fn applies_to(&self, ctx: &DataContext) -> bool {
        ctx.has_epochs
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<WearSeries, AlgorithmError> {
        let epochs = ctx.require_epochs(self.name())?;
        detect_troiano_2007(epochs, &self.config)
    }
}

/// Core detection logic for Troiano 2007.
///
/// A candidate run starts at a zero-count epoch. Low counts below the stop
/// level are tolerated up to the configured total; the epoch that breaks a
/// run is excluded from it, tolerated spikes inside stay in. Runs still
/// open at the end of the recording are closed there.
pub fn detect_troiano_2007(
    epochs: &EpochSeries,
    config: &Troiano2007Config,
) -> Result<WearSeries, AlgorithmError> {
    let min_epochs = epochs_for_minutes(
        config.min_period_minutes,
        epochs.epoch_length_secs(),
        "troiano_2007",
        "min_period_minutes",
    )?;
    let tolerance_epochs = epochs_for_minutes(
        config.spike_tolerance_minutes,
        epochs.epoch_length_secs(),
        "troiano_2007",
        "spike_tolerance_minutes",
    )?;
    if min_epochs == 0 {
        return Err(AlgorithmError::InvalidParameter {
            name: "troiano_2007",
            reason: "min_period_minutes must be positive".to_string(),
        });
    }
    if config.spike_stoplevel <= config.activity_threshold {
        return Err(AlgorithmError::InvalidParameter {
            name: "troiano_2007",
            reason: "spike_stoplevel must exceed activity_threshold".to_string(),
        });
    }

    let resolution = Resolution::Epoch {
        length_secs: epochs.epoch_length_secs(),
    };
    if epochs.len() < min_epochs {
        warn!(
            epochs = epochs.len(),
            required = min_epochs,
            "recording shorter than the minimum non-wear period, classifying everything as wear"
        );
        return Ok(WearSeries::all_wear(epochs.start(), resolution, epochs.len()));
    }

    let signal = if config.use_vector_magnitude {
        epochs.vmu_values()
    } else {
        epochs.axis_values(Axis::X)
    };

    let mut states = vec![WearState::Wear; signal.len()];
    let mut candidate: Option<usize> = None;
    let mut spikes = 0usize;

    let finish = |states: &mut Vec<WearState>, start: usize, end: usize| {
        if end - start >= min_epochs {
            states[start..end].fill(WearState::NonWear);
        }
    };

    for (i, &value) in signal.iter().enumerate() {
        let zero = value <= config.activity_threshold;
        match candidate {
            None => {
                if zero {
                    candidate = Some(i);
                    spikes = 0;
                }
            }
            Some(start) => {
                if !zero {
                    if value >= config.spike_stoplevel {
                        finish(&mut states, start, i);
                        candidate = None;
                    } else {
                        spikes += 1;
                        if spikes > tolerance_epochs {
                            finish(&mut states, start, i);
                            candidate = None;
                        }
                    }
                }
            }
        }
    }
    if let Some(start) = candidate {
        finish(&mut states, start, signal.len());
    }

    Ok(WearSeries::new(epochs.start(), resolution, states))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::epoch::EpochCounts;
    use chrono::NaiveDate;

    fn make_series(counts: &[u32]) -> EpochSeries {
        let start = NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let epochs = counts
            .iter()
            .map(|&c| EpochCounts::new(c, 0, 0))
            .collect();
        EpochSeries::new(start, 60, epochs)
    }

    fn non_wear_count(series: &WearSeries) -> usize {
        series.states().iter().filter(|s| s.is_non_wear()).count()
    }

    #[test]
    fn test_algorithm_name() {
        let algorithm = Troiano2007Algorithm::new(Troiano2007Config::default());
        assert_eq!(algorithm.name(), "troiano_2007");
    }

    #[test]
    fn test_sixty_zero_minutes_are_non_wear() {
        let series = make_series(&[0; 60]);
        let result = detect_troiano_2007(&series, &Troiano2007Config::default()).unwrap();
        assert_eq!(non_wear_count(&result), 60);
    }

    #[test]
    fn test_fifty_nine_zero_minutes_stay_wear() {
        let mut counts = vec![500];
        counts.extend(vec![0; 59]);
        counts.push(500);
        let series = make_series(&counts);

        let result = detect_troiano_2007(&series, &Troiano2007Config::default()).unwrap();
        assert_eq!(non_wear_count(&result), 0);
    }

    #[test]
    fn test_low_spikes_are_tolerated_inside_run() {
        // two 1-minute spikes of 50 counts inside 62 minutes
        let mut counts = vec![0; 20];
        counts.push(50);
        counts.extend(vec![0; 20]);
        counts.push(50);
        counts.extend(vec![0; 20]);
        let series = make_series(&counts);

        let result = detect_troiano_2007(&series, &Troiano2007Config::default()).unwrap();
        let intervals = result.non_wear_intervals();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start_index(), 0);
        assert_eq!(intervals[0].end_index(), 62);
    }

    #[test]
    fn test_third_spike_ends_the_run() {
        let mut counts = vec![0; 20];
        counts.push(50);
        counts.extend(vec![0; 20]);
        counts.push(50);
        counts.extend(vec![0; 20]);
        counts.push(50);
        counts.extend(vec![0; 30]);
        let series = make_series(&counts);

        let result = detect_troiano_2007(&series, &Troiano2007Config::default()).unwrap();
        let intervals = result.non_wear_intervals();
        // first run closes before the third spike, the 30-minute tail is too short
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start_index(), 0);
        assert_eq!(intervals[0].end_index(), 62);
    }

    #[test]
    fn test_stoplevel_count_ends_the_run_without_tolerance() {
        let mut counts = vec![0; 59];
        counts.push(150);
        counts.extend(vec![0; 59]);
        let series = make_series(&counts);

        let result = detect_troiano_2007(&series, &Troiano2007Config::default()).unwrap();
        // both halves fall short of 60 minutes
        assert_eq!(non_wear_count(&result), 0);
    }

    #[test]
    fn test_axis1_only_by_default() {
        let start = NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        // movement on axis 2 only
        let epochs = (0..60).map(|_| EpochCounts::new(0, 500, 0)).collect();
        let series = EpochSeries::new(start, 60, epochs);

        let default_result = detect_troiano_2007(&series, &Troiano2007Config::default()).unwrap();
        assert_eq!(non_wear_count(&default_result), 60);

        let vmu_config = Troiano2007Config {
            use_vector_magnitude: true,
            ..Troiano2007Config::default()
        };
        let vmu_result = detect_troiano_2007(&series, &vmu_config).unwrap();
        assert_eq!(non_wear_count(&vmu_result), 0);
    }

    #[test]
    fn test_short_recording_is_all_wear() {
        let series = make_series(&[0; 30]);
        let result = detect_troiano_2007(&series, &Troiano2007Config::default()).unwrap();
        assert_eq!(result.len(), 30);
        assert_eq!(non_wear_count(&result), 0);
    }

    #[test]
    fn test_rejects_stoplevel_below_threshold() {
        let series = make_series(&[0; 60]);
        let config = Troiano2007Config {
            activity_threshold: 200.0,
            spike_stoplevel: 100.0,
            ..Troiano2007Config::default()
        };
        assert!(matches!(
            detect_troiano_2007(&series, &config),
            Err(AlgorithmError::InvalidParameter { .. })
        ));
    }
}
