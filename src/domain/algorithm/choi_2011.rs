//! Choi 2011 non-wear algorithm.
//!
//! Extends Troiano 2007 with a longer 90-minute window and a validation
//! step: a nonzero spike inside a candidate run is only tolerated when the
//! 30 minutes upstream and downstream of it are themselves free of counts.
//!
//! Choi L, Liu Z, Matthews CE, Buchowski MS. Validation of accelerometer
//! wear and nonwear time classification algorithm. Med Sci Sports Exerc.
//! 2011;43(2):357-64.

use serde::Deserialize;
use tracing::warn;

use super::{epochs_for_minutes, DataContext, DetectionContext, NonWearAlgorithm};
use crate::domain::epoch::EpochSeries;
use crate::domain::sample::Axis;
use crate::domain::wear::{Resolution, WearSeries, WearState};
use crate::error::AlgorithmError;

/// Configuration for Choi 2011 detection.
#[derive(Debug, Clone, Deserialize)]
pub struct Choi2011Config {
    /// Counts at or below this value are treated as zero.
    #[serde(default = "default_activity_threshold")]
    pub activity_threshold: f64,

    /// Minimum run length that counts as non-wear.
    #[serde(default = "default_min_period_minutes")]
    pub min_period_minutes: u32,

    /// Minutes of consecutive nonzero counts tolerated inside one run.
    #[serde(default = "default_spike_tolerance_minutes")]
    pub spike_tolerance_minutes: u32,

    /// Length of the upstream and downstream validation windows.
    #[serde(default = "default_min_window_minutes")]
    pub min_window_minutes: u32,

    /// Use the VMU of all three axes instead of axis 1 alone.
    #[serde(default)]
    pub use_vector_magnitude: bool,
}

fn default_activity_threshold() -> f64 {
    0.0
}

fn default_min_period_minutes() -> u32 {
    90
}

fn default_spike_tolerance_minutes() -> u32 {
    2
}

fn default_min_window_minutes() -> u32 {
    30
}

impl Default for Choi2011Config {
    fn default() -> Self {
        Self {
            activity_threshold: default_activity_threshold(),
            min_period_minutes: default_min_period_minutes(),
            spike_tolerance_minutes: default_spike_tolerance_minutes(),
            min_window_minutes: default_min_window_minutes(),
            use_vector_magnitude: false,
        }
    }
}

/// Choi 2011 detector.
pub struct Choi2011Algorithm {
    config: Choi2011Config,
}

impl Choi2011Algorithm {
    /// Create a new algorithm with the given configuration.
    #[must_use]
    pub const fn new(config: Choi2011Config) -> Self {
        Self { config }
    }

    /// Get the algorithm configuration.
    #[must_use]
    pub const fn config(&self) -> &Choi2011Config {
        &self.config
    }
}

impl NonWearAlgorithm for Choi2011Algorithm {
    fn name(&self) -> &'static str {
        "choi_2011"
    }

    fn applies_to(&self, ctx: &DataContext) -> bool {
        ctx.has_epochs
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<WearSeries, AlgorithmError> {
        let epochs = ctx.require_epochs(self.name())?;
        detect_choi_2011(epochs, &self.config)
    }
}

/// Core detection logic for Choi 2011.
///
/// A candidate run starts at a zero-count epoch. Every spike inside a run
/// is validated against its surroundings: the upstream window skips the
/// spike allowance itself, the downstream window skips the epoch right
/// before the spike. Activity in either window closes the run at the
/// spike, as does exceeding the consecutive spike allowance. Closed runs
/// are kept when they reach the minimum period, even when a dirty window
/// closed them. A run still open at the end of the recording is closed
/// after its last zero epoch, so trailing spikes never pad the length.
pub fn detect_choi_2011(
    epochs: &EpochSeries,
    config: &Choi2011Config,
) -> Result<WearSeries, AlgorithmError> {
    let epoch_secs = epochs.epoch_length_secs();
    let min_epochs = epochs_for_minutes(
        config.min_period_minutes,
        epoch_secs,
        "choi_2011",
        "min_period_minutes",
    )?;
    let tolerance_epochs = epochs_for_minutes(
        config.spike_tolerance_minutes,
        epoch_secs,
        "choi_2011",
        "spike_tolerance_minutes",
    )?;
    let window_epochs = epochs_for_minutes(
        config.min_window_minutes,
        epoch_secs,
        "choi_2011",
        "min_window_minutes",
    )?;
    if min_epochs == 0 {
        return Err(AlgorithmError::InvalidParameter {
            name: "choi_2011",
            reason: "min_period_minutes must be positive".to_string(),
        });
    }

    let resolution = Resolution::Epoch {
        length_secs: epoch_secs,
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
    let threshold = config.activity_threshold;

    let clear = |lo: usize, hi: usize| {
        let hi = hi.min(signal.len());
        lo >= hi || signal[lo..hi].iter().all(|&v| v <= threshold)
    };

    let mut states = vec![WearState::Wear; signal.len()];
    let finish = |states: &mut Vec<WearState>, start: usize, end: usize| {
        if end - start >= min_epochs {
            states[start..end].fill(WearState::NonWear);
        }
    };

    let mut candidate: Option<usize> = None;
    let mut last_zero = 0usize;
    let mut consecutive_spikes = 0usize;

    for (i, &value) in signal.iter().enumerate() {
        let zero = value <= threshold;
        match candidate {
            None => {
                if zero {
                    candidate = Some(i);
                    last_zero = i;
                    consecutive_spikes = 0;
                }
            }
            Some(start) => {
                if zero {
                    last_zero = i;
                    consecutive_spikes = 0;
                } else {
                    consecutive_spikes += 1;
                    let upstream_clear = clear(i + tolerance_epochs, i + window_epochs + 1);
                    let downstream_clear =
                        clear(i.saturating_sub(window_epochs), i.saturating_sub(1));
                    if !upstream_clear || !downstream_clear || consecutive_spikes > tolerance_epochs
                    {
                        finish(&mut states, start, i);
                        candidate = None;
                    }
                }
            }
        }
    }
    if let Some(start) = candidate {
        finish(&mut states, start, last_zero + 1);
    }

    Ok(WearSeries::new(epochs.start(), resolution, states))
}
