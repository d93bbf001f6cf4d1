//! Hecht 2009 non-wear algorithm.
//!
//! Classifies every run of at least 5 consecutive minutes with zero VMU
//! as non-wear. The shortest window of the four algorithms, so it is the
//! most eager to call short still periods non-wear.
//!
//! Hecht A, Ma S, Porszasz J, Casaburi R. Methodology for using long-term
//! accelerometry monitoring to describe daily activity patterns in COPD.
//! COPD. 2009;6(2):121-9.

use serde::Deserialize;
use tracing::warn;

use super::{epochs_for_minutes, DataContext, DetectionContext, NonWearAlgorithm};
use crate::domain::epoch::EpochSeries;
use crate::domain::wear::{Resolution, WearSeries, WearState};
use crate::error::AlgorithmError;

/// Configuration for Hecht 2009 detection.
#[derive(Debug, Clone, Deserialize)]
pub struct Hecht2009Config {
    /// VMU at or below this value counts as zero.
    #[serde(default = "default_vmu_threshold")]
    pub vmu_threshold: f64,

    /// Minimum run of zero-VMU minutes that counts as non-wear.
    #[serde(default = "default_min_period_minutes")]
    pub min_period_minutes: u32,
}

fn default_vmu_threshold() -> f64 {
    0.0
}

fn default_min_period_minutes() -> u32 {
    5
}

impl Default for Hecht2009Config {
    fn default() -> Self {
        Self {
            vmu_threshold: default_vmu_threshold(),
            min_period_minutes: default_min_period_minutes(),
        }
    }
}

/// Hecht 2009 detector.
pub struct Hecht2009Algorithm {
    config: Hecht2009Config,
}

impl Hecht2009Algorithm {
    /// Create a new algorithm with the given configuration.
    #[must_use]
    pub const fn new(config: Hecht2009Config) -> Self {
        Self { config }
    }

    /// Get the algorithm configuration.
    #[must_use]
    pub const fn config(&self) -> &Hecht2009Config {
        &self.config
    }
}

impl NonWearAlgorithm for Hecht2009Algorithm {
    fn name(&self) -> &'static str {
        "hecht_2009"
    }

    fn applies_to(&self, ctx: &DataContext) -> bool {
        ctx.has_epochs
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<WearSeries, AlgorithmError> {
        let epochs = ctx.require_epochs(self.name())?;
        detect_hecht_2009(epochs, &self.config)
    }
}

/// Core detection logic for Hecht 2009.
///
/// Scans the VMU signal for maximal runs at or below the threshold and
/// keeps every run spanning at least the minimum period.
pub fn detect_hecht_2009(
    epochs: &EpochSeries,
    config: &Hecht2009Config,
) -> Result<WearSeries, AlgorithmError> {
    let min_epochs = epochs_for_minutes(
        config.min_period_minutes,
        epochs.epoch_length_secs(),
        "hecht_2009",
        "min_period_minutes",
    )?;
    if min_epochs == 0 {
        return Err(AlgorithmError::InvalidParameter {
            name: "hecht_2009",
            reason: "min_period_minutes must be positive".to_string(),
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

    let signal = epochs.vmu_values();
    let mut states = vec![WearState::Wear; signal.len()];

    let mut run_start: Option<usize> = None;
    for (i, &vmu) in signal.iter().enumerate() {
        if vmu <= config.vmu_threshold {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            if i - start >= min_epochs {
                states[start..i].fill(WearState::NonWear);
            }
        }
    }
    if let Some(start) = run_start {
        if signal.len() - start >= min_epochs {
            states[start..].fill(WearState::NonWear);
        }
    }

    Ok(WearSeries::new(epochs.start(), resolution, states))
}
