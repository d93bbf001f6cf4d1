//! Van Hees 2013 non-wear algorithm for raw acceleration.
//!
//! The only detector here that works on raw samples instead of epoch
//! counts. It slides a 60-minute window in 15-minute steps and marks the
//! whole window non-wear when at least two of the three axes are still:
//! a per-axis standard deviation under 3 mg or a value range under 50 mg.
//!
//! van Hees VT, Gorzelniak L, Dean Leon EC, et al. Separating movement
//! and gravity components in an acceleration signal and implications for
//! the assessment of human daily physical activity. PLoS One.
//! 2013;8(4):e61691.

use serde::Deserialize;
use tracing::warn;

use super::{DataContext, DetectionContext, NonWearAlgorithm};
use crate::domain::raw::RawRecording;
use crate::domain::sample::Axis;
use crate::domain::wear::{Resolution, WearSeries, WearState};
use crate::error::AlgorithmError;

/// Configuration for van Hees 2013 detection.
#[derive(Debug, Clone, Deserialize)]
pub struct Hees2013Config {
    /// Length of the sliding window.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,

    /// Step between successive windows.
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,

    /// An axis is still when its standard deviation is under this, in mg.
    #[serde(default = "default_std_threshold_mg")]
    pub std_threshold_mg: f64,

    /// An axis is also still when its value range is under this, in mg.
    #[serde(default = "default_range_threshold_mg")]
    pub range_threshold_mg: f64,

    /// Number of still axes required to call a window non-wear.
    #[serde(default = "default_min_axes")]
    pub min_axes: u32,
}

fn default_window_minutes() -> u32 {
    60
}

fn default_step_minutes() -> u32 {
    15
}

fn default_std_threshold_mg() -> f64 {
    3.0
}

fn default_range_threshold_mg() -> f64 {
    50.0
}

fn default_min_axes() -> u32 {
    2
}

impl Default for Hees2013Config {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
            step_minutes: default_step_minutes(),
            std_threshold_mg: default_std_threshold_mg(),
            range_threshold_mg: default_range_threshold_mg(),
            min_axes: default_min_axes(),
        }
    }
}

/// Van Hees 2013 detector.
pub struct Hees2013Algorithm {
    config: Hees2013Config,
}

impl Hees2013Algorithm {
    /// Create a new algorithm with the given configuration.
    #[must_use]
    pub const fn new(config: Hees2013Config) -> Self {
        Self { config }
    }

    /// Get the algorithm configuration.
    #[must_use]
    pub const fn config(&self) -> &Hees2013Config {
        &self.config
    }
}

impl NonWearAlgorithm for Hees2013Algorithm {
    fn name(&self) -> &'static str {
        "hees_2013"
    }

    fn applies_to(&self, ctx: &DataContext) -> bool {
        ctx.has_raw
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<WearSeries, AlgorithmError> {
        let raw = ctx.require_raw(self.name())?;
        detect_hees_2013(raw, &self.config)
    }
}

/// Per-axis spread over one window.
struct AxisSpread {
    std: f64,
    range: f64,
}

fn axis_spread(recording: &RawRecording, axis: Axis, start: usize, end: usize) -> AxisSpread {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let n = (end - start) as f64;

    for sample in &recording.samples()[start..end] {
        let v = f64::from(sample.axis(axis));
        min = min.min(v);
        max = max.max(v);
        sum += v;
        sum_sq += v * v;
    }

    let mean = sum / n;
    // population variance, clamped against rounding below zero
    let variance = (sum_sq / n - mean * mean).max(0.0);
    AxisSpread {
        std: variance.sqrt(),
        range: max - min,
    }
}

/// Core detection logic for van Hees 2013.
///
/// Windows that extend past the end of the recording are not evaluated.
/// Overlapping qualifying windows paint their union, so one still hour
/// inside a longer recording is marked exactly once.
pub fn detect_hees_2013(
    recording: &RawRecording,
    config: &Hees2013Config,
) -> Result<WearSeries, AlgorithmError> {
    if config.window_minutes == 0 || config.step_minutes == 0 {
        return Err(AlgorithmError::InvalidParameter {
            name: "hees_2013",
            reason: "window_minutes and step_minutes must be positive".to_string(),
        });
    }
    if config.min_axes == 0 || config.min_axes > 3 {
        return Err(AlgorithmError::InvalidParameter {
            name: "hees_2013",
            reason: format!("min_axes must be between 1 and 3, got {}", config.min_axes),
        });
    }

    let rate = recording.sample_rate() as usize;
    let window_samples = config.window_minutes as usize * 60 * rate;
    let step_samples = config.step_minutes as usize * 60 * rate;
    let resolution = Resolution::Sample {
        rate_hz: recording.sample_rate(),
    };

    if recording.len() < window_samples {
        warn!(
            samples = recording.len(),
            required = window_samples,
            "recording shorter than one detection window, classifying everything as wear"
        );
        return Ok(WearSeries::all_wear(
            recording.start(),
            resolution,
            recording.len(),
        ));
    }

    let std_threshold = config.std_threshold_mg / 1000.0;
    let range_threshold = config.range_threshold_mg / 1000.0;

    let mut states = vec![WearState::Wear; recording.len()];
    let mut window_start = 0usize;
    while window_start + window_samples <= recording.len() {
        let window_end = window_start + window_samples;
        let still_axes = Axis::ALL
            .iter()
            .filter(|&&axis| {
                let spread = axis_spread(recording, axis, window_start, window_end);
                spread.std < std_threshold || spread.range < range_threshold
            })
            .count();

        if still_axes >= config.min_axes as usize {
            states[window_start..window_end].fill(WearState::NonWear);
        }
        window_start += step_samples;
    }

    Ok(WearSeries::new(recording.start(), resolution, states))
}
