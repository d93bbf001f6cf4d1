//! Raw (sample-level) accelerometer recordings.

use chrono::{Duration, NaiveDateTime};

use super::sample::{Axis, RawSample};

/// A uniformly-sampled tri-axial recording in g units.
///
/// The sample grid is defined by `start` and an integer `sample_rate` in Hz;
/// readers are responsible for delivering a gap-free sample vector (device
/// idle periods are filled during reading).
#[derive(Debug, Clone)]
pub struct RawRecording {
    start: NaiveDateTime,
    sample_rate: u32,
    samples: Vec<RawSample>,
}

impl RawRecording {
    /// Create a recording. `sample_rate` must be non-zero; readers validate
    /// this before construction.
    #[must_use]
    pub fn new(start: NaiveDateTime, sample_rate: u32, samples: Vec<RawSample>) -> Self {
        debug_assert!(sample_rate > 0, "sample rate must be non-zero");
        Self {
            start,
            sample_rate,
            samples,
        }
    }

    /// Timestamp of the first sample.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Sampling frequency in Hz.
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// All samples in acquisition order.
    #[must_use]
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the recording holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recording length in whole seconds (truncating a trailing partial
    /// second).
    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.samples.len() as u64 / u64::from(self.sample_rate)
    }

    /// Timestamp of the sample at `index`.
    ///
    /// Sub-second offsets are computed in integer nanoseconds, so the grid is
    /// monotone even for rates that do not divide a second evenly.
    #[must_use]
    pub fn timestamp_at(&self, index: usize) -> NaiveDateTime {
        let nanos = (index as i64).saturating_mul(1_000_000_000) / i64::from(self.sample_rate);
        self.start + Duration::nanoseconds(nanos)
    }

    /// Iterate a single axis.
    pub fn axis_values(&self, axis: Axis) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().map(move |s| s.axis(axis))
    }
}
