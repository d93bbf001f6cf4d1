//! Context types for algorithm detection.
//!
//! These types carry the loaded recording data into algorithms and
//! describe what data is available so algorithms can opt out.

use crate::domain::epoch::EpochSeries;
use crate::domain::raw::RawRecording;
use crate::domain::wear::WearSeries;
use crate::error::AlgorithmError;

/// Context describing which kinds of data a recording offers.
///
/// Algorithms use this to determine applicability before detection runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataContext {
    /// Whether an epoch count series is available.
    pub has_epochs: bool,
    /// Whether raw acceleration samples are available.
    pub has_raw: bool,
}

impl DataContext {
    /// Context for a recording that only carries epoch counts.
    #[must_use]
    pub const fn epochs_only() -> Self {
        Self {
            has_epochs: true,
            has_raw: false,
        }
    }

    /// Context for a recording that only carries raw samples.
    #[must_use]
    pub const fn raw_only() -> Self {
        Self {
            has_epochs: false,
            has_raw: true,
        }
    }

    /// Check if no usable data is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.has_epochs && !self.has_raw
    }
}

/// Full context for detection, holding the loaded recording data.
///
/// This is passed to algorithms' `detect()` method. A context may hold
/// epoch counts, raw samples, or both when a recording provides them.
#[derive(Default)]
pub struct DetectionContext<'a> {
    epochs: Option<&'a EpochSeries>,
    raw: Option<&'a RawRecording>,
}

impl<'a> DetectionContext<'a> {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an epoch count series.
    #[must_use]
    pub fn with_epochs(mut self, epochs: &'a EpochSeries) -> Self {
        self.epochs = Some(epochs);
        self
    }

    /// Attach a raw sample recording.
    #[must_use]
    pub fn with_raw(mut self, raw: &'a RawRecording) -> Self {
        self.raw = Some(raw);
        self
    }

    /// The epoch series, if one is attached.
    #[must_use]
    pub fn epochs(&self) -> Option<&'a EpochSeries> {
        self.epochs
    }

    /// The raw recording, if one is attached.
    #[must_use]
    pub fn raw(&self) -> Option<&'a RawRecording> {
        self.raw
    }

    /// The epoch series, or an error naming the algorithm that needed it.
    pub fn require_epochs(&self, algorithm: &'static str) -> Result<&'a EpochSeries, AlgorithmError> {
        self.epochs
            .ok_or(AlgorithmError::EpochDataRequired { name: algorithm })
    }

    /// The raw recording, or an error naming the algorithm that needed it.
    pub fn require_raw(&self, algorithm: &'static str) -> Result<&'a RawRecording, AlgorithmError> {
        self.raw
            .ok_or(AlgorithmError::RawDataRequired { name: algorithm })
    }

    /// Summarize what data is available.
    #[must_use]
    pub fn data_context(&self) -> DataContext {
        DataContext {
            has_epochs: self.epochs.is_some(),
            has_raw: self.raw.is_some(),
        }
    }
}

/// One algorithm's classification of one recording.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Name of the algorithm that produced the series.
    pub algorithm: &'static str,
    /// The classified series.
    pub series: WearSeries,
}

impl Detection {
    /// Pair an algorithm name with its series.
    #[must_use]
    pub fn new(algorithm: &'static str, series: WearSeries) -> Self {
        Self { algorithm, series }
    }
}
