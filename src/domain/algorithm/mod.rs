//! Pluggable non-wear detection algorithms.
//!
//! This module provides a pluggable algorithm system supporting the four
//! published detectors the comparison covers:
//!
//! - **Hecht 2009**: at least 5 consecutive minutes of zero VMU
//! - **Troiano 2007**: 60 minutes of zero counts with a small spike allowance
//! - **Choi 2011**: 90 minutes of zero counts with validated spike windows
//! - **van Hees 2013**: per-axis standard deviation and range over raw windows
//!
//! # Architecture
//!
//! Each algorithm implements the [`NonWearAlgorithm`] trait, which defines:
//! - `name()` - Unique identifier for logging/config
//! - `applies_to()` - Whether the algorithm can run on the available data
//! - `detect()` - Core classification logic
//!
//! The [`AlgorithmRegistry`] manages enabled algorithms and coordinates
//! detection over one recording.
//!
//! # Example
//!
//! ```ignore
//! use wearwolf::domain::algorithm::{AlgorithmRegistry, Choi2011Algorithm};
//!
//! let mut registry = AlgorithmRegistry::new();
//! registry.register(Box::new(Choi2011Algorithm::new(Default::default())));
//!
//! let detections = registry.detect_all(&ctx)?;
//! ```

mod context;
pub mod choi_2011;
pub mod hecht_2009;
pub mod hees_2013;
pub mod troiano_2007;

pub use choi_2011::{Choi2011Algorithm, Choi2011Config};
pub use context::{DataContext, Detection, DetectionContext};
pub use hecht_2009::{Hecht2009Algorithm, Hecht2009Config};
pub use hees_2013::{Hees2013Algorithm, Hees2013Config};
pub use troiano_2007::{Troiano2007Algorithm, Troiano2007Config};

use crate::domain::wear::WearSeries;
use crate::error::AlgorithmError;

/// Names of every built-in algorithm, in canonical order.
pub const ALGORITHM_NAMES: [&str; 4] = ["hecht_2009", "troiano_2007", "choi_2011", "hees_2013"];

/// A detector that classifies a recording into wear and non-wear time.
///
/// Algorithms encapsulate one published detection method. Each algorithm
/// can be configured independently and may require different input data.
pub trait NonWearAlgorithm: Send + Sync {
    /// Unique identifier for this algorithm.
    ///
    /// Used in configuration and logging.
    fn name(&self) -> &'static str;

    /// Check if this algorithm can run on the available data.
    ///
    /// Epoch algorithms need an epoch series, the raw algorithm needs
    /// raw samples.
    fn applies_to(&self, ctx: &DataContext) -> bool;

    /// Classify the recording in `ctx` into a wear series.
    ///
    /// The returned series covers the full input span on the input's own
    /// grid (epoch or sample resolution).
    fn detect(&self, ctx: &DetectionContext) -> Result<WearSeries, AlgorithmError>;
}

/// Registry of enabled algorithms.
///
/// The registry manages a collection of algorithms and coordinates
/// running them against one recording.
#[derive(Default)]
pub struct AlgorithmRegistry {
    algorithms: Vec<Box<dyn NonWearAlgorithm>>,
}

impl AlgorithmRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an algorithm.
    ///
    /// Algorithms are run in registration order.
    pub fn register(&mut self, algorithm: Box<dyn NonWearAlgorithm>) {
        self.algorithms.push(algorithm);
    }

    /// Get all registered algorithms.
    #[must_use]
    pub fn algorithms(&self) -> &[Box<dyn NonWearAlgorithm>] {
        &self.algorithms
    }

    /// Number of registered algorithms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Run all applicable algorithms and collect their series.
    ///
    /// Only algorithms where `applies_to()` returns true are run; the rest
    /// are skipped silently so one registry can serve mixed inputs.
    pub fn detect_all(&self, ctx: &DetectionContext) -> Result<Vec<Detection>, AlgorithmError> {
        let data_ctx = ctx.data_context();
        let mut detections = Vec::new();
        for algorithm in self.algorithms.iter().filter(|a| a.applies_to(&data_ctx)) {
            let series = algorithm.detect(ctx)?;
            detections.push(Detection::new(algorithm.name(), series));
        }
        Ok(detections)
    }

    /// Run every registered algorithm, whether or not it applies.
    ///
    /// Unlike [`Self::detect_all`], an algorithm whose required input is
    /// missing surfaces its error. Used when the caller asked for specific
    /// algorithms by name.
    pub fn detect_required(
        &self,
        ctx: &DetectionContext,
    ) -> Result<Vec<Detection>, AlgorithmError> {
        self.algorithms
            .iter()
            .map(|algorithm| Ok(Detection::new(algorithm.name(), algorithm.detect(ctx)?)))
            .collect()
    }
}

/// Convert a parameter given in minutes to a whole number of epochs.
///
/// The published algorithms are defined on 60s epochs; running them on other
/// epoch lengths only makes sense when the minute spans still land on epoch
/// boundaries.
pub(crate) fn epochs_for_minutes(
    minutes: u32,
    epoch_length_secs: u32,
    algorithm: &'static str,
    field: &str,
) -> Result<usize, AlgorithmError> {
    let seconds = minutes * 60;
    if epoch_length_secs == 0 || seconds % epoch_length_secs != 0 {
        return Err(AlgorithmError::InvalidParameter {
            name: algorithm,
            reason: format!(
                "{field} of {minutes}min does not divide into {epoch_length_secs}s epochs"
            ),
        });
    }
    Ok((seconds / epoch_length_secs) as usize)
}
