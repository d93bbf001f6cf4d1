//! Format-agnostic domain logic for non-wear detection.

mod epoch;
mod magnitude;
mod metrics;
mod raw;
mod sample;
mod wear;

pub mod algorithm;
pub mod error;

// Core domain types
pub use epoch::{EpochCounts, EpochSeries};
pub use raw::RawRecording;
pub use sample::{Axis, RawSample};

// Classification and scoring
pub use metrics::ConfusionMatrix;
pub use wear::{NonWearInterval, Resolution, WearSeries, WearState};

// Signal helpers
pub use magnitude::{enmo, vector_magnitude};

pub use error::DomainError;
