//! Synthetic recordings with known non-wear ground truth.
//!
//! Enabled via the `testkit` feature; the crate dev-depends on itself with
//! the feature turned on so integration tests can use these builders.
//!
//! # Modules
//!
//! - [`epoch`] - [`EpochSeriesBuilder`]: count series assembled from active
//!   and still segments.
//! - [`raw`] - [`RawRecordingBuilder`]: raw samples with movement as a noisy
//!   sinusoid and non-wear as near-still gravity.
//!
//! Both builders record the spans they generated as non-wear, so a test can
//! score a detection against the data's own reference annotation.

pub mod epoch;
pub mod raw;

pub use epoch::EpochSeriesBuilder;
pub use raw::RawRecordingBuilder;
