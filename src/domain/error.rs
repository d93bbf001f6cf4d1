//! Domain validation errors for core domain types.
//!
//! These errors are returned by operations that would otherwise violate a
//! grid or aggregation invariant: resampling an epoch series to an
//! incompatible length, scoring two wear series laid out on different grids,
//! or comparing against a reference annotation that never touches the
//! recording.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Two wear series must share start, resolution, and length to be scored.
    #[error("wear series grids differ: {reason}")]
    GridMismatch { reason: String },

    /// Resampling targets must be reachable from the source grid.
    #[error("cannot resample: {reason}")]
    InvalidResample { reason: String },

    /// The reference annotation has intervals, but none intersect the
    /// recording span. Almost always a mispaired file.
    #[error("reference annotation covers none of the recording span")]
    EmptyReference,
}
