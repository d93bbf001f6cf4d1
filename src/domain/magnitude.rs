//! Vector magnitude over three axis values.

/// Euclidean vector magnitude of three axis values.
///
/// On epoch counts this is the VMU; on raw g data it is the total
/// acceleration including gravity.
#[must_use]
pub fn vector_magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

/// Euclidean norm minus one g, negatives truncated to zero.
///
/// The gravity-removed magnitude used on raw acceleration; a resting
/// device reads close to zero.
#[must_use]
pub fn enmo(x: f64, y: f64, z: f64) -> f64 {
    (vector_magnitude(x, y, z) - 1.0).max(0.0)
}
