//! Tri-axial acceleration samples.

use std::fmt;

/// One of the three accelerometer axes.
///
/// Axis naming follows the device convention: X is the first count column of
/// epoch exports and the horizontal axis of hip-worn units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Short uppercase label for tables and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One raw accelerometer sample in g units.
///
/// Stored as `f32`: multi-day recordings at 30-100 Hz run to hundreds of
/// millions of samples, and device quantization is far coarser than `f32`
/// precision anyway.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RawSample {
    /// Create a new sample from per-axis g values.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Value along a single axis.
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_access_matches_fields() {
        let sample = RawSample::new(0.1, -0.2, 0.97);
        assert_eq!(sample.axis(Axis::X), 0.1);
        assert_eq!(sample.axis(Axis::Y), -0.2);
        assert_eq!(sample.axis(Axis::Z), 0.97);
    }

    #[test]
    fn axis_labels() {
        assert_eq!(Axis::X.label(), "X");
        assert_eq!(Axis::ALL.len(), 3);
    }
}
