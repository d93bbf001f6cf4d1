//! Scoring helpers shared by detection tests.

use chrono::NaiveDateTime;

use wearwolf::domain::{ConfusionMatrix, WearSeries};

/// Score a detected series against reference intervals painted onto the
/// same grid.
pub fn against_truth(
    detected: &WearSeries,
    truth: &[(NaiveDateTime, NaiveDateTime)],
) -> ConfusionMatrix {
    let reference = WearSeries::from_intervals(
        detected.start(),
        detected.resolution(),
        detected.len(),
        truth,
    );
    ConfusionMatrix::from_series(detected, &reference).expect("grids are identical")
}
