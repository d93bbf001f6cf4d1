//! Agreement scoring between a detected series and a reference series.
//!
//! Non-wear is the positive class everywhere: a true positive is a slot both
//! series call non-wear. Ratio metrics return `None` when their denominator
//! is empty instead of inventing a value for the degenerate case.

use std::ops::{Add, AddAssign};

use super::error::DomainError;
use super::wear::WearSeries;

/// Slot-by-slot agreement counts between two series on one grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
}

impl ConfusionMatrix {
    /// Count agreement between `predicted` and `reference`, which must share
    /// start, resolution, and length.
    pub fn from_series(
        predicted: &WearSeries,
        reference: &WearSeries,
    ) -> Result<Self, DomainError> {
        predicted.matches_grid(reference)?;

        let mut matrix = ConfusionMatrix::default();
        for (p, r) in predicted.states().iter().zip(reference.states()) {
            match (p.is_non_wear(), r.is_non_wear()) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_negative += 1,
            }
        }
        Ok(matrix)
    }

    /// Total slots counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Fraction of slots classified the same way, `None` for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// Of the slots called non-wear, the fraction that really were.
    #[must_use]
    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// Of the reference non-wear slots, the fraction that were found.
    #[must_use]
    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// Of the reference wear slots, the fraction left alone.
    #[must_use]
    pub fn specificity(&self) -> Option<f64> {
        ratio(self.true_negative, self.true_negative + self.false_positive)
    }

    /// Harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> Option<f64> {
        let p = self.precision()?;
        let r = self.recall()?;
        if p + r == 0.0 {
            return Some(0.0);
        }
        Some(2.0 * p * r / (p + r))
    }

    /// Cohen's kappa: agreement corrected for chance. `None` when the matrix
    /// is empty or chance agreement is already perfect.
    #[must_use]
    pub fn kappa(&self) -> Option<f64> {
        let n = self.total();
        if n == 0 {
            return None;
        }
        let n = n as f64;
        let tp = self.true_positive as f64;
        let fp = self.false_positive as f64;
        let tn = self.true_negative as f64;
        let fn_ = self.false_negative as f64;

        let observed = (tp + tn) / n;
        let expected = ((tp + fp) * (tp + fn_) + (fn_ + tn) * (fp + tn)) / (n * n);
        if 1.0 - expected == 0.0 {
            return None;
        }
        Some((observed - expected) / (1.0 - expected))
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

impl Add for ConfusionMatrix {
    type Output = ConfusionMatrix;

    fn add(self, rhs: ConfusionMatrix) -> ConfusionMatrix {
        ConfusionMatrix {
            true_positive: self.true_positive + rhs.true_positive,
            false_positive: self.false_positive + rhs.false_positive,
            true_negative: self.true_negative + rhs.true_negative,
            false_negative: self.false_negative + rhs.false_negative,
        }
    }
}

impl AddAssign for ConfusionMatrix {
    fn add_assign(&mut self, rhs: ConfusionMatrix) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wear::{Resolution, WearState};
    use chrono::NaiveDate;

    fn series(pattern: &[u8]) -> WearSeries {
        let start = NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let states = pattern
            .iter()
            .map(|&b| {
                if b == 1 {
                    WearState::NonWear
                } else {
                    WearState::Wear
                }
            })
            .collect();
        WearSeries::new(start, Resolution::Epoch { length_secs: 60 }, states)
    }

    #[test]
    fn counts_every_cell() {
        let predicted = series(&[1, 1, 0, 0, 1, 0]);
        let reference = series(&[1, 0, 0, 1, 1, 0]);
        let matrix = ConfusionMatrix::from_series(&predicted, &reference).unwrap();

        assert_eq!(matrix.true_positive, 2);
        assert_eq!(matrix.false_positive, 1);
        assert_eq!(matrix.false_negative, 1);
        assert_eq!(matrix.true_negative, 2);
        assert_eq!(matrix.total(), 6);
    }

    #[test]
    fn rejects_mismatched_grids() {
        let predicted = series(&[1, 0]);
        let reference = series(&[1, 0, 0]);
        assert!(matches!(
            ConfusionMatrix::from_series(&predicted, &reference),
            Err(DomainError::GridMismatch { .. })
        ));
    }

    #[test]
    fn perfect_agreement_scores_one() {
        let matrix = ConfusionMatrix {
            true_positive: 10,
            false_positive: 0,
            true_negative: 30,
            false_negative: 0,
        };
        assert_eq!(matrix.accuracy(), Some(1.0));
        assert_eq!(matrix.precision(), Some(1.0));
        assert_eq!(matrix.recall(), Some(1.0));
        assert_eq!(matrix.specificity(), Some(1.0));
        assert_eq!(matrix.f1(), Some(1.0));
        assert_eq!(matrix.kappa(), Some(1.0));
    }

    #[test]
    fn degenerate_denominators_yield_none() {
        let empty = ConfusionMatrix::default();
        assert_eq!(empty.accuracy(), None);
        assert_eq!(empty.kappa(), None);

        // nothing predicted positive, nothing positive in the reference
        let all_wear = ConfusionMatrix {
            true_negative: 50,
            ..ConfusionMatrix::default()
        };
        assert_eq!(all_wear.precision(), None);
        assert_eq!(all_wear.recall(), None);
        assert_eq!(all_wear.specificity(), Some(1.0));
        // chance agreement is total, kappa is undefined
        assert_eq!(all_wear.kappa(), None);
    }

    #[test]
    fn kappa_matches_hand_computation() {
        let matrix = ConfusionMatrix {
            true_positive: 20,
            false_positive: 5,
            false_negative: 10,
            true_negative: 65,
        };
        // po = 0.85, pe = (25*30 + 75*70) / 10000 = 0.6
        let kappa = matrix.kappa().unwrap();
        assert!((kappa - 0.625).abs() < 1e-12);
    }

    #[test]
    fn pooling_adds_cell_wise() {
        let a = ConfusionMatrix {
            true_positive: 1,
            false_positive: 2,
            true_negative: 3,
            false_negative: 4,
        };
        let b = ConfusionMatrix {
            true_positive: 10,
            false_positive: 20,
            true_negative: 30,
            false_negative: 40,
        };
        let mut pooled = a;
        pooled += b;
        assert_eq!(pooled, a + b);
        assert_eq!(pooled.true_positive, 11);
        assert_eq!(pooled.total(), 110);
    }
}
