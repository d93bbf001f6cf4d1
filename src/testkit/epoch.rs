//! Builder for epoch-count series with known non-wear spans.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{EpochCounts, EpochSeries};

/// Assembles an [`EpochSeries`] from labelled segments and remembers which
/// spans were built as non-wear.
pub struct EpochSeriesBuilder {
    start: NaiveDateTime,
    epoch_length_secs: u32,
    epochs: Vec<EpochCounts>,
    truth: Vec<(NaiveDateTime, NaiveDateTime)>,
}

impl EpochSeriesBuilder {
    pub fn new() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2017, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            epoch_length_secs: 60,
            epochs: Vec::new(),
            truth: Vec::new(),
        }
    }

    pub fn starting_at(mut self, start: NaiveDateTime) -> Self {
        self.start = start;
        self
    }

    pub fn epoch_length_secs(mut self, secs: u32) -> Self {
        self.epoch_length_secs = secs;
        self
    }

    /// Append wear epochs with deterministic, clearly-active counts.
    pub fn active_minutes(mut self, minutes: usize) -> Self {
        for _ in 0..minutes {
            self.push_active();
        }
        self
    }

    /// Append zero epochs, recorded as a ground-truth non-wear span.
    pub fn still_minutes(mut self, minutes: usize) -> Self {
        let from = self.next_timestamp();
        for _ in 0..minutes {
            self.epochs.push(EpochCounts::new(0, 0, 0));
        }
        let to = self.next_timestamp();
        self.truth.push((from, to));
        self
    }

    /// Append zero epochs with count spikes at the given offsets, all
    /// recorded as one ground-truth non-wear span.
    ///
    /// Models a device jostled mid-way through a take-off period, the case
    /// the spike-tolerance parameters exist for.
    pub fn still_minutes_with_spikes(mut self, minutes: usize, spikes: &[(usize, u32)]) -> Self {
        let from = self.next_timestamp();
        for i in 0..minutes {
            let spike = spikes.iter().find(|(offset, _)| *offset == i);
            match spike {
                Some(&(_, counts)) => self.epochs.push(EpochCounts::new(counts, 0, 0)),
                None => self.epochs.push(EpochCounts::new(0, 0, 0)),
            }
        }
        let to = self.next_timestamp();
        self.truth.push((from, to));
        self
    }

    fn push_active(&mut self) {
        // Varies per epoch but always far above any zero threshold.
        let i = self.epochs.len() as u32;
        self.epochs
            .push(EpochCounts::new(250 + (i * 37) % 200, 120 + (i * 13) % 90, 90 + (i * 7) % 60));
    }

    fn next_timestamp(&self) -> NaiveDateTime {
        self.start
            + Duration::seconds(self.epochs.len() as i64 * i64::from(self.epoch_length_secs))
    }

    pub fn build(self) -> EpochSeries {
        EpochSeries::new(self.start, self.epoch_length_secs, self.epochs)
    }

    /// Build the series together with the non-wear spans it was built from.
    pub fn build_with_truth(self) -> (EpochSeries, Vec<(NaiveDateTime, NaiveDateTime)>) {
        let series = EpochSeries::new(self.start, self.epoch_length_secs, self.epochs);
        (series, self.truth)
    }
}

impl Default for EpochSeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
