//! Per-position eligibility of numbers derived from historical age statistics.

use tracing::{debug, warn};

use crate::aging::{AgedHistory, AgedNumber, AgedResult};
use crate::draw::{DrawResult, DrawShape};
use crate::model::ModelParams;
use crate::roi::RangeOfInterest;
use crate::stats::{age_statistics, AgeEnvelope, ResultsStatistic, StatisticsError};

/// Age statistics over a range of interest, paired with the current age of every number.
#[derive(Debug, Clone, PartialEq)]
pub struct AgesPerPosition {
    numbers_aged_by_last_result: Vec<AgedNumber>,
    roi: RangeOfInterest,
    statistic: Option<ResultsStatistic>,
    numbers_count: usize,
}
impl AgesPerPosition {
    pub fn new(
        numbers_aged_by_last_result: Vec<AgedNumber>,
        results: &[AgedResult],
        roi: RangeOfInterest,
        numbers_count: usize,
    ) -> Result<Self, StatisticsError> {
        let statistic = age_statistics(results, &roi, numbers_count)?;
        Ok(Self {
            numbers_aged_by_last_result,
            roi,
            statistic,
            numbers_count,
        })
    }

    pub fn statistic(&self) -> Option<&ResultsStatistic> {
        self.statistic.as_ref()
    }

    pub fn roi(&self) -> &RangeOfInterest {
        &self.roi
    }

    /// The numbers whose current age falls within the envelope at `position`, ascending.
    pub fn numbers_fulfilling(
        &self,
        statistic: &ResultsStatistic,
        position: usize,
        std_dev_factor: f64,
    ) -> (AgeEnvelope, Vec<u8>) {
        let envelope = statistic.envelope(position, std_dev_factor);
        let mut numbers: Vec<_> = self
            .numbers_aged_by_last_result
            .iter()
            .filter(|number| number.age.map_or(false, |age| envelope.contains(age)))
            .map(|number| number.value)
            .collect();
        numbers.sort_unstable();
        (envelope, numbers)
    }

    /// One set of eligible numbers per position, or `None` if the statistics are unavailable.
    pub fn eligible_numbers(&self, std_dev_factor: f64) -> Option<Vec<Vec<u8>>> {
        let statistic = self.statistic.as_ref()?;
        Some(
            (0..self.numbers_count)
                .map(|position| self.numbers_fulfilling(statistic, position, std_dev_factor).1)
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct AgesPerPositionModel {
    shape: DrawShape,
    params: ModelParams,
}
impl AgesPerPositionModel {
    pub fn new(shape: DrawShape, params: ModelParams) -> Self {
        Self { shape, params }
    }

    /// Derives the eligible numbers for each position from the trailing `roi_length` aged
    /// results of `history`. Returns `None` when the history cannot support the model.
    pub fn run(&self, history: &[DrawResult]) -> Option<Vec<Vec<u8>>> {
        if history.is_empty() {
            return None;
        }
        let AgedHistory { results, numbers } = match AgedHistory::of(history, &self.shape) {
            Ok(aged) => aged,
            Err(err) => {
                warn!("cannot age history: {err}");
                return None;
            }
        };
        let roi = RangeOfInterest::trailing(results.len(), self.params.roi_length);
        let ages = match AgesPerPosition::new(
            numbers,
            &results,
            roi,
            self.shape.numbers_count,
        ) {
            Ok(ages) => ages,
            Err(err) => {
                debug!("age statistics unavailable: {err}");
                return None;
            }
        };
        let eligible = ages.eligible_numbers(self.params.std_dev_factor)?;
        debug!(
            "eligible numbers per position over {roi}: {:?}",
            eligible.iter().map(Vec::len).collect::<Vec<_>>()
        );
        Some(eligible)
    }
}
