//! Per-position age statistics over a range of interest.

use thiserror::Error;

use crate::aging::AgedResult;
use crate::roi::RangeOfInterest;

/// Mean and population standard deviation, one entry per position.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsStatistic {
    pub average: Vec<f64>,
    pub standard_deviation: Vec<f64>,
}
impl ResultsStatistic {
    pub fn positions(&self) -> usize {
        self.average.len()
    }

    /// The inclusive age range `[bottom, top]` at `position`, widened by `std_dev_factor`
    /// standard deviations either side of the mean. The bottom is clamped at zero.
    pub fn envelope(&self, position: usize, std_dev_factor: f64) -> AgeEnvelope {
        let average = self.average[position];
        let deviation = self.standard_deviation[position] * std_dev_factor;
        AgeEnvelope {
            bottom: f64::max(0.0, average - deviation).round() as usize,
            top: f64::max(0.0, (average + deviation).round()) as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeEnvelope {
    pub bottom: usize,
    pub top: usize,
}
impl AgeEnvelope {
    pub fn contains(&self, age: usize) -> bool {
        age >= self.bottom && age <= self.top
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatisticsError {
    #[error("no results to derive statistics from")]
    EmptyResults,

    #[error("range of interest {roi} is outside of {len} results")]
    WrongRangeOfInterestScope { roi: RangeOfInterest, len: usize },
}

/// Computes the mean and population standard deviation of `values`, or `None` if there are
/// no values.
pub fn mean_and_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    Some((mean, variance.sqrt()))
}

/// Derives per-position age statistics from the aged results within `roi`.
///
/// Each retained result contributes its ages sorted ascending, so position 0 collects the
/// freshest number of every draw. Results that do not carry exactly `numbers_count` ages are
/// disregarded; if none remain, the statistics are unavailable and `Ok(None)` is returned.
pub fn age_statistics(
    results: &[AgedResult],
    roi: &RangeOfInterest,
    numbers_count: usize,
) -> Result<Option<ResultsStatistic>, StatisticsError> {
    if results.is_empty() {
        return Err(StatisticsError::EmptyResults);
    }
    if roi.length <= 0 || !roi.is_scope_valid_for(results.len()) {
        return Err(StatisticsError::WrongRangeOfInterestScope {
            roi: *roi,
            len: results.len(),
        });
    }

    let valid_ages: Vec<_> = results[roi.as_range()]
        .iter()
        .map(AgedResult::ages)
        .filter(|ages| ages.len() == numbers_count)
        .collect();
    if valid_ages.is_empty() {
        return Ok(None);
    }

    let mut average = Vec::with_capacity(numbers_count);
    let mut standard_deviation = Vec::with_capacity(numbers_count);
    let mut column = Vec::with_capacity(valid_ages.len());
    for position in 0..numbers_count {
        column.clear();
        column.extend(valid_ages.iter().map(|ages| ages[position] as f64));
        if let Some((mean, std_dev)) = mean_and_std_dev(&column) {
            average.push(mean);
            standard_deviation.push(std_dev);
        }
    }
    Ok(Some(ResultsStatistic {
        average,
        standard_deviation,
    }))
}
