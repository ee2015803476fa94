//! Grid search over the parameters of the age-per-position model.
//!
//! For every `(roi_length, offset)` pair in the grid, age statistics are taken over a window of
//! `roi_length` aged results ending just before the result `offset` places from the end of the
//! history. That result is then back-tested: a position is a hit when the result's age at that
//! position falls within the envelope. Configurations scoring in the top band of hits qualify,
//! and the most frequently qualifying length and factor win.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::io;
use std::io::ErrorKind;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, trace};

use crate::aging::{aged_results, AgedResult, AgingError};
use crate::draw::{DrawResult, DrawShape};
use crate::file::{read_json, write_json};
use crate::model::ModelParams;
use crate::roi::RangeOfInterest;
use crate::stats::{age_statistics, ResultsStatistic};

pub const DEFAULT_STD_DEV_FACTORS: [f64; 4] = [0.5, 0.6, 0.7, 0.8];

#[derive(Debug, Clone, PartialEq)]
pub struct TunerConfig {
    pub lengths: RangeInclusive<usize>,
    pub offsets: RangeInclusive<usize>,
    /// Scanned in ascending order.
    pub std_dev_factors: Vec<f64>,
}
impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            lengths: 1..=100,
            offsets: 1..=100,
            std_dev_factors: DEFAULT_STD_DEV_FACTORS.to_vec(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TunerError {
    #[error("cannot tune against an empty history")]
    EmptyHistory,

    #[error("{hits} hits exceed the {numbers_count} numbers of a draw")]
    WrongStatisticsComparatorData { hits: usize, numbers_count: usize },

    #[error("aging error: {0}")]
    Aging(#[from] AgingError),
}

/// A configuration that qualified during back-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsComparatorData {
    pub hits: usize,
    pub std_dev_factor: f64,
    pub roi: RangeOfInterest,
}
impl StatisticsComparatorData {
    pub fn new(
        hits: usize,
        std_dev_factor: f64,
        roi: RangeOfInterest,
        numbers_count: usize,
    ) -> Result<Self, TunerError> {
        if hits > numbers_count {
            return Err(TunerError::WrongStatisticsComparatorData {
                hits,
                numbers_count,
            });
        }
        Ok(Self {
            hits,
            std_dev_factor,
            roi,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TuneResult {
    pub params: ModelParams,
    /// The number of qualifying configurations; zero when the defaults were fallen back on.
    pub qualifying: usize,
}
impl Display for TuneResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "factor {} over {} results from {} qualifying configurations",
            self.params.std_dev_factor, self.params.roi_length, self.qualifying
        )
    }
}

/// Counts the positions of `ages` that fall within the envelope of `statistic`.
fn hits(statistic: &ResultsStatistic, ages: &[usize], std_dev_factor: f64) -> usize {
    ages.iter()
        .enumerate()
        .filter(|&(position, &age)| {
            position < statistic.positions()
                && statistic.envelope(position, std_dev_factor).contains(age)
        })
        .count()
}

/// Back-tests `result` against `statistic` for every factor, keeping the first factor to reach
/// each hit level of the top band. Stops once the maximum level is reached.
pub fn check_compliance(
    statistic: &ResultsStatistic,
    result: &AgedResult,
    roi: RangeOfInterest,
    std_dev_factors: &[f64],
    numbers_count: usize,
) -> Result<Vec<StatisticsComparatorData>, TunerError> {
    let ages = result.ages();
    if ages.len() != numbers_count {
        return Ok(vec![]);
    }
    let min_level = numbers_count.saturating_sub(2);
    let mut pending_levels: Vec<_> = (min_level..=numbers_count).collect();
    let mut compliant = vec![];
    for &std_dev_factor in std_dev_factors {
        let hits = hits(statistic, &ages, std_dev_factor);
        if hits < min_level || !pending_levels.contains(&hits) {
            continue;
        }
        trace!("{roi} qualifies with {hits} hits at factor {std_dev_factor}");
        compliant.push(StatisticsComparatorData::new(
            hits,
            std_dev_factor,
            roi,
            numbers_count,
        )?);
        pending_levels.retain(|&level| level != hits);
        if pending_levels.is_empty() || hits == numbers_count {
            break;
        }
    }
    Ok(compliant)
}

/// Picks the most frequent length and factor among the qualifying configurations, preferring
/// the smaller value on ties. Falls back on the default parameters if nothing qualified.
pub fn aggregate(qualifying: &[StatisticsComparatorData], config: &TunerConfig) -> TuneResult {
    let best_length = config
        .lengths
        .clone()
        .map(|length| {
            let count = qualifying
                .iter()
                .filter(|data| data.roi.length == length as isize)
                .count();
            (length, count)
        })
        .fold(None, |best: Option<(usize, usize)>, (length, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ if count > 0 => Some((length, count)),
            _ => best,
        });
    let best_factor = config
        .std_dev_factors
        .iter()
        .map(|&factor| {
            let count = qualifying
                .iter()
                .filter(|data| data.std_dev_factor == factor)
                .count();
            (factor, count)
        })
        .fold(None, |best: Option<(f64, usize)>, (factor, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ if count > 0 => Some((factor, count)),
            _ => best,
        });

    match (best_length, best_factor) {
        (Some((roi_length, _)), Some((std_dev_factor, _))) => TuneResult {
            params: ModelParams {
                std_dev_factor,
                roi_length,
            },
            qualifying: qualifying.len(),
        },
        _ => TuneResult {
            params: ModelParams::default(),
            qualifying: 0,
        },
    }
}

pub fn tune(
    history: &[DrawResult],
    shape: &DrawShape,
    config: &TunerConfig,
) -> Result<TuneResult, TunerError> {
    if history.is_empty() {
        return Err(TunerError::EmptyHistory);
    }
    let results = aged_results(history, shape)?;
    let len = results.len();
    let mut qualifying = vec![];
    for length in config.lengths.clone() {
        for offset in config.offsets.clone() {
            let Some(compare_idx) = len.checked_sub(offset).filter(|&idx| idx < len) else {
                continue;
            };
            let Some(starting_idx) = compare_idx.checked_sub(length) else {
                continue;
            };
            let roi = RangeOfInterest::new(starting_idx as isize, length as isize);
            let Ok(Some(statistic)) = age_statistics(&results, &roi, shape.numbers_count) else {
                continue;
            };
            qualifying.extend(check_compliance(
                &statistic,
                &results[compare_idx],
                roi,
                &config.std_dev_factors,
                shape.numbers_count,
            )?);
        }
    }
    let result = aggregate(&qualifying, config);
    debug!(
        "{} qualifying configurations over {len} aged results, tuned to {:?}",
        result.qualifying, result.params
    );
    Ok(result)
}

/// Persists tuned parameters keyed by draw type.
pub trait TuningStore {
    fn load(&self, key: &str) -> Result<Option<ModelParams>, io::Error>;

    fn save(&mut self, key: &str, params: ModelParams) -> Result<(), io::Error>;
}

#[derive(Debug, Default)]
pub struct InMemoryTuningStore {
    entries: BTreeMap<String, ModelParams>,
}
impl TuningStore for InMemoryTuningStore {
    fn load(&self, key: &str) -> Result<Option<ModelParams>, io::Error> {
        Ok(self.entries.get(key).copied())
    }

    fn save(&mut self, key: &str, params: ModelParams) -> Result<(), io::Error> {
        self.entries.insert(key.to_string(), params);
        Ok(())
    }
}

/// Keeps every draw type's parameters in one JSON object. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileTuningStore {
    path: PathBuf,
}
impl JsonFileTuningStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, ModelParams>, io::Error> {
        match read_json(&self.path) {
            Ok(entries) => Ok(entries),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err),
        }
    }
}
impl TuningStore for JsonFileTuningStore {
    fn load(&self, key: &str) -> Result<Option<ModelParams>, io::Error> {
        Ok(self.read_all()?.get(key).copied())
    }

    fn save(&mut self, key: &str, params: ModelParams) -> Result<(), io::Error> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), params);
        write_json(&self.path, &entries)
    }
}
