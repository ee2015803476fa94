//! Annotation of draw histories with number ages.
//!
//! The age of a number is the count of draws that elapsed between its last appearance and
//! the reference point. Two flavours are computed:
//!
//! * [aged_numbers] ages every valid number relative to the upcoming draw: a number drawn in
//!   the most recent result has age 0.
//! * [aged_results] ages the numbers of every historical result relative to that result: a
//!   number that also appeared in the immediately preceding result has age 0.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::trace;

use crate::draw::{DrawResult, DrawShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgedNumber {
    pub value: u8,
    pub age: Option<usize>,
}
impl AgedNumber {
    pub fn unaged(value: u8) -> Self {
        Self { value, age: None }
    }
}

/// A historical result whose numbers carry ages, sorted by ascending age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgedResult {
    pub index: u32,
    pub date: NaiveDate,
    pub numbers: Vec<AgedNumber>,
}
impl AgedResult {
    /// The ages present in this result, in ascending order. Position `k` of the returned vector
    /// is the age of the `k`-th freshest number of the draw.
    pub fn ages(&self) -> Vec<usize> {
        let mut ages: Vec<_> = self.numbers.iter().filter_map(|number| number.age).collect();
        ages.sort_unstable();
        ages
    }

    pub fn values(&self) -> Vec<u8> {
        self.numbers.iter().map(|number| number.value).collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgingError {
    #[error("result {index} has {actual} numbers, expected {expected}")]
    WrongNumbersCount {
        index: u32,
        expected: usize,
        actual: usize,
    },
}

/// Both age annotations of a history snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgedHistory {
    pub results: Vec<AgedResult>,
    pub numbers: Vec<AgedNumber>,
}
impl AgedHistory {
    pub fn of(results: &[DrawResult], shape: &DrawShape) -> Result<Self, AgingError> {
        Ok(Self {
            results: aged_results(results, shape)?,
            numbers: aged_numbers(results, shape),
        })
    }
}

/// Ages every valid number against the whole history. The returned vector has one entry per
/// valid number, indexed by `value - 1`; numbers that never appeared have no age.
pub fn aged_numbers(results: &[DrawResult], shape: &DrawShape) -> Vec<AgedNumber> {
    aged_numbers_within(results, shape, 0, None)
}

/// Ages every valid number against a window of the history. The history is scanned newest
/// first, skipping the `offset` most recent results and then covering at most `length` results
/// (through to the oldest result when `length` is `None`). Ages are ordinals within the scan.
pub fn aged_numbers_within(
    results: &[DrawResult],
    shape: &DrawShape,
    offset: usize,
    length: Option<usize>,
) -> Vec<AgedNumber> {
    let mut aged_numbers: Vec<_> = shape.numbers().map(AgedNumber::unaged).collect();
    let mut unaged = aged_numbers.len();

    let scan = results
        .iter()
        .rev()
        .skip(offset)
        .take(length.unwrap_or(usize::MAX));
    for (age, result) in scan.enumerate() {
        for &number in &result.numbers {
            if !shape.contains(number) {
                continue;
            }
            let aged_number = &mut aged_numbers[number as usize - 1];
            if aged_number.age.is_none() {
                aged_number.age = Some(age);
                unaged -= 1;
            }
        }
        if unaged == 0 {
            break;
        }
    }
    aged_numbers
}

/// Ages the numbers of each result by the number of draws since they last appeared in an
/// earlier result. The history must be ordered oldest first.
///
/// The oldest result has no predecessor and is returned with all of its numbers unaged. Any
/// later result in which some number has no earlier occurrence cannot be ordered by age and is
/// left out of the output. A result that does not hold exactly `shape.numbers_count` numbers
/// fails the whole computation.
pub fn aged_results(
    results: &[DrawResult],
    shape: &DrawShape,
) -> Result<Vec<AgedResult>, AgingError> {
    let mut aged_results = Vec::with_capacity(results.len());
    let mut last_seen: Vec<Option<usize>> = vec![None; shape.max_value as usize];

    for (result_idx, result) in results.iter().enumerate() {
        let mut numbers: Vec<_> = result
            .numbers
            .iter()
            .map(|&value| AgedNumber {
                value,
                age: slot(&last_seen, value)
                    .and_then(|&found| found)
                    .map(|found_idx| result_idx - found_idx - 1),
            })
            .collect();

        if numbers.len() != shape.numbers_count {
            return Err(AgingError::WrongNumbersCount {
                index: result.index,
                expected: shape.numbers_count,
                actual: numbers.len(),
            });
        }

        for &value in &result.numbers {
            if let Some(found) = slot_mut(&mut last_seen, value) {
                *found = Some(result_idx);
            }
        }

        if result_idx == 0 {
            numbers.sort_unstable_by_key(|number| number.value);
        } else if numbers.iter().any(|number| number.age.is_none()) {
            trace!("skipping result {}: not every number has an age", result.index);
            continue;
        } else {
            numbers.sort_unstable_by_key(|number| (number.age, number.value));
        }

        aged_results.push(AgedResult {
            index: result.index,
            date: result.date,
            numbers,
        });
    }
    Ok(aged_results)
}

#[inline]
fn slot(last_seen: &[Option<usize>], value: u8) -> Option<&Option<usize>> {
    (value as usize).checked_sub(1).and_then(|idx| last_seen.get(idx))
}

#[inline]
fn slot_mut(last_seen: &mut [Option<usize>], value: u8) -> Option<&mut Option<usize>> {
    (value as usize)
        .checked_sub(1)
        .and_then(|idx| last_seen.get_mut(idx))
}
