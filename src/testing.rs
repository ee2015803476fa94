//! Testing helpers.

use chrono::{Days, NaiveDate};
use tinyrand::{Rand, Seeded, StdRand};

use crate::draw::{DrawResult, DrawShape};

pub fn draw(index: u32, numbers: &[u8]) -> DrawResult {
    let date = NaiveDate::from_ymd_opt(2020, 1, 4)
        .unwrap()
        .checked_add_days(Days::new(u64::from(index) * 3))
        .unwrap();
    DrawResult {
        index,
        date,
        numbers: numbers.to_vec(),
    }
}

/// A history built from the given combinations, oldest first, indexed from 1.
pub fn history(combinations: &[&[u8]]) -> Vec<DrawResult> {
    combinations
        .iter()
        .enumerate()
        .map(|(idx, numbers)| draw(idx as u32 + 1, numbers))
        .collect()
}

/// Cycles through disjoint groups of consecutive numbers, so that once every group has been
/// drawn, each number reappears every `max_value / numbers_count` draws.
pub fn cyclic_history(shape: &DrawShape, len: usize) -> Vec<DrawResult> {
    let groups = shape.max_value as usize / shape.numbers_count;
    (0..len)
        .map(|idx| {
            let group = idx % groups;
            let first = group * shape.numbers_count + 1;
            let numbers: Vec<_> = (first..first + shape.numbers_count)
                .map(|number| number as u8)
                .collect();
            draw(idx as u32 + 1, &numbers)
        })
        .collect()
}

pub fn random_history(shape: &DrawShape, len: usize, seed: u64) -> Vec<DrawResult> {
    let mut rand = StdRand::seed(seed);
    (0..len)
        .map(|idx| {
            let mut numbers = Vec::with_capacity(shape.numbers_count);
            while numbers.len() < shape.numbers_count {
                let number = rand.next_lim_u64(u64::from(shape.max_value)) as u8 + 1;
                if !numbers.contains(&number) {
                    numbers.push(number);
                }
            }
            numbers.sort_unstable();
            draw(idx as u32 + 1, &numbers)
        })
        .collect()
}

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_eq::assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}
