//! Draw types, historical draw results and generated coupons.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};
use thiserror::Error;

/// The structural constants of a draw: how many numbers make up a result and the largest
/// valid number. Every algorithm in this crate is parametrised by a [DrawShape].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawShape {
    pub numbers_count: usize,
    pub max_value: u8,
}
impl DrawShape {
    /// All valid numbers, in ascending order.
    pub fn numbers(&self) -> impl Iterator<Item = u8> {
        1..=self.max_value
    }

    pub fn contains(&self, number: u8) -> bool {
        (1..=self.max_value).contains(&number)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DrawType {
    #[strum(serialize = "lotto")]
    Lotto,

    #[strum(serialize = "mini_lotto")]
    MiniLotto,
}
impl DrawType {
    pub fn shape(&self) -> DrawShape {
        match self {
            DrawType::Lotto => DrawShape {
                numbers_count: 6,
                max_value: 49,
            },
            DrawType::MiniLotto => DrawShape {
                numbers_count: 5,
                max_value: 42,
            },
        }
    }

    /// Identifier used to key persisted per-draw-type data.
    pub fn key(&self) -> &'static str {
        match self {
            DrawType::Lotto => "lotto",
            DrawType::MiniLotto => "mini_lotto",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidDraw {
    #[error("expected {expected} numbers, got {actual}")]
    WrongNumbersCount { expected: usize, actual: usize },

    #[error("number {number} outside of 1..={max_value}")]
    WrongNumbersRange { number: u8, max_value: u8 },

    #[error("number {0} appears more than once")]
    DuplicateNumber(u8),
}

/// Checks that `numbers` is a well-formed combination for the given shape.
pub fn validate_numbers(numbers: &[u8], shape: &DrawShape) -> Result<(), InvalidDraw> {
    if numbers.len() != shape.numbers_count {
        return Err(InvalidDraw::WrongNumbersCount {
            expected: shape.numbers_count,
            actual: numbers.len(),
        });
    }
    let mut seen = FxHashSet::default();
    for &number in numbers {
        if !shape.contains(number) {
            return Err(InvalidDraw::WrongNumbersRange {
                number,
                max_value: shape.max_value,
            });
        }
        if !seen.insert(number) {
            return Err(InvalidDraw::DuplicateNumber(number));
        }
    }
    Ok(())
}

/// A single historical draw. Histories are stored oldest first, ordered by `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawResult {
    pub index: u32,
    pub date: NaiveDate,
    pub numbers: Vec<u8>,
}
impl DrawResult {
    pub fn validate(&self, shape: &DrawShape) -> Result<(), InvalidDraw> {
        validate_numbers(&self.numbers, shape)
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

/// A candidate combination. The numbers are kept in ascending order, so equality and hashing
/// depend only on the set of numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratedCoupon {
    numbers: Vec<u8>,
}
impl GeneratedCoupon {
    pub fn new(mut numbers: Vec<u8>) -> Self {
        numbers.sort_unstable();
        Self { numbers }
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl From<GeneratedCoupon> for Vec<u8> {
    fn from(coupon: GeneratedCoupon) -> Self {
        coupon.numbers
    }
}

impl Display for GeneratedCoupon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, number) in self.numbers.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{number:>2}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn shapes() {
        assert_eq!(
            DrawShape {
                numbers_count: 6,
                max_value: 49
            },
            DrawType::Lotto.shape()
        );
        assert_eq!(
            DrawShape {
                numbers_count: 5,
                max_value: 42
            },
            DrawType::MiniLotto.shape()
        );
    }

    #[test]
    fn keys_parse_back() {
        for draw_type in DrawType::iter() {
            assert_eq!(draw_type, DrawType::from_str(draw_type.key()).unwrap());
            assert_eq!(draw_type.key(), draw_type.to_string());
        }
    }

    #[test]
    fn validate_numbers_rejects_malformed() {
        let shape = DrawType::MiniLotto.shape();
        assert_eq!(Ok(()), validate_numbers(&[1, 7, 19, 33, 42], &shape));
        assert_eq!(
            Err(InvalidDraw::WrongNumbersCount {
                expected: 5,
                actual: 4
            }),
            validate_numbers(&[1, 7, 19, 33], &shape)
        );
        assert_eq!(
            Err(InvalidDraw::WrongNumbersRange {
                number: 43,
                max_value: 42
            }),
            validate_numbers(&[1, 7, 19, 33, 43], &shape)
        );
        assert_eq!(
            Err(InvalidDraw::WrongNumbersRange {
                number: 0,
                max_value: 42
            }),
            validate_numbers(&[0, 7, 19, 33, 41], &shape)
        );
        assert_eq!(
            Err(InvalidDraw::DuplicateNumber(7)),
            validate_numbers(&[1, 7, 7, 33, 41], &shape)
        );
    }

    #[test]
    fn coupon_identity_ignores_order() {
        let a = GeneratedCoupon::new(vec![34, 3, 11, 27, 23, 41]);
        let b = GeneratedCoupon::new(vec![3, 11, 23, 27, 34, 41]);
        assert_eq!(a, b);
        assert_eq!(vec![3, 11, 23, 27, 34, 41], a.numbers().to_vec());
        assert_eq!(" 3, 11, 23, 27, 34, 41", a.to_string());
    }
}
