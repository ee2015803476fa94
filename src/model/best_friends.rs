//! Co-occurrence ("best friends") model.
//!
//! Training accumulates, for every pair of distinct numbers drawn together, a weight of
//! `1 / history.len()`. The friendliness of a combination is the sum of the weights of all of
//! its unordered pairs. A candidate is in scope when its friendliness lies strictly within one
//! standard deviation of the mean friendliness of the historical results.

use tracing::debug;

use crate::draw::{DrawResult, DrawShape};
use crate::stats::{mean_and_std_dev, ResultsStatistic};

/// A number together with its accumulated co-occurrence weight with every number; the weight
/// with itself is always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BestFriendNumber {
    pub value: u8,
    pub friendliness: Vec<f64>,
}
impl BestFriendNumber {
    pub fn new(value: u8, max_value: u8) -> Self {
        Self {
            value,
            friendliness: vec![0.0; max_value as usize],
        }
    }

    pub fn add_friend(&mut self, friend: u8, factor: f64) {
        if friend == self.value {
            return;
        }
        if let Some(weight) = slot(friend).and_then(|idx| self.friendliness.get_mut(idx)) {
            *weight += factor;
        }
    }

    pub fn friendliness_with(&self, friend: u8) -> f64 {
        slot(friend)
            .and_then(|idx| self.friendliness.get(idx))
            .copied()
            .unwrap_or_default()
    }
}

#[inline]
fn slot(value: u8) -> Option<usize> {
    (value as usize).checked_sub(1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FriendshipTable {
    numbers: Vec<BestFriendNumber>,
}
impl FriendshipTable {
    pub fn train(history: &[DrawResult], shape: &DrawShape) -> Self {
        let mut numbers: Vec<_> = shape
            .numbers()
            .map(|value| BestFriendNumber::new(value, shape.max_value))
            .collect();
        let factor = 1.0 / history.len() as f64;
        for result in history {
            for &number in &result.numbers {
                let Some(best_friend) = slot(number).and_then(|idx| numbers.get_mut(idx)) else {
                    continue;
                };
                for &other in &result.numbers {
                    best_friend.add_friend(other, factor);
                }
            }
        }
        Self { numbers }
    }

    pub fn number(&self, value: u8) -> Option<&BestFriendNumber> {
        slot(value).and_then(|idx| self.numbers.get(idx))
    }

    /// Sums the weights of all unordered pairs in `numbers`.
    pub fn score(&self, numbers: &[u8]) -> f64 {
        let mut score = 0.0;
        for (i, &number) in numbers.iter().enumerate() {
            let Some(best_friend) = self.number(number) else {
                continue;
            };
            for &other in &numbers[i + 1..] {
                score += best_friend.friendliness_with(other);
            }
        }
        score
    }
}

#[derive(Debug, Clone)]
pub struct BestFriendsModel {
    shape: DrawShape,
    table: Option<FriendshipTable>,
    envelope: Option<ResultsStatistic>,
}
impl BestFriendsModel {
    pub fn new(shape: DrawShape) -> Self {
        Self {
            shape,
            table: None,
            envelope: None,
        }
    }

    /// Trains the model on `history`, returning `None` if no envelope could be established.
    pub fn run(shape: DrawShape, history: &[DrawResult]) -> Option<Self> {
        let mut model = Self::new(shape);
        model.train(history);
        model.envelope.is_some().then_some(model)
    }

    pub fn train(&mut self, history: &[DrawResult]) {
        if history.is_empty() {
            self.table = None;
            self.envelope = None;
            return;
        }
        let table = FriendshipTable::train(history, &self.shape);
        let scores: Vec<_> = history
            .iter()
            .map(|result| table.score(&result.numbers))
            .collect();
        self.envelope = mean_and_std_dev(&scores).map(|(average, std_dev)| {
            debug!("friendliness envelope: {average:.6} ± {std_dev:.6}");
            ResultsStatistic {
                average: vec![average],
                standard_deviation: vec![std_dev],
            }
        });
        self.table = Some(table);
    }

    pub fn envelope(&self) -> Option<&ResultsStatistic> {
        self.envelope.as_ref()
    }

    /// The friendliness of a combination, or `None` if the model is untrained.
    pub fn friendliness(&self, numbers: &[u8]) -> Option<f64> {
        self.table.as_ref().map(|table| table.score(numbers))
    }

    /// Whether the friendliness of `numbers` lies strictly between `mean - σ` and `mean + σ`.
    /// An untrained model or a combination of the wrong size is never in scope.
    pub fn is_result_in_scope(&self, numbers: &[u8]) -> bool {
        if numbers.len() != self.shape.numbers_count {
            return false;
        }
        let Some(envelope) = self.envelope.as_ref() else {
            return false;
        };
        let (Some(&average), Some(&std_dev)) = (
            envelope.average.first(),
            envelope.standard_deviation.first(),
        ) else {
            return false;
        };
        let Some(friendliness) = self.friendliness(numbers) else {
            return false;
        };
        average - std_dev < friendliness && friendliness < average + std_dev
    }
}
