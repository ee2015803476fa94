//! Exclusion of recently drawn numbers.

use tracing::debug;

use crate::draw::{DrawResult, DrawShape};

#[derive(Debug, Clone)]
pub struct ExclusionModel {
    shape: DrawShape,
}
impl ExclusionModel {
    pub fn new(shape: DrawShape) -> Self {
        Self { shape }
    }

    /// The numbers of the most recent draw, ascending. An empty history excludes nothing.
    pub fn run(&self, history: &[DrawResult]) -> Vec<u8> {
        let Some(last) = history.last() else {
            return vec![];
        };
        let mut excluded: Vec<_> = last
            .numbers
            .iter()
            .copied()
            .filter(|&number| self.shape.contains(number))
            .collect();
        excluded.sort_unstable();
        excluded.dedup();
        debug!("excluding {excluded:?} drawn in result {}", last.index);
        excluded
    }
}

/// Removes the excluded numbers from every position's eligible set.
pub fn apply(eligible: Vec<Vec<u8>>, excluded: &[u8]) -> Vec<Vec<u8>> {
    eligible
        .into_iter()
        .map(|mut numbers| {
            numbers.retain(|number| !excluded.contains(number));
            numbers
        })
        .collect()
}
