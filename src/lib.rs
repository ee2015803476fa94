//! Statistical modelling of lottery draw histories by number age, and generation of candidate
//! coupons constrained by that model.
//!
//! The history is annotated with ages in [aging], summarised per position in [stats] and turned
//! into per-position eligible numbers by the models in [model]. A [generator] samples coupons from
//! the eligible sets, and the [controller] filters them under a deadline. The [tuner] searches for
//! the model parameters that best reproduce the history.

pub mod aging;
pub mod config;
pub mod controller;
pub mod draw;
pub mod file;
pub mod generator;
pub mod history;
pub mod model;
pub mod print;
pub mod roi;
pub mod stats;
pub mod timed;
pub mod tuner;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
