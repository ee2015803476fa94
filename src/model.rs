//! The supporting models consulted by the coupon generator.
//!
//! Each model is run once per generation request against a snapshot of the history:
//!
//! * [age_per_position] bounds the numbers eligible for each position of a coupon;
//! * [exclusion] removes recently drawn numbers from eligibility;
//! * [best_friends] scores how well the numbers of a combination co-occur historically.

use anyhow::bail;
use serde::{Deserialize, Serialize};

pub mod age_per_position;
pub mod best_friends;
pub mod exclusion;

pub const DEFAULT_STD_DEV_FACTOR: f64 = 0.7;
pub const DEFAULT_ROI_LENGTH: usize = 15;

/// Parameters of the age-per-position model, either configured or found by the tuner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub std_dev_factor: f64,
    pub roi_length: usize,
}
impl ModelParams {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.std_dev_factor.is_finite() || self.std_dev_factor <= 0.0 {
            bail!("standard deviation factor must be positive");
        }
        if self.roi_length == 0 {
            bail!("range of interest length must be positive");
        }
        Ok(())
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            std_dev_factor: DEFAULT_STD_DEV_FACTOR,
            roi_length: DEFAULT_ROI_LENGTH,
        }
    }
}
