//! Generation settings, loaded from JSON and overridden piecemeal by callers.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::controller::GenerationRequest;
use crate::draw::DrawType;
use crate::file::ReadJsonFile;
use crate::model::ModelParams;
use crate::tuner::TuningStore;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub timeout_secs: u64,
    pub coupon_distance: usize,
    pub coupons_count: usize,
}
impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            coupon_distance: 2,
            coupons_count: 10,
        }
    }
}
impl From<GenerationConfig> for GenerationRequest {
    fn from(config: GenerationConfig) -> Self {
        GenerationRequest {
            timeout: Duration::from_secs(config.timeout_secs),
            coupon_distance: config.coupon_distance,
            coupons_count: config.coupons_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub draw_type: DrawType,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub model: ModelParams,
}
impl Config {
    pub fn new(draw_type: DrawType) -> Self {
        Self {
            draw_type,
            generation: GenerationConfig::default(),
            model: ModelParams::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let config = Self::read_json_file(path).with_context(|| format!("reading {path:?}"))?;
        Ok(config)
    }

    /// Replaces the model parameters with those tuned for this draw type, if any.
    pub fn apply_tuned(&mut self, store: &impl TuningStore) -> Result<bool, anyhow::Error> {
        match store.load(self.draw_type.key())? {
            Some(params) => {
                self.model = params;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let numbers_count = self.draw_type.shape().numbers_count;
        if self.generation.timeout_secs == 0 {
            bail!("timeout must be positive");
        }
        if self.generation.coupons_count == 0 {
            bail!("coupons count must be positive");
        }
        if self.generation.coupon_distance > numbers_count {
            bail!("coupon distance cannot exceed {numbers_count}");
        }
        self.model.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuner::InMemoryTuningStore;

    #[test]
    fn defaults() {
        let config = Config::new(DrawType::Lotto);
        assert!(config.validate().is_ok());
        let request = GenerationRequest::from(config.generation);
        assert_eq!(Duration::from_secs(30), request.timeout);
        assert_eq!(2, request.coupon_distance);
        assert_eq!(10, request.coupons_count);
        assert_eq!(ModelParams::default(), config.model);
    }

    #[test]
    fn deserialize_partial() {
        let config: Config = serde_json::from_str(
            r#"{"draw_type": "mini_lotto", "generation": {"coupons_count": 4}}"#,
        )
        .unwrap();
        assert_eq!(DrawType::MiniLotto, config.draw_type);
        assert_eq!(4, config.generation.coupons_count);
        assert_eq!(30, config.generation.timeout_secs);
        assert_eq!(ModelParams::default(), config.model);
    }

    #[test]
    fn validate() {
        let mut config = Config::new(DrawType::MiniLotto);
        config.generation.coupon_distance = 5;
        assert!(config.validate().is_ok());
        config.generation.coupon_distance = 6;
        assert!(config.validate().is_err());

        let mut config = Config::new(DrawType::Lotto);
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new(DrawType::Lotto);
        config.generation.coupons_count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new(DrawType::Lotto);
        config.model.roi_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tuned_params_override_model() {
        let mut store = InMemoryTuningStore::default();
        let mut config = Config::new(DrawType::Lotto);
        assert!(!config.apply_tuned(&store).unwrap());

        let tuned = ModelParams {
            std_dev_factor: 0.5,
            roi_length: 33,
        };
        store.save("lotto", tuned).unwrap();
        assert!(config.apply_tuned(&store).unwrap());
        assert_eq!(tuned, config.model);

        let mut config = Config::new(DrawType::MiniLotto);
        assert!(!config.apply_tuned(&store).unwrap());
        assert_eq!(ModelParams::default(), config.model);
    }
}
