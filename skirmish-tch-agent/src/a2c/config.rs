//! Configuration of A2C agent.
use crate::{opt::OptimizerConfig, util::InputShape, Device};
use anyhow::Result;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use skirmish_core::{error::SkirmishError, FunctionId};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Constructs [`A2c`](super::A2c).
///
/// `C` is the configuration of the policy/value network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(bound = "C: Serialize + DeserializeOwned")]
pub struct A2cConfig<C> {
    pub(super) model_config: Option<C>,
    pub(super) opt_config: OptimizerConfig,
    pub(super) clip_grad_norm: Option<f64>,
    pub(super) n_steps: usize,
    pub(super) discount_factor: f64,
    pub(super) entropy_coef: f64,
    pub(super) prob_floor: f64,
    pub(super) screen_size: i64,
    pub(super) spatial_function: FunctionId,
    pub(super) fallback_function: FunctionId,
    pub(super) log_dir: String,
    pub(super) train: bool,
    pub device: Option<Device>,
}

impl<C> Default for A2cConfig<C> {
    /// Constructs A2C config with default parameters.
    fn default() -> Self {
        Self {
            model_config: None,
            opt_config: OptimizerConfig::Adam { lr: 1e-4 },
            clip_grad_norm: Some(500.0),
            n_steps: 10,
            discount_factor: 0.95,
            entropy_coef: 1e-3,
            prob_floor: 1e-12,
            screen_size: 32,
            spatial_function: FunctionId::ATTACK_SCREEN,
            fallback_function: FunctionId::SELECT_ARMY,
            log_dir: "./logs".to_string(),
            train: true,
            device: None,
        }
    }
}

impl<C> A2cConfig<C>
where
    C: Serialize + DeserializeOwned + InputShape + Clone,
{
    /// Sets the configuration of the policy/value network.
    pub fn model_config(mut self, v: C) -> Self {
        self.model_config = Some(v);
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the maximal global norm of gradients. `None` disables clipping.
    pub fn clip_grad_norm(mut self, v: Option<f64>) -> Self {
        self.clip_grad_norm = v;
        self
    }

    /// Sets the rollout horizon, the number of steps per update.
    pub fn n_steps(mut self, v: usize) -> Self {
        self.n_steps = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Weight of the entropy bonus.
    pub fn entropy_coef(mut self, v: f64) -> Self {
        self.entropy_coef = v;
        self
    }

    /// Lower bound of probabilities before taking logarithms.
    pub fn prob_floor(mut self, v: f64) -> Self {
        self.prob_floor = v;
        self
    }

    /// Side of the square screen on which points are chosen.
    pub fn screen_size(mut self, v: i64) -> Self {
        self.screen_size = v;
        self
    }

    /// Function issued on the sampled point.
    pub fn spatial_function(mut self, v: FunctionId) -> Self {
        self.spatial_function = v;
        self
    }

    /// Function issued when the spatial function is unavailable.
    pub fn fallback_function(mut self, v: FunctionId) -> Self {
        self.fallback_function = v;
        self
    }

    /// Directory of the TensorBoard summaries.
    pub fn log_dir(mut self, v: impl Into<String>) -> Self {
        self.log_dir = v.into();
        self
    }

    /// Starts the agent in training mode if `true`.
    pub fn train(mut self, v: bool) -> Self {
        self.train = v;
        self
    }

    /// Device.
    pub fn device(mut self, device: tch::Device) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Checks values that would make the agent misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.n_steps == 0 {
            return Err(SkirmishError::InvalidHorizon(self.n_steps).into());
        }
        if !(0.0..1.0).contains(&self.discount_factor) {
            return Err(SkirmishError::DiscountOutOfRange(self.discount_factor).into());
        }
        Ok(())
    }

    /// Loads [`A2cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let c = serde_yaml::from_reader(rdr)?;
        info!("Load config of A2C agent from {:?}", path_);
        Ok(c)
    }

    /// Saves [`A2cConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of A2C agent into {:?}", path_);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fully_conv::FullyConvConfig;
    use tempdir::TempDir;

    #[test]
    fn test_defaults() {
        let config = A2cConfig::<FullyConvConfig>::default();
        assert_eq!(config.n_steps, 10);
        assert_eq!(config.discount_factor, 0.95);
        assert_eq!(config.screen_size, 32);
        assert_eq!(config.clip_grad_norm, Some(500.0));
        assert_eq!(config.opt_config, OptimizerConfig::Adam { lr: 1e-4 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = A2cConfig::<FullyConvConfig>::default();
        assert!(config.clone().n_steps(0).validate().is_err());
        assert!(config.clone().discount_factor(1.0).validate().is_err());
        assert!(config.discount_factor(0.0).validate().is_ok());
    }

    #[test]
    fn test_yaml_file() -> Result<()> {
        let dir = TempDir::new("a2c_config")?;
        let path = dir.path().join("a2c.yaml");
        let config = A2cConfig::default()
            .model_config(FullyConvConfig::new(vec![8], 32))
            .n_steps(16)
            .fallback_function(FunctionId(0))
            .device(tch::Device::Cpu);

        config.save(&path)?;
        let loaded = A2cConfig::<FullyConvConfig>::load(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }
}
