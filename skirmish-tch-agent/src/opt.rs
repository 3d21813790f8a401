//! Optimizers.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tch::{
    nn::{Adam, AdamW, Optimizer as Optimizer_, OptimizerConfig as OptimizerConfig_, VarStore},
    Tensor,
};

/// Configures an optimizer for training neural networks in an RL agent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,
        /// Decay of the first moment.
        beta1: f64,
        /// Decay of the second moment.
        beta2: f64,
        /// Weight decay.
        wd: f64,
        /// Term added to the denominator.
        eps: f64,
        /// Use the AMSGrad variant.
        amsgrad: bool,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 1e-4 }
    }
}

impl OptimizerConfig {
    /// Constructs an optimizer.
    ///
    /// With `clip_grad_norm`, gradients are rescaled so that their global norm
    /// does not exceed the given value before each step.
    pub fn build(&self, vs: &VarStore, clip_grad_norm: Option<f64>) -> Result<Optimizer> {
        let opt = match &self {
            OptimizerConfig::Adam { lr } => Adam::default().build(vs, *lr)?,
            OptimizerConfig::AdamW {
                lr,
                beta1,
                beta2,
                wd,
                eps,
                amsgrad,
            } => AdamW {
                beta1: *beta1,
                beta2: *beta2,
                wd: *wd,
                eps: *eps,
                amsgrad: *amsgrad,
            }
            .build(vs, *lr)?,
        };
        Ok(Optimizer { opt, clip_grad_norm })
    }

    /// Learning rate.
    pub fn lr(&self) -> f64 {
        match self {
            Self::Adam { lr } => *lr,
            Self::AdamW { lr, .. } => *lr,
        }
    }
}

/// Thin wrapper of [`tch::nn::Optimizer`] with optional gradient-norm clipping.
pub struct Optimizer {
    opt: Optimizer_,
    clip_grad_norm: Option<f64>,
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) {
        match self.clip_grad_norm {
            Some(max) => self.opt.backward_step_clip_norm(loss, max),
            None => self.opt.backward_step(loss),
        }
    }
}
