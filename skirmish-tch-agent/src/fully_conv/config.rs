use crate::util::InputShape;
use serde::{Deserialize, Serialize};

/// Configuration of [`FullyConv`](super::FullyConv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FullyConvConfig {
    pub(super) in_channels: Vec<i64>,
    pub(super) screen_size: i64,
    #[serde(default = "default_hidden_dim")]
    pub(super) hidden_dim: i64,
}

fn default_hidden_dim() -> i64 {
    256
}

impl Default for FullyConvConfig {
    fn default() -> Self {
        Self {
            in_channels: vec![],
            screen_size: 32,
            hidden_dim: default_hidden_dim(),
        }
    }
}

impl FullyConvConfig {
    /// Constructs a configuration.
    pub fn new(in_channels: Vec<i64>, screen_size: i64) -> Self {
        Self {
            in_channels,
            screen_size,
            ..Default::default()
        }
    }

    /// Sets the width of the hidden layer of the value head.
    pub fn hidden_dim(mut self, v: i64) -> Self {
        self.hidden_dim = v;
        self
    }
}

impl InputShape for FullyConvConfig {
    fn set_in_channels(&mut self, v: Vec<i64>) {
        self.in_channels = v;
    }

    fn set_screen_size(&mut self, v: i64) {
        self.screen_size = v;
    }
}
