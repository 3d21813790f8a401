use super::FullyConvConfig;
use crate::model::SubModel;
use log::info;
use tch::{nn, nn::Module, Device, Kind, Tensor};

/// Fully convolutional network producing a spatial policy and a value.
///
/// Output of [`SubModel::forward`] is `(policy, value)`: `policy` holds the
/// action probabilities over the flattened screen, `[batch, rows * cols]`, and
/// `value` the state values, `[batch]`.
pub struct FullyConv {
    device: Device,
    towers: Vec<nn::Sequential>,
    spatial: nn::Conv2D,
    value: nn::Sequential,
}

impl FullyConv {
    fn padding(p: i64) -> nn::ConvConfig {
        nn::ConvConfig {
            padding: p,
            ..Default::default()
        }
    }

    fn create_tower(p: &nn::Path, in_channels: i64) -> nn::Sequential {
        nn::seq()
            .add(nn::conv2d(p / "c1", in_channels, 16, 5, Self::padding(2)))
            .add_fn(|xs| xs.relu())
            .add(nn::conv2d(p / "c2", 16, 32, 3, Self::padding(1)))
            .add_fn(|xs| xs.relu())
    }

    fn create_value_head(p: &nn::Path, in_dim: i64, hidden_dim: i64) -> nn::Sequential {
        nn::seq()
            .add_fn(|xs| xs.flatten(1, -1))
            .add(nn::linear(p / "l1", in_dim, hidden_dim, Default::default()))
            .add_fn(|xs| xs.relu())
            .add(nn::linear(p / "l2", hidden_dim, 1, Default::default()))
    }
}

impl SubModel for FullyConv {
    type Config = FullyConvConfig;
    type Input = Vec<Tensor>;
    type Output = (Tensor, Tensor);

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        let p = &var_store.root();
        let towers = config
            .in_channels
            .iter()
            .enumerate()
            .map(|(i, &c)| Self::create_tower(&(p / format!("tower{}", i)), c))
            .collect::<Vec<_>>();
        let state_channels = 32 * towers.len() as i64;
        let spatial = nn::conv2d(p / "spatial", state_channels, 1, 1, Default::default());
        let in_dim = state_channels * config.screen_size * config.screen_size;
        let value = Self::create_value_head(&(p / "value"), in_dim, config.hidden_dim);
        info!(
            "Build FullyConv: inputs = {:?}, screen = {}",
            config.in_channels, config.screen_size
        );

        Self {
            device: var_store.device(),
            towers,
            spatial,
            value,
        }
    }

    fn forward(&self, xs: &Self::Input) -> Self::Output {
        debug_assert_eq!(xs.len(), self.towers.len());
        let state = self
            .towers
            .iter()
            .zip(xs.iter())
            .map(|(tower, x)| tower.forward(&x.to(self.device)))
            .collect::<Vec<_>>();
        let state = Tensor::cat(&state, 1);

        let policy = self
            .spatial
            .forward(&state)
            .flatten(1, -1)
            .softmax(-1, Kind::Float);
        let value = self.value.forward(&state).squeeze_dim(-1);

        (policy, value)
    }
}
