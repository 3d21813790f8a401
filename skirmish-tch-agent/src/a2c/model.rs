use crate::{
    model::{ModelBase, SubModel},
    opt::{Optimizer, OptimizerConfig},
};
use anyhow::Result;
use log::{info, trace};
use std::path::Path;
use tch::{nn, Device, Tensor};

/// Policy/value network of the A2C agent together with its optimizer.
pub struct A2cModel<P>
where
    P: SubModel<Input = Vec<Tensor>, Output = (Tensor, Tensor)>,
{
    device: Device,
    var_store: nn::VarStore,
    net: P,
    opt: Optimizer,
}

impl<P> A2cModel<P>
where
    P: SubModel<Input = Vec<Tensor>, Output = (Tensor, Tensor)>,
{
    /// Builds the network and its optimizer on `device`.
    pub fn build(
        net_config: P::Config,
        opt_config: &OptimizerConfig,
        clip_grad_norm: Option<f64>,
        device: Device,
    ) -> Result<Self> {
        let var_store = nn::VarStore::new(device);
        let net = P::build(&var_store, net_config);
        let opt = opt_config.build(&var_store, clip_grad_norm)?;
        info!(
            "Build A2C model on {:?}: lr = {}, clip_grad_norm = {:?}",
            device,
            opt_config.lr(),
            clip_grad_norm
        );

        Ok(Self {
            device,
            var_store,
            net,
            opt,
        })
    }

    /// Returns `(policy, value)` for the given inputs.
    pub fn forward(&self, xs: &[Tensor]) -> (Tensor, Tensor) {
        let xs = xs.iter().map(|x| x.to(self.device)).collect();
        self.net.forward(&xs)
    }

    /// Device of the parameters.
    pub fn device(&self) -> Device {
        self.device
    }
}

impl<P> ModelBase for A2cModel<P>
where
    P: SubModel<Input = Vec<Tensor>, Output = (Tensor, Tensor)>,
{
    fn backward_step(&mut self, loss: &Tensor) {
        self.opt.backward_step(loss);
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(&path)?;
        info!("Save A2C model to {:?}", path.as_ref());
        for (name, _) in self.var_store.variables().iter() {
            trace!("Save variable {}", name);
        }
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(&path)?;
        info!("Load A2C model from {:?}", path.as_ref());
        Ok(())
    }
}
