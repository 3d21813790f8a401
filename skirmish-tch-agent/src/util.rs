//! Utilities.
use anyhow::Result;
use tch::{Device, Kind, Tensor};

/// Interface for handling the input shape of spatial models.
pub trait InputShape {
    /// Sets the number of channels of every model input.
    fn set_in_channels(&mut self, v: Vec<i64>);

    /// Sets the side of the square screen.
    fn set_screen_size(&mut self, v: i64);
}

/// Copies a 1-dimensional tensor into a vector of `f32`.
pub fn tensor_to_vec_f32(t: &Tensor) -> Result<Vec<f32>> {
    let t = t.detach().to_device(Device::Cpu).to_kind(Kind::Float);
    Ok(Vec::<f32>::try_from(&t.flatten(0, -1))?)
}

/// Copies a 1-dimensional tensor into a vector of `i64`.
pub fn tensor_to_vec_i64(t: &Tensor) -> Result<Vec<i64>> {
    let t = t.detach().to_device(Device::Cpu).to_kind(Kind::Int64);
    Ok(Vec::<i64>::try_from(&t.flatten(0, -1))?)
}

/// Reads a scalar tensor.
pub fn tensor_to_f32(t: &Tensor) -> Result<f32> {
    let t = t.detach().to_device(Device::Cpu).to_kind(Kind::Float);
    Ok(f32::try_from(t)?)
}
