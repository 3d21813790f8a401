//! Environment.
use crate::{act::FunctionCall, obs::TimeStep};
use anyhow::Result;

/// A batch of parallel game instances stepped together.
///
/// Every method returns one observation per instance, in a fixed order.
pub trait Env {
    /// Observation of a single instance.
    type Obs: TimeStep;

    /// Resets every instance.
    fn reset(&mut self) -> Result<Vec<Self::Obs>>;

    /// Applies one function call per instance and advances the game by one tick.
    fn step(&mut self, acts: &[FunctionCall]) -> Result<Vec<Self::Obs>>;

    /// Number of parallel instances.
    fn n_envs(&self) -> usize;
}
