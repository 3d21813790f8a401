//! Agent.
use crate::{act::FunctionCall, obs::TimeStep};
use anyhow::Result;
use std::path::Path;

/// Maps observations of parallel game instances to function calls, learning
/// along the way.
pub trait Agent<O: TimeStep> {
    /// Takes one step: consumes the current observations and returns one
    /// function call per instance.
    fn step(&mut self, obs: &[O]) -> Result<Vec<FunctionCall>>;

    /// Sets the agent to training mode.
    fn train(&mut self);

    /// Sets the agent to evaluation mode.
    fn eval(&mut self);

    /// Returns `true` in training mode.
    fn is_train(&self) -> bool;

    /// Saves the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
