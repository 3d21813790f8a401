//! Observation protocol of the game.
use crate::act::FunctionId;
use ndarray::Array3;

/// Observation of a single environment instance at one tick.
pub trait TimeStep {
    /// Reward received since the previous tick.
    fn reward(&self) -> f32;

    /// Returns `true` on the first tick of an episode.
    fn first(&self) -> bool;

    /// Functions that can be issued at this tick.
    fn available_actions(&self) -> &[FunctionId];

    /// Screen feature layers, shaped `(layers, rows, cols)`.
    fn feature_screen(&self) -> &Array3<i32>;
}

/// Capability check over the action protocol.
pub trait ActionAvailability {
    /// Returns `true` if `function` can be issued now.
    fn is_available(&self, function: FunctionId) -> bool;
}

impl<T: TimeStep + ?Sized> ActionAvailability for T {
    fn is_available(&self, function: FunctionId) -> bool {
        self.available_actions().contains(&function)
    }
}
