//! Storage of one rollout window and bootstrapped returns.
mod base;
mod returns;
pub use base::{RolloutInputs, RolloutStorage};
pub use returns::discounted_returns;
