#![warn(missing_docs)]
//! Core of a single-step actor-critic agent for real-time strategy games.
//!
//! This crate has no tensor backend. It defines the observation and action
//! protocols of the game, the [`RolloutStorage`] with its bootstrapped
//! returns, episode reward bookkeeping, records, and the [`Runner`] loop.
pub mod act;
pub mod error;
pub mod obs;
pub mod record;
pub mod rollout;

mod base;
pub use base::{Agent, Env};

mod episode;
pub use episode::EpisodeRewards;

mod runner;
pub use runner::{Runner, RunnerConfig};

pub use act::{unravel_coords, FunctionCall, FunctionId, SpatialCoords};
pub use obs::{ActionAvailability, TimeStep};
pub use rollout::{RolloutInputs, RolloutStorage};
