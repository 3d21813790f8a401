//! Core interfaces between the agent and the game.
mod agent;
mod env;
pub use agent::Agent;
pub use env::Env;
