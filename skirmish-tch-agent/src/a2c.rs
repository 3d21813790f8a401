//! Single-step advantage actor-critic agent.
//!
//! The agent collects `n_steps` transitions from a batch of parallel games,
//! computes bootstrapped returns and takes one gradient step on
//!
//! ```text
//! loss = -mean(log pi(a) * sg(R - V)) + mean((R - V)^2) - c * sum(H(pi))
//! ```
//!
//! where `sg` stops the gradient and `H` is the entropy of the spatial policy,
//! summed over the whole rollout.
mod base;
mod config;
mod loss;
mod model;
mod sampler;
pub use base::A2c;
pub use config::A2cConfig;
pub use loss::{A2cLoss, LossTerms};
pub use model::A2cModel;
pub use sampler::{greedy, gumbel_max};
