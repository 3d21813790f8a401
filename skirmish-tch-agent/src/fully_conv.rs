//! Fully convolutional policy/value network.
//!
//! Each input goes through its own convolution tower keeping the screen
//! resolution. The towers are concatenated; a 1x1 convolution gives one logit
//! per screen pixel, and a dense head gives the value.
mod base;
mod config;
pub use base::FullyConv;
pub use config::FullyConvConfig;
