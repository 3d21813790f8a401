//! Single-step actor-critic agent implemented with [tch](https://crates.io/crates/tch).
pub mod a2c;
pub mod fully_conv;
pub mod model;
pub mod opt;
pub mod preprocess;
mod device;
mod util;
pub use device::Device;
pub use util::InputShape;
