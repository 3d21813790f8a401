//! Records of training and interaction statistics.
//!
//! A [`Record`] is a bag of named values. The agent emits one per training
//! update and one per episode boundary; a [`Recorder`] decides where they go.
//!
//! ```rust
//! use skirmish_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("opt_steps", 3.0);
//! record.insert("loss/value", RecordValue::Scalar(0.25));
//! record.insert("episode_reward", RecordValue::Array1(vec![1.0, 2.0]));
//! assert_eq!(record.get_scalar("loss/value").unwrap(), 0.25);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
