//! Writes records of the agent as TensorBoard scalar summaries.
use log::debug;
use skirmish_core::record::{Record, RecordValue, Recorder};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Default directory of the summaries.
pub const DEFAULT_LOGDIR: &str = "./logs";

/// Write records to TFRecord.
///
/// Every record must carry the step key (`opt_steps` by default), used as the
/// global step of the summaries. Scalars are written as they are, vectors as
/// one scalar per element with the index appended to the key.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    fallback_step: usize,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "opt_steps".to_string(),
            fallback_step: 0,
        }
    }

    /// Sets the key of the global step.
    pub fn step_key(mut self, key: impl Into<String>) -> Self {
        self.step_key = key.into();
        self
    }
}

impl Default for TensorboardRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_LOGDIR)
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// A record without the step key is written at the step of the previous
    /// record.
    fn write(&mut self, record: Record) {
        let step = match record.get_scalar(&self.step_key) {
            Ok(v) => v as usize,
            Err(_) => {
                debug!("No {} in record, write at step {}", self.step_key, self.fallback_step);
                self.fallback_step
            }
        };
        self.fallback_step = step;

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::Array1(vs) => {
                    for (i, v) in vs.iter().enumerate() {
                        self.writer.add_scalar(&format!("{}/{}", k, i), *v, step);
                    }
                }
            }
        }
    }

    fn flush(&mut self) {
        self.writer.flush();
    }
}
