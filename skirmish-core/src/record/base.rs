//! Key-value records.
use crate::error::SkirmishError;
use std::collections::{hash_map::Iter, HashMap};

/// A value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, such as a loss.
    Scalar(f32),

    /// A vector, such as per-environment episode rewards.
    Array1(Vec<f32>),
}

/// Named values emitted by the agent.
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates a record holding a single scalar.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Inserts a value, overwriting any previous value with the same key.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over key-value pairs.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets the value of a key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, SkirmishError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(SkirmishError::RecordValueTypeError("Scalar".to_string())),
            None => Err(SkirmishError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a vector value.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, SkirmishError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(SkirmishError::RecordValueTypeError("Array1".to_string())),
            None => Err(SkirmishError::RecordKeyError(k.to_string())),
        }
    }

    /// Number of values in the record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record holds no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
