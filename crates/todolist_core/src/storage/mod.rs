//! The key-value storage collaborator.
//!
//! Two top-level keys hold the whole persisted state: `todos` and
//! `history`, each an ordered array written wholesale.

pub mod json_store;
pub mod memory;

pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub const TODOS_KEY: &str = "todos";
pub const HISTORY_KEY: &str = "history";

pub trait KeyValueStore {
    /// Returns the stored value for each requested key that is set.
    /// Unset keys are absent from the map, never an error.
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, AppError>;

    /// Replaces each given key wholesale. Keys not mentioned are kept.
    fn set(&mut self, entries: Map<String, Value>) -> Result<(), AppError>;
}

/// The outcome of decoding one stored array.
#[derive(Debug)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    /// Raw items that did not decode, in stored order. Written back as-is
    /// so a rewrite never loses them.
    pub unreadable: Vec<Value>,
}

/// Decodes a stored array record by record.
///
/// A missing key or a non-array value reads as empty. Records that cannot
/// be decoded are set aside in `unreadable` so one bad entry never hides
/// the rest.
pub fn decode_records<T: DeserializeOwned>(key: &str, value: Option<Value>) -> Decoded<T> {
    let items = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!(key, kind = value_kind(&other), "stored collection is not an array");
            Vec::new()
        }
    };

    let mut decoded = Decoded {
        records: Vec::with_capacity(items.len()),
        unreadable: Vec::new(),
    };
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item.clone()) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                tracing::warn!(key, index, error = %err, "keeping undecodable record as stored");
                decoded.unreadable.push(item);
            }
        }
    }
    decoded
}

pub fn encode_records<T: Serialize>(records: &[T]) -> Result<Vec<Value>, AppError> {
    records
        .iter()
        .map(|record| serde_json::to_value(record).map_err(AppError::from))
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
