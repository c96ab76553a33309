use super::KeyValueStore;
use crate::error::AppError;
use serde_json::{Map, Value};

/// Keeps every key in process memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryStore {
    entries: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, AppError> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }

    fn set(&mut self, entries: Map<String, Value>) -> Result<(), AppError> {
        self.entries.extend(entries);
        Ok(())
    }
}
