mod history;
mod task;

pub use history::{HistoryEntry, HistoryKind};
pub use task::Task;

use serde::{Deserialize, Deserializer};

/// Reads `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
