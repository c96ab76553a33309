use super::null_as_default;
use crate::timestamp::parse_timestamp;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

/// A to-do item as kept under the `todos` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_added: String,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
}

impl Task {
    pub fn deadline_at(&self, offset: UtcOffset) -> Option<OffsetDateTime> {
        self.deadline
            .as_deref()
            .and_then(|value| parse_timestamp(value, offset))
    }

    pub fn added_at(&self, offset: UtcOffset) -> Option<OffsetDateTime> {
        parse_timestamp(&self.date_added, offset)
    }

    pub fn completed_at(&self, offset: UtcOffset) -> Option<OffsetDateTime> {
        self.completed_date
            .as_deref()
            .and_then(|value| parse_timestamp(value, offset))
    }
}
