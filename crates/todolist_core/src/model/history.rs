use super::null_as_default;
use crate::timestamp::parse_timestamp;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Added,
    Completed,
    Uncompleted,
    Deleted,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 4] = [
        HistoryKind::Added,
        HistoryKind::Completed,
        HistoryKind::Uncompleted,
        HistoryKind::Deleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Completed => "completed",
            Self::Uncompleted => "uncompleted",
            Self::Deleted => "deleted",
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
    }

    pub fn action_label(self) -> &'static str {
        match self {
            Self::Added => "Added task",
            Self::Completed => "Completed task",
            Self::Uncompleted => "Uncompleted task",
            Self::Deleted => "Deleted task",
        }
    }
}

/// One audit record under the `history` storage key. `text` is a snapshot
/// taken when the event happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub todo_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
}

impl HistoryEntry {
    pub fn recorded_at(&self, offset: UtcOffset) -> Option<OffsetDateTime> {
        parse_timestamp(&self.date, offset)
    }
}
