//! The bounded activity log.

use crate::error::AppError;
use crate::model::{HistoryEntry, HistoryKind};
use crate::timestamp::format_timestamp;
use time::{Date, OffsetDateTime, UtcOffset};

pub const HISTORY_LIMIT: usize = 30;

/// Appends an entry stamped `now`, then drops the oldest entries so at
/// most `limit` remain.
pub fn record(
    history: &mut Vec<HistoryEntry>,
    kind: HistoryKind,
    todo_id: u64,
    text: &str,
    now: OffsetDateTime,
    limit: usize,
) -> Result<(), AppError> {
    history.push(HistoryEntry {
        kind,
        todo_id,
        text: text.to_string(),
        date: format_timestamp(now)?,
    });
    truncate_front(history, limit);
    Ok(())
}

pub fn truncate_front(history: &mut Vec<HistoryEntry>, limit: usize) {
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// `None` matches every kind.
    pub kind: Option<HistoryKind>,
    /// Local calendar day; `None` matches every day.
    pub date: Option<Date>,
}

impl HistoryFilter {
    /// Builds a filter from user-facing names. `"all"` or an
    /// unknown type name means no type filter.
    pub fn from_names(kind: Option<&str>, date: Option<Date>) -> Self {
        Self {
            kind: kind.and_then(HistoryKind::from_name),
            date,
        }
    }

    fn matches(&self, entry: &HistoryEntry, offset: UtcOffset) -> bool {
        let kind_matches = self.kind.is_none_or(|kind| kind == entry.kind);
        let date_matches = self.date.is_none_or(|date| {
            entry
                .recorded_at(offset)
                .is_some_and(|at| at.to_offset(offset).date() == date)
        });
        kind_matches && date_matches
    }
}

/// Newest entries first, filtered by kind and by local calendar day.
pub fn select_history(
    history: &[HistoryEntry],
    filter: &HistoryFilter,
    offset: UtcOffset,
) -> Vec<HistoryEntry> {
    history
        .iter()
        .rev()
        .filter(|entry| filter.matches(entry, offset))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{HISTORY_LIMIT, HistoryFilter, record, select_history};
    use crate::model::{HistoryEntry, HistoryKind};
    use time::macros::{date, datetime, offset};
    use time::{Duration, UtcOffset};

    fn entry(kind: HistoryKind, todo_id: u64, date: &str) -> HistoryEntry {
        HistoryEntry {
            kind,
            todo_id,
            text: format!("task {todo_id}"),
            date: date.to_string(),
        }
    }

    #[test]
    fn record_appends_with_timestamp() {
        let mut history = Vec::new();
        record(
            &mut history,
            HistoryKind::Added,
            9,
            "walk dog",
            datetime!(2024-01-01 10:00 UTC),
            HISTORY_LIMIT,
        )
        .unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, HistoryKind::Added);
        assert_eq!(history[0].todo_id, 9);
        assert_eq!(history[0].text, "walk dog");
        assert_eq!(history[0].date, "2024-01-01T10:00:00Z");
    }

    #[test]
    fn record_keeps_only_most_recent_thirty() {
        let mut history = Vec::new();
        let start = datetime!(2024-01-01 00:00 UTC);
        for id in 0..35u64 {
            record(
                &mut history,
                HistoryKind::Added,
                id,
                "x",
                start + Duration::minutes(id as i64),
                HISTORY_LIMIT,
            )
            .unwrap();
        }

        assert_eq!(history.len(), 30);
        let ids: Vec<u64> = history.iter().map(|entry| entry.todo_id).collect();
        assert_eq!(ids, (5..35).collect::<Vec<u64>>());
    }

    #[test]
    fn select_history_is_newest_first() {
        let history = vec![
            entry(HistoryKind::Added, 1, "2024-01-01T08:00:00Z"),
            entry(HistoryKind::Completed, 1, "2024-01-01T09:00:00Z"),
            entry(HistoryKind::Deleted, 1, "2024-01-01T10:00:00Z"),
        ];

        let selected = select_history(&history, &HistoryFilter::default(), UtcOffset::UTC);
        let kinds: Vec<HistoryKind> = selected.iter().map(|entry| entry.kind).collect();
        assert_eq!(
            kinds,
            vec![HistoryKind::Deleted, HistoryKind::Completed, HistoryKind::Added]
        );
    }

    #[test]
    fn select_history_filters_by_kind() {
        let history = vec![
            entry(HistoryKind::Added, 1, "2024-01-01T08:00:00Z"),
            entry(HistoryKind::Added, 2, "2024-01-01T09:00:00Z"),
            entry(HistoryKind::Deleted, 1, "2024-01-01T10:00:00Z"),
        ];

        let filter = HistoryFilter::from_names(Some("added"), None);
        let selected = select_history(&history, &filter, UtcOffset::UTC);
        let ids: Vec<u64> = selected.iter().map(|entry| entry.todo_id).collect();
        assert_eq!(ids, vec![2, 1]);

        let everything = HistoryFilter::from_names(Some("all"), None);
        assert_eq!(select_history(&history, &everything, UtcOffset::UTC).len(), 3);
    }

    #[test]
    fn select_history_matches_local_calendar_day() {
        let history = vec![
            entry(HistoryKind::Added, 1, "2024-01-01T22:30:00Z"),
            entry(HistoryKind::Added, 2, "2024-01-02T10:00:00Z"),
        ];
        let filter = HistoryFilter {
            kind: None,
            date: Some(date!(2024-01-02)),
        };

        let utc = select_history(&history, &filter, UtcOffset::UTC);
        assert_eq!(utc.iter().map(|e| e.todo_id).collect::<Vec<_>>(), vec![2]);

        // 22:30 UTC is already the next day at +02:00.
        let east = select_history(&history, &filter, offset!(+2));
        assert_eq!(east.iter().map(|e| e.todo_id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn unparseable_dates_never_match_a_day_filter() {
        let history = vec![entry(HistoryKind::Added, 1, "")];
        let filter = HistoryFilter {
            kind: None,
            date: Some(date!(2024-01-02)),
        };

        assert!(select_history(&history, &filter, UtcOffset::UTC).is_empty());
        assert_eq!(
            select_history(&history, &HistoryFilter::default(), UtcOffset::UTC).len(),
            1
        );
    }
}
