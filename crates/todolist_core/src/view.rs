//! Filtered and sorted task views, plus due-status classification.

use crate::model::Task;
use std::cmp::Ordering;
use time::{Duration, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    /// Not yet completed.
    #[default]
    Tasks,
    Completed,
    /// Not completed, deadline strictly in the future.
    Upcoming,
    /// Not completed, deadline strictly in the past.
    Overdue,
    All,
}

impl ViewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Completed => "completed",
            Self::Upcoming => "upcoming",
            Self::Overdue => "overdue",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKind {
    Deadline,
    Added,
    CompletedDate,
    Name,
    /// Keep stored order.
    #[default]
    Unsorted,
}

impl SortKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deadline => "deadline",
            Self::Added => "added",
            Self::CompletedDate => "completed-date",
            Self::Name => "name",
            Self::Unsorted => "none",
        }
    }
}

impl From<&str> for SortKind {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deadline" => Self::Deadline,
            "added" => Self::Added,
            "completed-date" | "completed_date" => Self::CompletedDate,
            "name" => Self::Name,
            _ => Self::Unsorted,
        }
    }
}

/// Applies `view` then a stable sort by `sort`, relative to `now`.
pub fn select_view(
    tasks: &[Task],
    view: ViewKind,
    sort: SortKind,
    now: OffsetDateTime,
) -> Vec<Task> {
    let offset = now.offset();
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| matches_view(task, view, now))
        .cloned()
        .collect();

    match sort {
        SortKind::Deadline => selected.sort_by(|a, b| compare_deadline(a, b, offset)),
        SortKind::Added => selected.sort_by(|a, b| {
            epoch_if_absent(b.added_at(offset)).cmp(&epoch_if_absent(a.added_at(offset)))
        }),
        SortKind::CompletedDate => selected.sort_by(|a, b| {
            epoch_if_absent(b.completed_at(offset)).cmp(&epoch_if_absent(a.completed_at(offset)))
        }),
        SortKind::Name => selected.sort_by(|a, b| compare_text(&a.text, &b.text)),
        SortKind::Unsorted => {}
    }

    selected
}

fn matches_view(task: &Task, view: ViewKind, now: OffsetDateTime) -> bool {
    match view {
        ViewKind::Tasks => !task.completed,
        ViewKind::Completed => task.completed,
        ViewKind::Upcoming => {
            !task.completed && task.deadline_at(now.offset()).is_some_and(|due| due > now)
        }
        ViewKind::Overdue => {
            !task.completed && task.deadline_at(now.offset()).is_some_and(|due| due < now)
        }
        ViewKind::All => true,
    }
}

// Tasks without a deadline always go last.
fn compare_deadline(a: &Task, b: &Task, offset: UtcOffset) -> Ordering {
    match (a.deadline_at(offset), b.deadline_at(offset)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn epoch_if_absent(value: Option<OffsetDateTime>) -> OffsetDateTime {
    value.unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Case-insensitive order on Unicode lowercase code points. This is not
/// collation: accented letters sort after `z`, so `Éclair` follows
/// `zebra`.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DueStatus {
    Overdue,
    DueNow,
    DueVerySoon,
    DueSoon3,
    DueSoon2,
    DueSoon1,
}

impl DueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::DueNow => "due-now",
            Self::DueVerySoon => "due-very-soon",
            Self::DueSoon3 => "due-soon-3",
            Self::DueSoon2 => "due-soon-2",
            Self::DueSoon1 => "due-soon-1",
        }
    }

    pub fn is_urgent(self) -> bool {
        matches!(self, Self::Overdue | Self::DueNow | Self::DueVerySoon)
    }
}

/// Urgency band for an open task, from the time left until its deadline.
///
/// Bands are upper-inclusive: exactly two hours left is still `DueNow`.
/// Completed tasks, tasks without a deadline and tasks more than 72 hours
/// out have no status.
pub fn due_status(task: &Task, now: OffsetDateTime) -> Option<DueStatus> {
    if task.completed {
        return None;
    }

    let remaining = task.deadline_at(now.offset())? - now;
    if remaining < Duration::ZERO {
        Some(DueStatus::Overdue)
    } else if remaining <= Duration::hours(2) {
        Some(DueStatus::DueNow)
    } else if remaining <= Duration::hours(5) {
        Some(DueStatus::DueVerySoon)
    } else if remaining <= Duration::hours(8) {
        Some(DueStatus::DueSoon3)
    } else if remaining <= Duration::hours(48) {
        Some(DueStatus::DueSoon2)
    } else if remaining <= Duration::hours(72) {
        Some(DueStatus::DueSoon1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{DueStatus, SortKind, ViewKind, due_status, select_view};
    use crate::model::Task;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    fn task(id: u64, text: &str) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed: false,
            date_added: "2024-01-01T00:00:00Z".to_string(),
            deadline: None,
            completed_date: None,
        }
    }

    fn with_deadline(mut task: Task, deadline: &str) -> Task {
        task.deadline = Some(deadline.to_string());
        task
    }

    fn completed(mut task: Task, at: &str) -> Task {
        task.completed = true;
        task.completed_date = Some(at.to_string());
        task
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|task| task.id).collect()
    }

    const NOW: OffsetDateTime = datetime!(2024-01-02 12:00 UTC);

    #[test]
    fn tasks_and_completed_views_split_on_completion() {
        let tasks = vec![
            task(1, "open"),
            completed(task(2, "done"), "2024-01-01T10:00:00Z"),
            task(3, "also open"),
        ];

        let open = select_view(&tasks, ViewKind::Tasks, SortKind::Unsorted, NOW);
        let done = select_view(&tasks, ViewKind::Completed, SortKind::Unsorted, NOW);
        let all = select_view(&tasks, ViewKind::All, SortKind::Unsorted, NOW);

        assert_eq!(ids(&open), vec![1, 3]);
        assert_eq!(ids(&done), vec![2]);
        assert_eq!(ids(&all), vec![1, 2, 3]);
    }

    #[test]
    fn upcoming_and_overdue_require_open_task_with_deadline() {
        let tasks = vec![
            with_deadline(task(1, "future"), "2024-01-03T00:00:00Z"),
            with_deadline(task(2, "past"), "2024-01-01T00:00:00Z"),
            task(3, "no deadline"),
            completed(
                with_deadline(task(4, "done past"), "2024-01-01T00:00:00Z"),
                "2024-01-01T01:00:00Z",
            ),
            with_deadline(task(5, "exactly now"), "2024-01-02T12:00:00Z"),
        ];

        let upcoming = select_view(&tasks, ViewKind::Upcoming, SortKind::Unsorted, NOW);
        let overdue = select_view(&tasks, ViewKind::Overdue, SortKind::Unsorted, NOW);

        assert_eq!(ids(&upcoming), vec![1]);
        assert_eq!(ids(&overdue), vec![2]);
    }

    #[test]
    fn deadline_sort_puts_missing_deadlines_last() {
        let tasks = vec![
            with_deadline(task(1, "third"), "2024-01-03T00:00:00Z"),
            task(2, "none"),
            with_deadline(task(3, "first"), "2024-01-01T00:00:00Z"),
        ];

        let sorted = select_view(&tasks, ViewKind::All, SortKind::Deadline, NOW);
        assert_eq!(ids(&sorted), vec![3, 1, 2]);
    }

    #[test]
    fn deadline_sort_keeps_order_among_missing_deadlines() {
        let tasks = vec![
            task(1, "a"),
            task(2, "b"),
            with_deadline(task(3, "c"), "2024-01-05T00:00:00Z"),
        ];

        let sorted = select_view(&tasks, ViewKind::All, SortKind::Deadline, NOW);
        assert_eq!(ids(&sorted), vec![3, 1, 2]);
    }

    #[test]
    fn added_sort_is_newest_first() {
        let mut older = task(1, "older");
        older.date_added = "2024-01-01T08:00:00Z".to_string();
        let mut newer = task(2, "newer");
        newer.date_added = "2024-01-01T09:00:00Z".to_string();

        let sorted = select_view(&[older, newer], ViewKind::All, SortKind::Added, NOW);
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn completed_date_sort_is_newest_first_with_missing_last() {
        let tasks = vec![
            completed(task(1, "early"), "2024-01-01T08:00:00Z"),
            task(2, "never"),
            completed(task(3, "late"), "2024-01-01T20:00:00Z"),
        ];

        let sorted = select_view(&tasks, ViewKind::All, SortKind::CompletedDate, NOW);
        assert_eq!(ids(&sorted), vec![3, 1, 2]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let tasks = vec![task(1, "banana"), task(2, "Apple"), task(3, "cherry")];

        let sorted = select_view(&tasks, ViewKind::All, SortKind::Name, NOW);
        let texts: Vec<&str> = sorted.iter().map(|task| task.text.as_str()).collect();
        assert_eq!(texts, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn name_sort_orders_by_code_point_not_collation() {
        let tasks = vec![task(1, "Éclair"), task(2, "zebra"), task(3, "apple")];

        let sorted = select_view(&tasks, ViewKind::All, SortKind::Name, NOW);
        assert_eq!(ids(&sorted), vec![3, 2, 1]);
    }

    #[test]
    fn unknown_sort_names_fall_back() {
        assert_eq!(SortKind::from("priority"), SortKind::Unsorted);
        assert_eq!(SortKind::from("completed-date"), SortKind::CompletedDate);
        assert_eq!(SortKind::from(SortKind::Name.as_str()), SortKind::Name);

        let tasks = vec![task(2, "b"), task(1, "a")];
        let sorted = select_view(&tasks, ViewKind::All, SortKind::from("priority"), NOW);
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn due_status_bands() {
        let at = |offset: Duration| {
            let deadline = NOW + offset;
            with_deadline(task(1, "t"), &crate::timestamp::format_timestamp(deadline).unwrap())
        };

        assert_eq!(due_status(&at(Duration::hours(-1)), NOW), Some(DueStatus::Overdue));
        assert_eq!(due_status(&at(Duration::ZERO), NOW), Some(DueStatus::DueNow));
        assert_eq!(due_status(&at(Duration::hours(1)), NOW), Some(DueStatus::DueNow));
        assert_eq!(due_status(&at(Duration::hours(2)), NOW), Some(DueStatus::DueNow));
        assert_eq!(due_status(&at(Duration::hours(3)), NOW), Some(DueStatus::DueVerySoon));
        assert_eq!(due_status(&at(Duration::hours(6)), NOW), Some(DueStatus::DueSoon3));
        assert_eq!(due_status(&at(Duration::hours(24)), NOW), Some(DueStatus::DueSoon2));
        assert_eq!(due_status(&at(Duration::hours(60)), NOW), Some(DueStatus::DueSoon1));
        assert_eq!(due_status(&at(Duration::hours(73)), NOW), None);
    }

    #[test]
    fn due_status_skips_completed_and_undated_tasks() {
        let done = completed(
            with_deadline(task(1, "done"), "2024-01-02T13:00:00Z"),
            "2024-01-02T11:00:00Z",
        );
        assert_eq!(due_status(&done, NOW), None);
        assert_eq!(due_status(&task(2, "open"), NOW), None);
        assert_eq!(
            due_status(&with_deadline(task(3, "bad"), "soon"), NOW),
            None
        );
    }

    #[test]
    fn due_status_names_are_kebab_case() {
        assert_eq!(DueStatus::DueNow.as_str(), "due-now");
        assert_eq!(DueStatus::DueSoon3.as_str(), "due-soon-3");
        assert!(DueStatus::Overdue.is_urgent());
        assert!(!DueStatus::DueSoon1.is_urgent());
    }
}
