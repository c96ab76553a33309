use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::macros::format_description;
use todolist_core::config::Palette;
use todolist_core::model::{HistoryEntry, Task};
use todolist_core::timestamp::parse_timestamp;
use todolist_core::view::due_status;

/// Renders a timestamp relative to `now`: `Today at 09:30`,
/// `Tomorrow at 09:30`, otherwise `Jan 3, 09:30`. Values that don't parse
/// are shown as stored.
pub fn format_date(raw: &str, now: OffsetDateTime) -> String {
    let Some(parsed) = parse_timestamp(raw, now.offset()) else {
        return raw.trim().to_string();
    };

    let local = parsed.to_offset(now.offset());
    let clock = format_description!("[hour]:[minute]");
    let time_of_day = local.format(clock).unwrap_or_default();

    if local.date() == now.date() {
        format!("Today at {time_of_day}")
    } else if now.date().next_day() == Some(local.date()) {
        format!("Tomorrow at {time_of_day}")
    } else {
        let full = format_description!("[month repr:short] [day padding:none], [hour]:[minute]");
        local.format(full).unwrap_or_else(|_| raw.to_string())
    }
}

#[derive(Debug, Tabled)]
pub struct TaskRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Task")]
    pub text: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Added")]
    pub added: String,
    #[tabled(rename = "Due")]
    pub due: String,
    #[tabled(rename = "Completed")]
    pub completed: String,
}

impl TaskRow {
    pub fn new(task: &Task, now: OffsetDateTime, palette: &Palette) -> Self {
        let status = if task.completed {
            "completed".to_string()
        } else {
            match due_status(task, now) {
                Some(status) => palette.due_status(status),
                None => "open".to_string(),
            }
        };

        Self {
            id: task.id,
            text: task.text.clone(),
            status,
            added: format_date(&task.date_added, now),
            due: task
                .deadline
                .as_deref()
                .map(|deadline| format_date(deadline, now))
                .unwrap_or_else(|| "-".to_string()),
            completed: task
                .completed_date
                .as_deref()
                .map(|completed| format_date(completed, now))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "When")]
    pub when: String,
    #[tabled(rename = "Action")]
    pub action: String,
    #[tabled(rename = "ID")]
    pub todo_id: u64,
}

impl HistoryRow {
    pub fn new(entry: &HistoryEntry, now: OffsetDateTime) -> Self {
        Self {
            when: format_date(&entry.date, now),
            action: format!("{}: {}", entry.kind.action_label(), entry.text),
            todo_id: entry.todo_id,
        }
    }
}

pub fn render_tasks(tasks: &[Task], now: OffsetDateTime, palette: &Palette) -> String {
    let rows = tasks.iter().map(|task| TaskRow::new(task, now, palette));
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

pub fn render_history(entries: &[HistoryEntry], now: OffsetDateTime) -> String {
    let rows = entries.iter().map(|entry| HistoryRow::new(entry, now));
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// A task as JSON in the storage layout plus its derived `dueStatus`.
pub fn task_json(task: &Task, now: OffsetDateTime) -> serde_json::Value {
    let mut value = serde_json::to_value(task).unwrap_or(serde_json::Value::Null);
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "dueStatus".to_string(),
            due_status(task, now)
                .map(|status| serde_json::Value::from(status.as_str()))
                .unwrap_or(serde_json::Value::Null),
        );
    }
    value
}
