use crate::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::history::{self, HISTORY_LIMIT, HistoryFilter};
use crate::model::{HistoryEntry, HistoryKind, Task};
use crate::storage::{
    HISTORY_KEY, JsonFileStore, KeyValueStore, TODOS_KEY, decode_records, encode_records,
};
use crate::timestamp::{format_timestamp, parse_timestamp};
use crate::view::{self, DueStatus, SortKind, ViewKind};
use serde_json::{Map, Value};

/// Owns the task list and the history log between storage round trips.
///
/// Both collections are fetched once when the repository is opened.
/// Every mutation builds the next state aside, writes both keys in a
/// single `set`, and adopts the new state only once that write succeeds.
/// A failed write leaves the repository exactly as it was. Mutations need
/// `&mut self`; two of them can't interleave on one repository.
///
/// Stored records that don't decode are carried along untouched and
/// written back with every update.
#[derive(Debug)]
pub struct TaskRepository<S, C = SystemClock> {
    store: S,
    clock: C,
    history_limit: usize,
    todos: Vec<Task>,
    history: Vec<HistoryEntry>,
    unreadable_todos: Vec<Value>,
    unreadable_history: Vec<Value>,
}

pub fn open_default() -> Result<TaskRepository<JsonFileStore, SystemClock>, AppError> {
    TaskRepository::open(JsonFileStore::open_default()?, SystemClock)
}

impl<S: KeyValueStore, C: Clock> TaskRepository<S, C> {
    pub fn open(store: S, clock: C) -> Result<Self, AppError> {
        let mut repository = Self {
            store,
            clock,
            history_limit: HISTORY_LIMIT,
            todos: Vec::new(),
            history: Vec::new(),
            unreadable_todos: Vec::new(),
            unreadable_history: Vec::new(),
        };
        repository.reload()?;
        Ok(repository)
    }

    /// Caps the history at `limit` entries from the next write on. The
    /// entry for the action just taken is always kept, so the cap is at
    /// least one.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Replaces the in-memory copy with whatever storage holds now.
    pub fn reload(&mut self) -> Result<(), AppError> {
        let mut stored = self.store.get(&[TODOS_KEY, HISTORY_KEY])?;
        let todos = decode_records::<Task>(TODOS_KEY, stored.remove(TODOS_KEY));
        let history = decode_records::<HistoryEntry>(HISTORY_KEY, stored.remove(HISTORY_KEY));

        self.todos = todos.records;
        self.unreadable_todos = todos.unreadable;
        self.history = history.records;
        self.unreadable_history = history.unreadable;
        tracing::debug!(
            todos = self.todos.len(),
            history = self.history.len(),
            unreadable = self.unreadable_todos.len() + self.unreadable_history.len(),
            "loaded task state"
        );
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.todos
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn get_task(&self, id: u64) -> Option<&Task> {
        self.todos.iter().find(|task| task.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds a task. Blank text is ignored: `Ok(None)`, nothing written.
    ///
    /// `deadline` may be RFC 3339 or a local wall-clock time such as
    /// `2024-01-03 09:30`; an empty string means no deadline.
    pub fn add_task(
        &mut self,
        text: &str,
        deadline: Option<&str>,
    ) -> Result<Option<Task>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("ignoring blank task text");
            return Ok(None);
        }

        let now = self.clock.now();
        let deadline = match deadline.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => {
                let parsed = parse_timestamp(raw, now.offset()).ok_or_else(|| {
                    AppError::invalid_input("deadline must be RFC3339 or YYYY-MM-DD[ HH:MM[:SS]]")
                })?;
                Some(format_timestamp(parsed)?)
            }
            None => None,
        };

        let task = Task {
            id: self.next_id(),
            text: trimmed.to_string(),
            completed: false,
            date_added: format_timestamp(now)?,
            deadline,
            completed_date: None,
        };

        let mut todos = self.todos.clone();
        todos.push(task.clone());
        let history = self.recorded(HistoryKind::Added, task.id, &task.text)?;
        self.commit(todos, history)?;
        tracing::debug!(id = task.id, "task added");

        Ok(Some(task))
    }

    /// Marks a task done or not done. Unknown ids are ignored.
    ///
    /// Asking for the state a task is already in returns it untouched and
    /// records nothing.
    pub fn set_completed(&mut self, id: u64, completed: bool) -> Result<Option<Task>, AppError> {
        let Some(index) = self.todos.iter().position(|task| task.id == id) else {
            tracing::debug!(id, "set_completed on unknown task");
            return Ok(None);
        };

        if self.todos[index].completed == completed {
            return Ok(Some(self.todos[index].clone()));
        }

        let completed_date = if completed {
            Some(format_timestamp(self.clock.now())?)
        } else {
            None
        };

        let mut todos = self.todos.clone();
        let task = &mut todos[index];
        task.completed = completed;
        task.completed_date = completed_date;
        let updated = task.clone();

        let kind = if completed {
            HistoryKind::Completed
        } else {
            HistoryKind::Uncompleted
        };
        let history = self.recorded(kind, updated.id, &updated.text)?;
        self.commit(todos, history)?;
        tracing::debug!(id, completed, "task completion changed");

        Ok(Some(updated))
    }

    pub fn toggle_completed(&mut self, id: u64) -> Result<Option<Task>, AppError> {
        match self.get_task(id).map(|task| task.completed) {
            Some(completed) => self.set_completed(id, !completed),
            None => Ok(None),
        }
    }

    /// Removes a task for good. Unknown ids are ignored.
    pub fn delete_task(&mut self, id: u64) -> Result<Option<Task>, AppError> {
        let Some(index) = self.todos.iter().position(|task| task.id == id) else {
            tracing::debug!(id, "delete on unknown task");
            return Ok(None);
        };

        let mut todos = self.todos.clone();
        let removed = todos.remove(index);
        let history = self.recorded(HistoryKind::Deleted, removed.id, &removed.text)?;
        self.commit(todos, history)?;
        tracing::debug!(id, "task deleted");

        Ok(Some(removed))
    }

    pub fn view(&self, view: ViewKind, sort: SortKind) -> Vec<Task> {
        view::select_view(&self.todos, view, sort, self.clock.now())
    }

    pub fn history_view(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        history::select_history(&self.history, filter, self.clock.now().offset())
    }

    pub fn due_status(&self, task: &Task) -> Option<DueStatus> {
        view::due_status(task, self.clock.now())
    }

    // Timestamp-shaped like the stored ids. Any id still named by a task,
    // a history entry or an undecodable record counts as taken.
    fn next_id(&self) -> u64 {
        let now_millis =
            u64::try_from(self.clock.now().unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
        let raw_ids = self
            .unreadable_todos
            .iter()
            .filter_map(|value| value.get("id"))
            .chain(
                self.unreadable_history
                    .iter()
                    .filter_map(|value| value.get("todoId")),
            )
            .filter_map(Value::as_u64);
        let taken = self
            .todos
            .iter()
            .map(|task| task.id)
            .chain(self.history.iter().map(|entry| entry.todo_id))
            .chain(raw_ids)
            .max();

        taken.map_or(now_millis, |max| now_millis.max(max.saturating_add(1)))
    }

    fn recorded(
        &self,
        kind: HistoryKind,
        todo_id: u64,
        text: &str,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let mut history = self.history.clone();
        history::record(
            &mut history,
            kind,
            todo_id,
            text,
            self.clock.now(),
            self.history_limit,
        )?;
        Ok(history)
    }

    // Undecodable history entries are older than anything recorded since
    // load, so they sit in front and are the first to go under the cap.
    fn commit(&mut self, todos: Vec<Task>, history: Vec<HistoryEntry>) -> Result<(), AppError> {
        let room = self.history_limit.saturating_sub(history.len());
        let dropped = self.unreadable_history.len().saturating_sub(room);

        let mut todo_values = encode_records(&todos)?;
        todo_values.extend(self.unreadable_todos.iter().cloned());
        let mut history_values = self.unreadable_history[dropped..].to_vec();
        history_values.extend(encode_records(&history)?);

        let mut entries = Map::new();
        entries.insert(TODOS_KEY.to_string(), Value::Array(todo_values));
        entries.insert(HISTORY_KEY.to_string(), Value::Array(history_values));
        self.store.set(entries)?;

        self.unreadable_history.drain(..dropped);
        self.todos = todos;
        self.history = history;
        Ok(())
    }
}

impl<S, C> TaskRepository<S, C> {
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
