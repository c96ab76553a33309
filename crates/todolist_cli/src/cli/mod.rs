pub mod display;

use clap::{Parser, Subcommand};
use todolist_core::config::ConfigOverrides;
use todolist_core::view::ViewKind;

#[derive(Parser, Debug)]
#[command(name = "todolist", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: todolist add "Buy milk"
    /// Example: todolist add "Call Sam" --deadline "2025-01-03 09:30"
    Add {
        text: Option<String>,
        /// Deadline as RFC 3339 or local "YYYY-MM-DD[ HH:MM[:SS]]"
        #[arg(short, long)]
        deadline: Option<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: todolist done 1735900000000
    Done { id: u64 },
    /// Mark a completed task as not completed
    ///
    /// Example: todolist undo 1735900000000
    Undo { id: u64 },
    /// Flip a task between completed and not completed
    ///
    /// Example: todolist toggle 1735900000000
    Toggle { id: u64 },
    /// Delete a task
    ///
    /// Example: todolist delete 1735900000000
    Delete { id: u64 },
    /// Show details of a task
    ///
    /// Example: todolist show 1735900000000
    Show { id: u64 },
    /// List tasks
    ///
    /// Example: todolist list
    /// Example: todolist list completed --sort name
    List {
        #[command(subcommand)]
        view: Option<ListCommand>,
        /// deadline, added, completed-date or name
        #[arg(long, global = true)]
        sort: Option<String>,
    },
    /// Show recent activity, newest first
    ///
    /// Example: todolist history --type completed --date 2025-01-03
    History {
        /// added, completed, uncompleted, deleted or all
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
        /// Local calendar day
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    /// Tasks that are not completed (default)
    Tasks,
    /// Completed tasks
    Completed,
    /// Open tasks with a deadline still ahead
    Upcoming,
    /// Open tasks past their deadline
    Overdue,
    /// Every task
    All,
}

impl ListCommand {
    pub fn view(self) -> ViewKind {
        match self {
            Self::Tasks => ViewKind::Tasks,
            Self::Completed => ViewKind::Completed,
            Self::Upcoming => ViewKind::Upcoming,
            Self::Overdue => ViewKind::Overdue,
            Self::All => ViewKind::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    HistoryLimit,
    Sort,
    CompletedSort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "history_limit" => ConfigOverrideTarget::HistoryLimit,
        "sort" => ConfigOverrideTarget::Sort,
        "completed_sort" => ConfigOverrideTarget::CompletedSort,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` argument into one set of overrides.
/// Later arguments win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::HistoryLimit => {
                let limit = parsed
                    .value
                    .parse::<usize>()
                    .ok()
                    .filter(|limit| *limit > 0)
                    .ok_or_else(|| "history_limit must be a positive integer".to_string())?;
                overrides.history_limit = Some(limit);
            }
            ConfigOverrideTarget::Sort => overrides.sort = Some(parsed.value),
            ConfigOverrideTarget::CompletedSort => overrides.completed_sort = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, ConfigOverrideTarget, ListCommand, collect_config_overrides,
        parse_config_override,
    };
    use clap::Parser;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" THEME = Midnight ").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::Theme);
        assert_eq!(parsed.value, "Midnight");

        let parsed = parse_config_override("History-Limit=12").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::HistoryLimit);
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown.field=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("themenoir").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_key() {
        let err = parse_config_override(" = noir").unwrap_err();
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn collect_config_overrides_last_one_wins() {
        let raw = vec![
            "sort=name".to_string(),
            "completed_sort=added".to_string(),
            "sort=deadline".to_string(),
            "history_limit=7".to_string(),
        ];

        let overrides = collect_config_overrides(&raw).unwrap();
        assert_eq!(overrides.sort.as_deref(), Some("deadline"));
        assert_eq!(overrides.completed_sort.as_deref(), Some("added"));
        assert_eq!(overrides.history_limit, Some(7));
        assert_eq!(overrides.theme, None);
    }

    #[test]
    fn collect_config_overrides_rejects_bad_limit() {
        let err = collect_config_overrides(&["history_limit=lots".to_string()]).unwrap_err();
        assert!(err.contains("history_limit"));

        let err = collect_config_overrides(&["history_limit=0".to_string()]).unwrap_err();
        assert!(err.contains("positive"));
    }

    #[test]
    fn list_accepts_sort_after_view() {
        let cli = Cli::try_parse_from(["todolist", "list", "completed", "--sort", "name"]).unwrap();
        match cli.command {
            Command::List { view, sort } => {
                assert_eq!(view, Some(ListCommand::Completed));
                assert_eq!(sort.as_deref(), Some("name"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ids_must_be_numeric() {
        assert!(Cli::try_parse_from(["todolist", "done", "abc"]).is_err());
    }
}
