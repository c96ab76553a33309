use crate::error::AppError;
use crate::history::HISTORY_LIMIT;
use crate::view::{DueStatus, SortKind, ViewKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TODOLIST_CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }

    /// Urgent bands get the accent colour, the rest are muted.
    pub fn due_status(&self, status: DueStatus) -> String {
        if status.is_urgent() {
            self.accentize(status.as_str())
        } else {
            self.mutedize(status.as_str())
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
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
        return Some("default".into());
    }

    match trimmed {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub history_limit: Option<usize>,
    /// Sort for every view except `completed`.
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub completed_sort: Option<String>,
}

impl Config {
    /// Never below one: the entry for the action just taken is always kept.
    pub fn history_limit(&self) -> usize {
        self.history_limit.unwrap_or(HISTORY_LIMIT).max(1)
    }

    /// The configured sort for `view`, falling back to deadline order for
    /// open tasks and completion order for finished ones.
    pub fn sort_for(&self, view: ViewKind) -> SortKind {
        match view {
            ViewKind::Completed => self
                .completed_sort
                .as_deref()
                .map(SortKind::from)
                .unwrap_or(SortKind::CompletedDate),
            _ => self
                .sort
                .as_deref()
                .map(SortKind::from)
                .unwrap_or(SortKind::Deadline),
        }
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub history_limit: Option<usize>,
    pub sort: Option<String>,
    pub completed_sort: Option<String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("todolist")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todolist")
            .join(CONFIG_FILE_NAME))
    }
}

/// Loads the config file, falling back to defaults on any problem. The
/// problem is logged and returned alongside so callers can report it.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => {
            tracing::warn!(error = %err, "cannot resolve config path, using defaults");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "unreadable config, using defaults");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config(config))
}

fn normalize_config(mut config: Config) -> Config {
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    if config.history_limit == Some(0) {
        tracing::warn!("history_limit of 0 in config, keeping 1 entry");
        config.history_limit = Some(1);
    }
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }
    if let Some(limit) = overrides.history_limit {
        merged.history_limit = Some(limit);
    }
    if let Some(sort) = overrides.sort.as_ref() {
        merged.sort = Some(sort.clone());
    }
    if let Some(sort) = overrides.completed_sort.as_ref() {
        merged.completed_sort = Some(sort.clone());
    }

    merged
}
