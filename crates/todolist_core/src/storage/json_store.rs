use super::KeyValueStore;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 2;
const STORE_FILE_NAME: &str = "storage.json";
const STORE_ENV_VAR: &str = "TODOLIST_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredArea {
    #[serde(default = "legacy_schema_version")]
    schema_version: u32,
    #[serde(flatten)]
    entries: Map<String, Value>,
}

fn legacy_schema_version() -> u32 {
    1
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("todolist").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todolist")
            .join(STORE_FILE_NAME))
    }
}

/// A storage area persisted as a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, AppError> {
        let mut entries = load_area(&self.path)?;
        Ok(keys
            .iter()
            .filter_map(|key| entries.remove(*key).map(|value| (key.to_string(), value)))
            .collect())
    }

    fn set(&mut self, entries: Map<String, Value>) -> Result<(), AppError> {
        let mut area = load_area(&self.path)?;
        area.extend(entries);
        save_area(&self.path, area)
    }
}

fn load_area(path: &Path) -> Result<Map<String, Value>, AppError> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    let stored: StoredArea = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored.entries)
}

fn save_area(path: &Path, entries: Map<String, Value>) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let stored = StoredArea {
        schema_version: SCHEMA_VERSION,
        entries,
    };
    let content = serde_json::to_string_pretty(&stored)?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    std::fs::write(&staging, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&staging, permissions)?;
    }

    std::fs::rename(&staging, path)?;
    tracing::debug!(path = %path.display(), "storage area written");

    Ok(())
}
