//! Runtime configuration for the room finder.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. [`FinderConfig::default`], matching the registrar's class-schedule export
//! 2. an optional JSON file ([`load_config_from_json`])
//! 3. environment variables ([`FinderConfig::apply_env`]):
//!    - `ROOM_FINDER_SCHEDULE`: path of the schedule file
//!    - `ROOM_FINDER_LOG`: default log filter when `RUST_LOG` is unset

use crate::error::ConfigError;
use crate::meeting::RequiredColumns;
use crate::normalize::REMOTE_ONLY;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const SCHEDULE_ENV: &str = "ROOM_FINDER_SCHEDULE";
pub const LOG_ENV: &str = "ROOM_FINDER_LOG";

/// Source column names for the fields the normalizer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub crn: String,
    pub room: String,
    pub activity: String,
    pub days: String,
    pub time: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            crn: "CRN".to_string(),
            room: "Bldg/Rm".to_string(),
            activity: "Actv".to_string(),
            days: "Days".to_string(),
            time: "Time".to_string(),
        }
    }
}

impl ColumnMapping {
    pub fn names(&self) -> [&str; 5] {
        [
            self.crn.as_str(),
            self.room.as_str(),
            self.activity.as_str(),
            self.days.as_str(),
            self.time.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub schedule_path: PathBuf,
    pub log_level: String,
    pub columns: ColumnMapping,
    /// Room value marking online sections, checked alongside `REMOTE ONLY`.
    pub remote_sentinel: String,
    /// Activities dropped in addition to `LAB`.
    pub excluded_activities: Vec<String>,
    /// `"all"` (default) or `{ "only": [..] }`.
    pub required_columns: RequiredColumns,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            schedule_path: PathBuf::from("class_schedule.xlsx"),
            log_level: "warn".to_string(),
            columns: ColumnMapping::default(),
            remote_sentinel: REMOTE_ONLY.to_string(),
            excluded_activities: Vec::new(),
            required_columns: RequiredColumns::All,
        }
    }
}

impl FinderConfig {
    /// Overlays environment variables on top of the current values.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(SCHEDULE_ENV).filter(|v| !v.trim().is_empty()) {
            self.schedule_path = PathBuf::from(path);
        }
        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for name in self.columns.names() {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("column names must not be empty".into()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Invalid(format!(
                    "column '{name}' is mapped to more than one field"
                )));
            }
        }
        if self.remote_sentinel.trim().is_empty() {
            return Err(ConfigError::Invalid("remote_sentinel must not be empty".into()));
        }
        Ok(())
    }
}

pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> Result<FinderConfig, ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: FinderConfig = serde_json::from_reader(file)?;
    config.validate()?;
    Ok(config)
}
