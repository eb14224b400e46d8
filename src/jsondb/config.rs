use crate::error::{DbError, Result};
use crate::store::fs_backend::DEFAULT_BACKUP_KEEP_COUNT;
use directories::{BaseDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_PAGE_LENGTH: usize = crate::browse::DEFAULT_PAGE_LENGTH;

pub const HOME_ENV: &str = "JSONDB_HOME";
pub const BACKUP_KEEP_COUNT_ENV: &str = "JSONDB_BACKUP_KEEP_COUNT";
pub const SUPPRESS_WARNINGS_ENV: &str = "JSONDB_SUPPRESS_WARNINGS";
pub const PAGE_LENGTH_ENV: &str = "JSONDB_PAGE_LENGTH";

/// Tool-wide settings, stored in `<home>/config.json`.
///
/// Per-database settings (enforced tags, backups) live in the database
/// document itself, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbConfig {
    /// How many backups to keep per database.
    #[serde(default = "default_backup_keep_count")]
    pub backup_keep_count: usize,

    #[serde(default)]
    pub suppress_warnings: bool,

    /// Rows per page in `browse`.
    #[serde(default = "default_page_length")]
    pub page_length: usize,
}

fn default_backup_keep_count() -> usize {
    DEFAULT_BACKUP_KEEP_COUNT
}

fn default_page_length() -> usize {
    DEFAULT_PAGE_LENGTH
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backup_keep_count: DEFAULT_BACKUP_KEEP_COUNT,
            suppress_warnings: false,
            page_length: DEFAULT_PAGE_LENGTH,
        }
    }
}

impl DbConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: DbConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads the file and applies the process environment on top.
    pub fn load_with_env<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let mut config = Self::load(config_dir)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overrides fields from environment variables, looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var(BACKUP_KEEP_COUNT_ENV) {
            self.backup_keep_count = parse_count(BACKUP_KEEP_COUNT_ENV, &value)?;
        }
        if let Some(value) = var(SUPPRESS_WARNINGS_ENV) {
            // Any non-empty value other than an explicit "off" suppresses.
            let value = value.trim().to_lowercase();
            self.suppress_warnings = !matches!(value.as_str(), "" | "0" | "false" | "no");
        }
        if let Some(value) = var(PAGE_LENGTH_ENV) {
            self.page_length = parse_count(PAGE_LENGTH_ENV, &value)?.max(1);
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| {
        DbError::Validation(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}

/// The jsondb home: `$JSONDB_HOME`, or `<Documents>/jsondb`.
pub fn resolve_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    if let Some(documents) = UserDirs::new().and_then(|u| u.document_dir().map(Path::to_path_buf)) {
        return Ok(documents.join("jsondb"));
    }
    BaseDirs::new()
        .map(|b| b.home_dir().join("Documents").join("jsondb"))
        .ok_or_else(|| {
            DbError::Registry(format!(
                "could not determine a home directory; set {}",
                HOME_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = DbConfig::default();
        assert_eq!(config.backup_keep_count, 20);
        assert_eq!(config.page_length, 10);
        assert!(!config.suppress_warnings);
    }

    #[test]
    fn load_missing_config() {
        let dir = tempdir().unwrap();
        assert_eq!(DbConfig::load(dir.path()).unwrap(), DbConfig::default());
    }

    #[test]
    fn load_full_file() {
        let dir = tempdir().unwrap();
        let config = DbConfig {
            backup_keep_count: 3,
            suppress_warnings: true,
            page_length: 25,
        };
        let content = serde_json::to_string_pretty(&config).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), content).unwrap();
        assert_eq!(DbConfig::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"page_length": 5}"#).unwrap();
        let config = DbConfig::load(dir.path()).unwrap();
        assert_eq!(config.page_length, 5);
        assert_eq!(config.backup_keep_count, 20);
    }

    #[test]
    fn env_overrides_file() {
        let mut config = DbConfig::default();
        config
            .apply_env(env(&[
                (BACKUP_KEEP_COUNT_ENV, "5"),
                (SUPPRESS_WARNINGS_ENV, "1"),
                (PAGE_LENGTH_ENV, "0"),
            ]))
            .unwrap();
        assert_eq!(config.backup_keep_count, 5);
        assert!(config.suppress_warnings);
        assert_eq!(config.page_length, 1);
    }

    #[test]
    fn suppress_warnings_off_values() {
        let mut config = DbConfig::default();
        config.suppress_warnings = true;
        config.apply_env(env(&[(SUPPRESS_WARNINGS_ENV, "false")])).unwrap();
        assert!(!config.suppress_warnings);
    }

    #[test]
    fn bad_env_value_is_validation_error() {
        let mut config = DbConfig::default();
        let err = config
            .apply_env(env(&[(BACKUP_KEEP_COUNT_ENV, "lots")]))
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
