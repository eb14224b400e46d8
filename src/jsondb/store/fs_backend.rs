use super::backend::StorageBackend;
use crate::error::{DbError, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_BACKUP_KEEP_COUNT: usize = 20;
const BACKUP_EXT: &str = "jsondb";

/// File-based backend: one JSON document per database, backups in a hidden
/// sibling directory `.jsondb_backups_<stem>`.
pub struct FsBackend {
    path: PathBuf,
    keep_backups: usize,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep_backups: DEFAULT_BACKUP_KEEP_COUNT,
        }
    }

    pub fn with_backup_keep_count(mut self, keep: usize) -> Self {
        self.keep_backups = keep;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "jsondb".to_string())
    }

    fn parent(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Directory holding this database's backups.
    pub fn backup_dir(&self) -> PathBuf {
        self.parent().join(format!(".jsondb_backups_{}", self.stem()))
    }

    fn backup_prefix(&self) -> String {
        format!(".jsondb_backup_{}_", self.stem())
    }

    /// Lists backup files, oldest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let dir = self.backup_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = self.backup_prefix();
        let mut found: Vec<((i64, u32), PathBuf)> = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if let Some(key) = parse_backup_name(name, &prefix) {
                found.push((key, path));
            }
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found.into_iter().map(|(_, p)| p).collect())
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        if backups.len() <= self.keep_backups {
            return Ok(());
        }
        let excess = backups.len() - self.keep_backups;
        for path in backups.into_iter().take(excess) {
            debug!(path = %path.display(), "pruning backup");
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "failed to prune backup");
            }
        }
        Ok(())
    }
}

/// Sort key for `<prefix><ts>[_<n>].jsondb`.
fn parse_backup_name(name: &str, prefix: &str) -> Option<(i64, u32)> {
    let rest = name.strip_prefix(prefix)?;
    let rest = rest.strip_suffix(&format!(".{}", BACKUP_EXT))?;
    let (ts, n) = match rest.split_once('_') {
        Some((ts, n)) => (ts, n.parse().ok()?),
        None => (rest, 0),
    };
    Some((ts.parse().ok()?, n))
}

impl StorageBackend for FsBackend {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(DbError::Io)?;
        debug!(path = %self.path.display(), bytes = content.len(), "loaded database");
        Ok(Some(content))
    }

    fn save(&self, content: &str) -> Result<()> {
        let dir = self.parent();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(DbError::Io)?;
        }

        let tmp_file = dir.join(format!(".{}-{}.tmp", self.stem(), Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(DbError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(DbError::Io(e));
        }
        debug!(path = %self.path.display(), bytes = content.len(), "saved database");
        Ok(())
    }

    fn backup(&self, previous: &str) -> Result<()> {
        let dir = self.backup_dir();
        fs::create_dir_all(&dir).map_err(DbError::Io)?;

        let timestamp = Utc::now().timestamp();
        let prefix = self.backup_prefix();
        let mut target = dir.join(format!("{}{}.{}", prefix, timestamp, BACKUP_EXT));
        let mut n = 1;
        while target.exists() {
            target = dir.join(format!("{}{}_{}.{}", prefix, timestamp, n, BACKUP_EXT));
            n += 1;
        }

        fs::write(&target, previous).map_err(DbError::Io)?;
        debug!(path = %target.display(), "wrote backup");
        self.prune_backups()
    }

    fn location(&self) -> PathBuf {
        fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsBackend) {
        let dir = TempDir::new().unwrap();
        let backend = FsBackend::new(dir.path().join("books.jsondb"));
        (dir, backend)
    }

    #[test]
    fn load_missing_file_is_none() {
        let (_dir, backend) = setup();
        assert!(!backend.exists());
        assert_eq!(backend.load().unwrap(), None);
    }

    #[test]
    fn save_then_load() {
        let (_dir, backend) = setup();
        backend.save("{\"a\":1}").unwrap();
        assert!(backend.exists());
        assert_eq!(backend.load().unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn save_leaves_no_tmp_files() {
        let (dir, backend) = setup();
        backend.save("one").unwrap();
        backend.save("two").unwrap();
        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().into_owned();
            assert!(!name.ends_with(".tmp"), "leftover tmp file: {}", name);
        }
    }

    #[test]
    fn backups_live_in_sibling_dir() {
        let (dir, backend) = setup();
        backend.backup("old contents").unwrap();

        let backup_dir = dir.path().join(".jsondb_backups_books");
        assert_eq!(backend.backup_dir(), backup_dir);
        let backups = backend.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "old contents");
        let name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".jsondb_backup_books_"));
        assert!(name.ends_with(".jsondb"));
    }

    #[test]
    fn backups_are_pruned_oldest_first() {
        let (_dir, backend) = setup();
        let backend = backend.with_backup_keep_count(2);
        backend.backup("1").unwrap();
        backend.backup("2").unwrap();
        backend.backup("3").unwrap();

        let backups = backend.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        let contents: Vec<String> = backups
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn parses_backup_names() {
        let prefix = ".jsondb_backup_db_";
        assert_eq!(
            parse_backup_name(".jsondb_backup_db_100.jsondb", prefix),
            Some((100, 0))
        );
        assert_eq!(
            parse_backup_name(".jsondb_backup_db_100_3.jsondb", prefix),
            Some((100, 3))
        );
        assert_eq!(parse_backup_name("junk.jsondb", prefix), None);
    }
}
