//! Named databases.
//!
//! Databases are addressed by name, the file stem of their `.jsondb` file. The
//! registry is a plain `.paths` file in the jsondb home with one absolute path
//! per line; names must be unique across it.

use crate::error::{DbError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PATHS_FILENAME: &str = ".paths";
pub const DB_EXTENSION: &str = "jsondb";

pub struct Registry {
    home: PathBuf,
}

/// The name a database file is registered under.
pub fn db_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Registry {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    fn paths_file(&self) -> PathBuf {
        self.home.join(PATHS_FILENAME)
    }

    /// Creates the home directory and an empty `.paths` file if missing.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.home)?;
        let file = self.paths_file();
        if !file.exists() {
            fs::write(&file, "")?;
        }
        Ok(())
    }

    /// Registered paths in registration order.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let file = self.paths_file();
        if !file.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(file)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    /// Looks a database up by name.
    pub fn find(&self, name: &str) -> Result<PathBuf> {
        self.list()?
            .into_iter()
            .find(|p| db_name(p) == name)
            .ok_or_else(|| DbError::Registry(format!("The database {} is not registered", name)))
    }

    /// Adds a database file. Relative paths are made absolute first.
    pub fn register(&self, path: &Path) -> Result<PathBuf> {
        let name = db_name(path);
        if name.is_empty() {
            return Err(DbError::Registry(format!(
                "'{}' is not a database file path",
                path.display()
            )));
        }
        let mut paths = self.list()?;
        if paths.iter().any(|p| db_name(p) == name) {
            return Err(DbError::Registry(format!(
                "A database called '{}' is already registered",
                name
            )));
        }

        let absolute = absolute_path(path)?;
        paths.push(absolute.clone());
        self.write(&paths)?;
        debug!(name = %name, path = %absolute.display(), "registered database");
        Ok(absolute)
    }

    /// Removes a database by name. The file itself is left alone.
    pub fn unregister(&self, name: &str) -> Result<PathBuf> {
        let mut paths = self.list()?;
        let index = paths
            .iter()
            .position(|p| db_name(p) == name)
            .ok_or_else(|| DbError::Registry(format!("The database {} wasn't registered", name)))?;
        let removed = paths.remove(index);
        self.write(&paths)?;
        debug!(name = %name, "unregistered database");
        Ok(removed)
    }

    fn write(&self, paths: &[PathBuf]) -> Result<()> {
        fs::create_dir_all(&self.home)?;
        let mut content = String::new();
        for path in paths {
            content.push_str(&path.to_string_lossy());
            content.push('\n');
        }
        fs::write(self.paths_file(), content)?;
        Ok(())
    }
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_when_missing() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path().join("home"));
        assert!(registry.list().unwrap().is_empty());
        assert!(matches!(registry.find("x"), Err(DbError::Registry(_))));
    }

    #[test]
    fn register_find_unregister() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());
        registry.ensure().unwrap();

        let db = dir.path().join("books.jsondb");
        fs::write(&db, "").unwrap();
        let registered = registry.register(&db).unwrap();

        assert!(registered.is_absolute());
        assert_eq!(registry.find("books").unwrap(), registered);
        assert_eq!(registry.list().unwrap(), vec![registered.clone()]);

        assert_eq!(registry.unregister("books").unwrap(), registered);
        assert!(registry.list().unwrap().is_empty());
        assert!(db.exists());
    }

    #[test]
    fn names_are_unique() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());
        registry.register(&dir.path().join("a/books.jsondb")).unwrap();
        let err = registry
            .register(&dir.path().join("b/books.jsondb"))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn unregister_unknown_name() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());
        assert!(matches!(
            registry.unregister("nope"),
            Err(DbError::Registry(_))
        ));
    }

    #[test]
    fn keeps_registration_order() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());
        registry.register(&dir.path().join("b.jsondb")).unwrap();
        registry.register(&dir.path().join("a.jsondb")).unwrap();
        let names: Vec<String> = registry.list().unwrap().iter().map(|p| db_name(p)).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
