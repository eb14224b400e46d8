//! Process-level setup: where the jsondb home is, what the tool-wide config
//! says, and how a database name turns into an open [`DbApi`].
//!
//! The home is `$JSONDB_HOME` when set, otherwise `<Documents>/jsondb` (via
//! the `directories` crate). It holds `config.json` and the `.paths` registry.

use crate::api::DbApi;
use crate::commands::{self, CmdResult};
use crate::config::{resolve_home, DbConfig};
use crate::error::{DbError, Result};
use crate::registry::Registry;
use crate::store::fs_backend::FsBackend;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct DbContext {
    pub config: DbConfig,
    pub registry: Registry,
}

impl DbContext {
    /// Resolves the home directory and loads the config with environment
    /// overrides applied.
    pub fn initialize() -> Result<Self> {
        Self::with_home(resolve_home()?)
    }

    pub fn with_home(home: PathBuf) -> Result<Self> {
        let config = DbConfig::load_with_env(&home)?;
        debug!(home = %home.display(), ?config, "initialized context");
        Ok(Self {
            config,
            registry: Registry::new(home),
        })
    }

    pub fn home(&self) -> &Path {
        self.registry.home()
    }

    /// Path of a registered database, checked to exist on disk.
    pub fn database_path(&self, name: &str) -> Result<PathBuf> {
        let path = self.registry.find(name)?;
        if !path.exists() {
            return Err(DbError::PersistedState(format!(
                "The registered database {} at {} doesn't exist",
                name,
                path.display()
            )));
        }
        Ok(path)
    }

    pub fn open(&self, name: &str) -> Result<DbApi<FsBackend>> {
        let path = self.database_path(name)?;
        let backend = FsBackend::new(path).with_backup_keep_count(self.config.backup_keep_count);
        DbApi::open(backend)
    }

    pub fn init_db(&self, name: &str, dir: Option<&Path>) -> Result<CmdResult> {
        commands::init::run(&self.registry, name, dir)
    }

    pub fn dbs(&self) -> Result<CmdResult> {
        commands::databases::list(&self.registry)
    }

    pub fn add_db(&self, path: &Path) -> Result<CmdResult> {
        commands::databases::add(&self.registry, path)
    }

    pub fn rm_db(&self, name: &str) -> Result<CmdResult> {
        commands::databases::remove(&self.registry, name)
    }
}
