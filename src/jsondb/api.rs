//! # API Facade
//!
//! A thin facade over the command layer for one open database. It:
//! - **Dispatches** to the matching `commands::<cmd>::run`
//! - **Normalizes inputs** (id lists and format strings arrive as text)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and holds no business logic.
//!
//! `DbApi<B: StorageBackend>` is generic over the storage backend:
//! `DbApi<FsBackend>` in production, `DbApi<MemBackend>` in tests.
//!
//! Registry-level operations (`init`, `dbs`, `add-db`, `rm-db`) work before a
//! database is open and live on [`crate::init::DbContext`].

use crate::browse::BrowseSession;
use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::model::{RecordId, RecordPatch};
use crate::query::FindMode;
use crate::store::{RecordStore, SettingsChange, StorageBackend};
use crate::template::Template;

pub use crate::commands::{CmdMessage, MessageLevel};

pub struct DbApi<B: StorageBackend> {
    store: RecordStore<B>,
}

impl<B: StorageBackend> DbApi<B> {
    pub fn new(store: RecordStore<B>) -> Self {
        Self { store }
    }

    /// Loads the store from `backend`.
    pub fn open(backend: B) -> Result<Self> {
        Ok(Self::new(RecordStore::open(backend)?))
    }

    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    pub fn info(&self) -> Result<CmdResult> {
        commands::info::run(&self.store)
    }

    pub fn modify(&mut self, change: &SettingsChange, suppress_warnings: bool) -> Result<CmdResult> {
        commands::modify::run(&mut self.store, change, suppress_warnings)
    }

    pub fn set(&mut self, data: &str, tags: &[String], attrs: &[String]) -> Result<CmdResult> {
        commands::set::run(&mut self.store, data, tags, attrs)
    }

    pub fn unset(&mut self, id: RecordId) -> Result<CmdResult> {
        commands::unset::run(&mut self.store, id)
    }

    pub fn edit(&mut self, id: RecordId, patch: &RecordPatch) -> Result<CmdResult> {
        commands::edit::run(&mut self.store, id, patch)
    }

    pub fn find_id(&self, needle: &str, mode: FindMode) -> Result<CmdResult> {
        commands::id::run(&self.store, needle, mode)
    }

    pub fn query(&self, filter: &[String]) -> Result<CmdResult> {
        commands::query::run(&self.store, filter)
    }

    /// Renders records given as a comma separated id list. `format` defaults
    /// to the built-in template.
    pub fn format(&self, ids: &str, format: Option<&str>) -> Result<CmdResult> {
        let ids = commands::parse_id_list(ids)?;
        match format {
            Some(source) => commands::format::run(&self.store, &ids, &Template::parse(source)?),
            None => commands::format::run(&self.store, &ids, Template::default_template()),
        }
    }

    /// Starts an interactive browse session over this database.
    pub fn browse(&mut self, filter: Vec<String>, page_length: usize) -> BrowseSession<'_, B> {
        BrowseSession::new(&mut self.store, filter).with_page_length(page_length)
    }
}
