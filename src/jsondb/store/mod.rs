//! # Storage Layer
//!
//! The whole database is one document, loaded into memory at open and
//! rewritten wholesale after every successful mutation (write-through).
//!
//! ## Pieces
//!
//! - [`RecordStore`]: the in-memory records plus settings. It is the only
//!   writer of persisted state; every mutation is computed on a copy, written,
//!   and only then made visible, so a failed operation leaves nothing behind.
//! - [`backend::StorageBackend`]: raw document I/O.
//!   - [`fs_backend::FsBackend`]: production, one `.jsondb` file per database
//!     with atomic replace and optional timestamped backups.
//!   - [`mem_backend::MemBackend`]: in-memory, for tests.
//! - [`document`]: the JSON document format.
//!
//! ## Concurrency
//!
//! There is no locking. Two processes mutating the same file race, and the
//! last writer wins.

pub mod backend;
pub mod document;
pub mod fs_backend;
pub mod mem_backend;
mod record_store;

pub use backend::StorageBackend;
pub use record_store::RecordStore;

use crate::model::{Record, RecordId, TagSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Store-wide configuration persisted alongside the records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// The registered tag list. Only consulted while `enforce_tags` is on.
    pub enforced_tags: TagSet,
    pub enforce_tags: bool,
    pub backups_enabled: bool,
}

impl StoreSettings {
    /// Tags from `tags` that may not be attached under the current settings.
    pub fn rejected_tags<'a, I>(&self, tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        if !self.enforce_tags {
            return Vec::new();
        }
        let mut rejected: Vec<String> = Vec::new();
        for tag in tags {
            if !self.enforced_tags.contains(tag) && !rejected.contains(tag) {
                rejected.push(tag.clone());
            }
        }
        rejected
    }
}

/// Everything that gets persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub settings: StoreSettings,
    pub records: BTreeMap<RecordId, Record>,
    pub next_id: RecordId,
}

/// A batch of settings changes applied as one write.
///
/// Order: add tags, remove tags, clear tags, then the two switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
    pub clear_tags: bool,
    pub enforce_tags: Option<bool>,
    pub backups_enabled: Option<bool>,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        self.add_tags.is_empty()
            && self.remove_tags.is_empty()
            && !self.clear_tags
            && self.enforce_tags.is_none()
            && self.backups_enabled.is_none()
    }

    pub(crate) fn apply_to(&self, settings: &mut StoreSettings) {
        for tag in &self.add_tags {
            settings.enforced_tags.insert(tag.clone());
        }
        for tag in &self.remove_tags {
            settings.enforced_tags.remove(tag);
        }
        if self.clear_tags {
            settings.enforced_tags.clear();
        }
        if let Some(on) = self.enforce_tags {
            settings.enforce_tags = on;
        }
        if let Some(on) = self.backups_enabled {
            settings.backups_enabled = on;
        }
    }
}

/// Read-only summary of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    /// Union of the tags attached to records, in first-seen order by id.
    pub tag_universe: Vec<String>,
    pub enforced_tags: Vec<String>,
    pub size: usize,
    pub byte_size: usize,
    pub path: PathBuf,
    pub backups_enabled: bool,
    pub tags_enforced: bool,
}
