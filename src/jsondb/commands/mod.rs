//! # Command Layer
//!
//! One module per subcommand. Each `run` function takes the store (or the
//! registry) it works on plus already-parsed arguments, performs the
//! operation, and returns a [`CmdResult`]. Nothing here prints; the CLI
//! decides how results and messages are shown.

use crate::error::{DbError, Result};
use crate::model::{Record, RecordId};
use crate::store::StoreInfo;
use std::path::PathBuf;

pub mod databases;
pub mod edit;
pub mod format;
pub mod id;
pub mod info;
pub mod init;
pub mod modify;
pub mod query;
pub mod set;
pub mod unset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Records created, changed or removed.
    pub records: Vec<Record>,
    /// Ids produced by searches.
    pub ids: Vec<RecordId>,
    pub info: Option<StoreInfo>,
    /// Rendered text meant for stdout.
    pub output: Option<String>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn with_ids(mut self, ids: Vec<RecordId>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_info(mut self, info: StoreInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_output(mut self, output: String) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }
}

/// Parses a comma separated id list such as `0,2, 5`. Blank input is an
/// empty list, so the empty output of a query can be piped on.
pub fn parse_id_list(input: &str) -> Result<Vec<RecordId>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(str::trim)
        .map(|part| {
            part.parse::<RecordId>().map_err(|_| {
                DbError::Validation(format!("Index {} is not a valid integer", part))
            })
        })
        .collect()
}

/// Joins ids the way `query` and `id` print them.
pub fn join_ids(ids: &[RecordId]) -> String {
    ids.iter()
        .map(RecordId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
