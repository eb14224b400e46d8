//! # Browse Session
//!
//! The interactive browser as an explicit state machine. It knows nothing
//! about terminals: a driver feeds it one input line at a time and renders the
//! [`View`] it gets back. Tests drive it with scripted lines.
//!
//! ```text
//!            select id                 d
//!   Table ─────────────▶ Detail ───────────────▶ Table
//!     │  ▲  n / p          │  e/a/r/s/u/h (stay)
//!     │  └─────────────────┘  c
//!     │ e
//!     ▼
//!    Exit
//! ```
//!
//! A rejected command (unknown word, enforcement violation, bad attribute)
//! comes back as an error message and leaves the state where it was.

use crate::commands::CmdMessage;
use crate::error::{DbError, Result};
use crate::model::{parse_attr_pairs, Record, RecordId, RecordPatch};
use crate::store::{RecordStore, StorageBackend};

pub const DEFAULT_PAGE_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseState {
    Table,
    Detail(RecordId),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    Select(RecordId),
    Next,
    Previous,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailCommand {
    EditData(String),
    AddTags(Vec<String>),
    RemoveTags(Vec<String>),
    /// Raw `KEY:VALUE` entries, validated when applied.
    SetAttrs(Vec<String>),
    UnsetAttrs(Vec<String>),
    Delete,
    Cancel,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Table(TableCommand),
    Detail(DetailCommand),
}

impl TableCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let input = line.trim();
        if let Ok(id) = input.parse::<RecordId>() {
            return Ok(TableCommand::Select(id));
        }
        match input.to_lowercase().as_str() {
            "n" | "next" => Ok(TableCommand::Next),
            "p" | "prev" | "previous" => Ok(TableCommand::Previous),
            "e" | "exit" | "quit" => Ok(TableCommand::Exit),
            _ => Err(DbError::Validation(
                "Invalid input. Please enter either an ID to select, [N] for the next page, \
                 [P] for the previous page or [E] to exit."
                    .into(),
            )),
        }
    }
}

impl DetailCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let input = line.trim();
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (input, ""),
        };
        let args = || -> Vec<String> { rest.split_whitespace().map(String::from).collect() };
        let usage = |form: &str| DbError::Validation(format!("Usage: {}", form));

        match (word.to_lowercase().as_str(), rest.is_empty()) {
            ("e", false) => Ok(DetailCommand::EditData(rest.to_string())),
            ("a", false) => Ok(DetailCommand::AddTags(args())),
            ("a", true) => Err(usage("A <TAGS>")),
            ("r", false) => Ok(DetailCommand::RemoveTags(args())),
            ("r", true) => Err(usage("R <TAGS>")),
            ("s", false) => Ok(DetailCommand::SetAttrs(args())),
            ("s", true) => Err(usage("S <KEY:VALUE>...")),
            ("u", false) => Ok(DetailCommand::UnsetAttrs(args())),
            ("u", true) => Err(usage("U <KEYS>")),
            ("d" | "delete", true) => Ok(DetailCommand::Delete),
            ("c" | "cancel" | "e" | "exit" | "quit", true) => Ok(DetailCommand::Cancel),
            ("h" | "help", true) => Ok(DetailCommand::Help),
            _ => Err(DbError::Validation(format!(
                "Invalid command '{}'. Enter [H] for help.",
                input
            ))),
        }
    }
}

impl BrowseCommand {
    /// Parses a line in the vocabulary of `state`.
    pub fn parse(state: BrowseState, line: &str) -> Result<Self> {
        match state {
            BrowseState::Table => TableCommand::parse(line).map(BrowseCommand::Table),
            BrowseState::Detail(_) => DetailCommand::parse(line).map(BrowseCommand::Detail),
            BrowseState::Exit => Err(DbError::Validation("the session has ended".into())),
        }
    }
}

/// One page of the table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePage {
    /// Zero-based.
    pub page: usize,
    pub page_count: usize,
    pub rows: Vec<Record>,
    pub filter: Vec<String>,
    /// Width of the id column: at least 3, or the digits of the largest id.
    pub id_width: usize,
}

impl TablePage {
    pub fn contains(&self, id: RecordId) -> bool {
        self.rows.iter().any(|r| r.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Table(TablePage),
    Detail(Record),
    Help,
    Exit,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub view: View,
    pub message: Option<CmdMessage>,
}

pub struct BrowseSession<'s, B: StorageBackend> {
    store: &'s mut RecordStore<B>,
    filter: Vec<String>,
    page: usize,
    page_length: usize,
    state: BrowseState,
}

impl<'s, B: StorageBackend> BrowseSession<'s, B> {
    /// Starts on the first table page. `filter` is fixed for the session.
    pub fn new(store: &'s mut RecordStore<B>, filter: Vec<String>) -> Self {
        Self {
            store,
            filter,
            page: 0,
            page_length: DEFAULT_PAGE_LENGTH,
            state: BrowseState::Table,
        }
    }

    pub fn with_page_length(mut self, page_length: usize) -> Self {
        self.page_length = page_length.max(1);
        self
    }

    pub fn state(&self) -> BrowseState {
        self.state
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn store(&self) -> &RecordStore<B> {
        &*self.store
    }

    fn filtered_ids(&self) -> Vec<RecordId> {
        self.store.filter(&self.filter).iter().map(|r| r.id).collect()
    }

    fn page_count(&self) -> usize {
        self.filtered_ids().len().div_ceil(self.page_length).max(1)
    }

    fn table_page(&self) -> TablePage {
        let rows: Vec<Record> = self
            .store
            .filter(&self.filter)
            .into_iter()
            .skip(self.page * self.page_length)
            .take(self.page_length)
            .cloned()
            .collect();
        let largest = self.store.records().last().map(|r| r.id).unwrap_or(0);
        TablePage {
            page: self.page,
            page_count: self.page_count(),
            rows,
            filter: self.filter.clone(),
            id_width: largest.to_string().len().max(3),
        }
    }

    /// What the driver should show for the current state.
    pub fn view(&self) -> View {
        match self.state {
            BrowseState::Table => View::Table(self.table_page()),
            BrowseState::Detail(id) => match self.store.get(id) {
                Ok(record) => View::Detail(record.clone()),
                Err(_) => View::Table(self.table_page()),
            },
            BrowseState::Exit => View::Exit,
        }
    }

    /// Parses and applies one line of input.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match BrowseCommand::parse(self.state, line) {
            Ok(command) => self.apply(command),
            Err(e) => self.respond(Some(CmdMessage::error(e.to_string()))),
        }
    }

    pub fn apply(&mut self, command: BrowseCommand) -> Response {
        let outcome = match (self.state, command) {
            (BrowseState::Table, BrowseCommand::Table(cmd)) => self.apply_table(cmd),
            (BrowseState::Detail(_), BrowseCommand::Detail(DetailCommand::Help)) => {
                return Response {
                    view: View::Help,
                    message: None,
                };
            }
            (BrowseState::Detail(id), BrowseCommand::Detail(cmd)) => self.apply_detail(id, cmd),
            _ => Err(DbError::Validation(
                "that command is not available here".into(),
            )),
        };
        match outcome {
            Ok(message) => self.respond(message),
            Err(e) => self.respond(Some(CmdMessage::error(e.to_string()))),
        }
    }

    fn respond(&self, message: Option<CmdMessage>) -> Response {
        Response {
            view: self.view(),
            message,
        }
    }

    fn apply_table(&mut self, command: TableCommand) -> Result<Option<CmdMessage>> {
        match command {
            TableCommand::Next => {
                self.page = (self.page + 1).min(self.page_count() - 1);
            }
            TableCommand::Previous => {
                self.page = self.page.saturating_sub(1);
            }
            TableCommand::Exit => {
                self.state = BrowseState::Exit;
            }
            TableCommand::Select(id) => {
                if !self.table_page().contains(id) {
                    return Err(DbError::Validation(format!("Invalid ID {}.", id)));
                }
                self.state = BrowseState::Detail(id);
            }
        }
        Ok(None)
    }

    fn apply_detail(&mut self, id: RecordId, command: DetailCommand) -> Result<Option<CmdMessage>> {
        let patch = match command {
            DetailCommand::EditData(data) => RecordPatch::new().data(data),
            DetailCommand::AddTags(tags) => RecordPatch::new().add_tags(tags),
            DetailCommand::RemoveTags(tags) => RecordPatch::new().remove_tags(tags),
            DetailCommand::SetAttrs(entries) => {
                RecordPatch::new().set_attrs(parse_attr_pairs(&entries)?)
            }
            DetailCommand::UnsetAttrs(keys) => RecordPatch::new().unset_attrs(keys),
            DetailCommand::Delete => {
                self.store.delete(id)?;
                self.state = BrowseState::Table;
                self.page = self.page.min(self.page_count() - 1);
                return Ok(Some(CmdMessage::success(format!("Entry {} deleted", id))));
            }
            DetailCommand::Cancel => {
                self.state = BrowseState::Table;
                return Ok(None);
            }
            DetailCommand::Help => return Ok(None),
        };
        self.store.update(id, &patch)?;
        Ok(Some(CmdMessage::success(format!("Entry {} updated", id))))
    }
}
