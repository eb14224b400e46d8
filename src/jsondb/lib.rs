//! # jsondb Architecture
//!
//! jsondb is a small record store kept in a single JSON file: each record has
//! free-text data, a set of tags and a flat attribute map, and the whole file
//! is loaded into memory and rewritten on every change. The library holds all
//! of the logic; the `jsondb` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - Drives browse sessions and the shell REPL                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs, init.rs)                                │
//! │  - Thin facade over commands, one method per subcommand     │
//! │  - Resolves database names through the registry             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per subcommand, returns CmdResult             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (store/, query.rs, template/, browse.rs)              │
//! │  - RecordStore: the single writer of persisted state        │
//! │  - Tag filters and data search                              │
//! │  - Format templates                                         │
//! │  - The browse state machine                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` inward nothing writes to stdout/stderr, reads stdin, or exits
//! the process. Logging goes through `tracing`; the binary decides where it
//! ends up.
//!
//! ## Guarantees
//!
//! - Ids are assigned from a persisted counter and never reused, even after
//!   deletes. Deleting never renumbers.
//! - Every mutation is all-or-nothing. It is computed on a copy of the state,
//!   written, and only then made visible.
//! - With tag enforcement on, only registered tags can be newly attached.
//!
//! ## Module Overview
//!
//! - [`api`]: facade over an open database
//! - [`init`]: home directory, config and name resolution
//! - [`commands`]: per-subcommand logic
//! - [`store`]: `RecordStore`, backends and the document format
//! - [`query`]: conjunctive tag filters and `find_id`
//! - [`template`]: the `%id`/`%data`/`%tags`/`%attrs` format language
//! - [`browse`]: the interactive browse state machine
//! - [`model`], [`tags`]: record types and validation
//! - [`registry`]: the `.paths` database registry
//! - [`config`]: tool-wide settings
//! - [`error`]: error types
//! - `cli`: argument parsing and terminal I/O for the binary (not part of the lib API)

pub mod api;
pub mod browse;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod query;
pub mod registry;
pub mod store;
pub mod tags;
pub mod template;
