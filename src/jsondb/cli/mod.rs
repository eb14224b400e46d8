//! # CLI Layer
//!
//! One possible UI client for jsondb, and the only place that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Handles argument parsing
//! - Formats output for humans
//!
//! stdout carries only results meant for pipes (`query` ids, `format` lines,
//! `info` values, database paths). Messages and logs go to stderr, so
//! `jsondb query books -f scifi | jsondb format books` works.
//!
//! ## Module Structure
//!
//! - `setup`: clap definitions, shared by the top-level CLI and the shell
//! - `commands`: context setup, dispatch and per-command handlers
//! - `print`: output formatting (messages, info, browse views)
//! - `browse`: terminal driver for [`jsondb::browse::BrowseSession`]
//! - `shell`: the `shell NAME` REPL

mod browse;
mod commands;
mod print;
pub mod setup;
mod shell;

pub use commands::run;
