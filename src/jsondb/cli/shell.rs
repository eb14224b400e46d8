//! `jsondb shell <name>`: a REPL over one open database. Every database
//! subcommand works without the name argument.

use super::commands::{handle_db_command, Invocation};
use super::print::{print_messages, render_shell_help};
use super::setup::ShellLine;
use clap::Parser;
use jsondb::api::{CmdMessage, DbApi};
use jsondb::config::DbConfig;
use jsondb::error::Result;
use jsondb::init::DbContext;
use jsondb::store::StorageBackend;
use std::io::{BufRead, Write};
use tracing::debug;

/// What one input line asks the shell to do.
#[derive(Debug)]
enum ShellInput {
    Empty,
    Help,
    Exit,
    Command(ShellLine),
}

fn parse_line(line: &str) -> std::result::Result<ShellInput, String> {
    let words = shell_words::split(line).map_err(|e| format!("Could not parse line: {}", e))?;
    match words.first().map(String::as_str) {
        None => Ok(ShellInput::Empty),
        Some("help") if words.len() == 1 => Ok(ShellInput::Help),
        Some("exit" | "quit") => Ok(ShellInput::Exit),
        Some(_) => ShellLine::try_parse_from(&words)
            .map(ShellInput::Command)
            .map_err(|e| e.render().to_string()),
    }
}

pub fn run(ctx: &DbContext, name: &str) -> Result<()> {
    let mut api = ctx.open(name)?;
    let prompt = format!("({}) $ ", name);
    let stdin = std::io::stdin();

    loop {
        print!("{}", prompt);
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        if !step(&mut api, &ctx.config, name, &line) {
            return Ok(());
        }
    }
}

/// Handles one line. Returns false when the shell should end. Command errors
/// are reported and the shell keeps going.
fn step<B: StorageBackend>(api: &mut DbApi<B>, config: &DbConfig, name: &str, line: &str) -> bool {
    match parse_line(line) {
        Ok(ShellInput::Empty) => {}
        Ok(ShellInput::Help) => println!("{}", render_shell_help(name)),
        Ok(ShellInput::Exit) => return false,
        Ok(ShellInput::Command(parsed)) => {
            debug!(command = ?parsed.command, "shell command");
            if let Err(e) = handle_db_command(api, config, parsed.command, Invocation::Shell) {
                print_messages(&[CmdMessage::error(e.to_string())]);
            }
        }
        Err(message) => eprintln!("{}", message.trim_end()),
    }
    true
}
