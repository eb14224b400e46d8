//! Dispatch and per-command handlers.
//!
//! - `run()`: parse, set up logging and the context, dispatch
//! - `handle_db_command()`: everything that works on one open database; the
//!   shell reuses it
//! - `handle_*()`: registry-level commands

use super::browse::run_browse;
use super::print::{print_messages, render_info};
use super::setup::{Cli, Commands, DbCommand, FormatArgs, LogLevel};
use super::shell;
use clap::Parser;
use jsondb::api::DbApi;
use jsondb::commands::{join_ids, CmdResult};
use jsondb::config::DbConfig;
use jsondb::error::{DbError, Result};
use jsondb::init::DbContext;
use jsondb::store::StorageBackend;
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "JSONDB_LOG";

/// Where a database command was typed. The shell owns stdin, so commands run
/// from it may not read ids from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    TopLevel,
    Shell,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    let ctx = DbContext::initialize()?;
    debug!(command = ?cli.command, "dispatching");

    match cli.command.into_db_command() {
        Ok((name, command)) => {
            let mut api = ctx.open(&name)?;
            handle_db_command(&mut api, &ctx.config, command, Invocation::TopLevel)
        }
        Err(Commands::Init { name, path }) => handle_init(&ctx, &name, path.as_deref()),
        Err(Commands::Shell { name }) => shell::run(&ctx, &name),
        Err(Commands::Dbs) => handle_dbs(&ctx),
        Err(Commands::AddDb { path }) => handle_add_db(&ctx, &path),
        Err(Commands::RmDb { name }) => handle_rm_db(&ctx, &name),
        // database commands were split off above
        Err(_) => Ok(()),
    }
}

/// Logs go to stderr. `--log-level` wins over `JSONDB_LOG`; without either
/// only warnings and errors are shown.
fn initialize_tracing(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.to_filter_directive()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn handle_db_command<B: StorageBackend>(
    api: &mut DbApi<B>,
    config: &DbConfig,
    command: DbCommand,
    invocation: Invocation,
) -> Result<()> {
    let result = match command {
        DbCommand::Info(args) => {
            let result = api.info()?;
            if let Some(info) = &result.info {
                println!("{}", render_info(info, args.subject));
            }
            result
        }
        DbCommand::Modify(args) => api.modify(&args.to_change(), config.suppress_warnings)?,
        DbCommand::Set(args) => {
            let result = api.set(&args.data, &args.tags, &args.attrs)?;
            if let Some(record) = result.records.first() {
                println!("{}", record.id);
            }
            result
        }
        DbCommand::Unset(args) => api.unset(args.id)?,
        DbCommand::Edit(args) => api.edit(args.id, &args.to_patch()?)?,
        DbCommand::Id(args) => print_ids(api.find_id(&args.data, args.mode())?),
        DbCommand::Query(args) => {
            let result = api.query(&args.filters)?;
            println!("{}", join_ids(&result.ids));
            result
        }
        DbCommand::Format(args) => handle_format(api, args, invocation)?,
        DbCommand::Browse(args) => {
            let mut session = api.browse(args.filters, config.page_length);
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            run_browse(
                &mut session,
                &mut stdin.lock(),
                &mut stdout,
                !args.no_confirmation_prompt,
            )?;
            CmdResult::default()
        }
    };
    print_messages(&result.messages);
    Ok(())
}

fn print_ids(result: CmdResult) -> CmdResult {
    if !result.ids.is_empty() {
        println!("{}", join_ids(&result.ids));
    }
    result
}

fn handle_format<B: StorageBackend>(
    api: &DbApi<B>,
    args: FormatArgs,
    invocation: Invocation,
) -> Result<CmdResult> {
    let ids = match args.indices {
        Some(ids) => ids,
        None => read_ids_from_stdin(invocation)?,
    };
    let result = api.format(&ids, args.format.as_deref())?;
    if let Some(output) = result.output.as_deref().filter(|o| !o.is_empty()) {
        println!("{}", output);
    }
    Ok(result)
}

fn read_ids_from_stdin(invocation: Invocation) -> Result<String> {
    let stdin = std::io::stdin();
    if invocation == Invocation::Shell || stdin.is_terminal() {
        return Err(DbError::Validation(
            "No ids given. Pass them with -i or pipe them in on stdin".into(),
        ));
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line)
}

fn handle_init(ctx: &DbContext, name: &str, path: Option<&Path>) -> Result<()> {
    let result = ctx.init_db(name, path)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_dbs(ctx: &DbContext) -> Result<()> {
    let result = ctx.dbs()?;
    print_paths(&result.paths);
    print_messages(&result.messages);
    Ok(())
}

fn handle_add_db(ctx: &DbContext, path: &Path) -> Result<()> {
    let result = ctx.add_db(path)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_rm_db(ctx: &DbContext, name: &str) -> Result<()> {
    let result = ctx.rm_db(name)?;
    print_messages(&result.messages);
    Ok(())
}

fn print_paths(paths: &[PathBuf]) {
    for path in paths {
        println!("{}", path.display());
    }
}
