use clap::{Args, Parser, Subcommand, ValueEnum};
use jsondb::error::Result;
use jsondb::model::{parse_attr_pairs, RecordId, RecordPatch};
use jsondb::query::FindMode;
use jsondb::store::SettingsChange;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.0" for releases, "0.3.0@abc1234 2024-01-15" for dev builds
pub fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("JSONDB_GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("JSONDB_COMMIT_DATE");
    const IS_RELEASE: &str = env!("JSONDB_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "jsondb", bin_name = "jsondb", version = get_version())]
#[command(
    about = "Manage small, handy, tag-aware databases",
    long_about = "Manage small, handy, tag-aware databases.\n\n\
        Supported environment variables:\n\
        - JSONDB_HOME (where config.json and the database registry live)\n\
        - JSONDB_SUPPRESS_WARNINGS (suppress all warnings)\n\
        - JSONDB_BACKUP_KEEP_COUNT (how many backups to keep per database)\n\
        - JSONDB_PAGE_LENGTH (rows per page in browse)\n\
        - JSONDB_LOG (log filter, overridden by --log-level)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (logs go to stderr) [default: warn]
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new database
    Init {
        /// The name of the database (without the .jsondb extension)
        name: String,

        /// The directory where the database should be created
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Obtain information about a database
    Info {
        name: String,
        #[command(flatten)]
        args: InfoArgs,
    },

    /// Modify the settings of a database
    Modify {
        name: String,
        #[command(flatten)]
        args: ModifyArgs,
    },

    /// Add a new entry to a database
    Set {
        name: String,
        #[command(flatten)]
        args: SetArgs,
    },

    /// Delete an entry by its id
    Unset {
        name: String,
        #[command(flatten)]
        args: UnsetArgs,
    },

    /// Edit an entry
    Edit {
        name: String,
        #[command(flatten)]
        args: EditArgs,
    },

    /// Get the ids of the entries whose data matches
    Id {
        name: String,
        #[command(flatten)]
        args: IdArgs,
    },

    /// List the ids of all entries carrying every given tag, comma separated
    #[command(
        long_about = "List the ids of all entries carrying every given tag, comma separated, \
            so they can be fed into the format subcommand.\n\n\
            Example: jsondb query books -f scifi | jsondb format books"
    )]
    Query {
        name: String,
        #[command(flatten)]
        args: QueryArgs,
    },

    /// Output entries one per line using a format string
    Format {
        name: String,
        #[command(flatten)]
        args: FormatArgs,
    },

    /// Browse a database interactively
    Browse {
        name: String,
        #[command(flatten)]
        args: BrowseArgs,
    },

    /// Enter a REPL where all commands work without the name parameter
    Shell {
        /// The name of the database (without the .jsondb extension)
        name: String,
    },

    /// List all registered databases, one per line
    Dbs,

    /// Add a database file to the registry
    AddDb {
        /// The path to the .jsondb file
        path: PathBuf,
    },

    /// Remove a database from the registry (the file is kept)
    RmDb {
        /// The database name (file name without extension)
        name: String,
    },
}

/// The subcommands that work on one open database. Used by the shell, where
/// the name is implied.
#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Obtain information about the database
    Info(InfoArgs),
    /// Modify the settings of the database
    Modify(ModifyArgs),
    /// Add a new entry
    Set(SetArgs),
    /// Delete an entry by its id
    Unset(UnsetArgs),
    /// Edit an entry
    Edit(EditArgs),
    /// Get the ids of the entries whose data matches
    Id(IdArgs),
    /// List the ids of all entries carrying every given tag
    Query(QueryArgs),
    /// Output entries one per line using a format string
    Format(FormatArgs),
    /// Browse the database interactively
    Browse(BrowseArgs),
}

impl Commands {
    /// Splits a database subcommand into its name and arguments.
    pub fn into_db_command(self) -> std::result::Result<(String, DbCommand), Commands> {
        Ok(match self {
            Commands::Info { name, args } => (name, DbCommand::Info(args)),
            Commands::Modify { name, args } => (name, DbCommand::Modify(args)),
            Commands::Set { name, args } => (name, DbCommand::Set(args)),
            Commands::Unset { name, args } => (name, DbCommand::Unset(args)),
            Commands::Edit { name, args } => (name, DbCommand::Edit(args)),
            Commands::Id { name, args } => (name, DbCommand::Id(args)),
            Commands::Query { name, args } => (name, DbCommand::Query(args)),
            Commands::Format { name, args } => (name, DbCommand::Format(args)),
            Commands::Browse { name, args } => (name, DbCommand::Browse(args)),
            other => return Err(other),
        })
    }
}

/// One line typed into the shell.
#[derive(Parser, Debug)]
#[command(
    name = "jsondb",
    no_binary_name = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InfoSubject {
    /// Tags attached to entries
    Tags,
    /// The registered (enforceable) tag list
    Enforced,
    /// Number of entries
    Size,
    /// Size of the JSON document in bytes
    Bytes,
    /// The database path
    Path,
    /// Whether backups are enabled
    #[value(name = "backups_enabled")]
    BackupsEnabled,
    /// Whether tags are enforced
    #[value(name = "enforce_tags")]
    EnforceTags,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Only print one value
    #[arg(short, long, value_enum)]
    pub subject: Option<InfoSubject>,
}

#[derive(Args, Debug)]
pub struct ModifyArgs {
    /// Add a tag to the list of allowed tags (repeatable)
    #[arg(short = 't', long = "add-tag")]
    pub add_tags: Vec<String>,

    /// Remove a tag from the list of allowed tags (repeatable)
    #[arg(short = 'r', long = "rm-tag")]
    pub rm_tags: Vec<String>,

    /// Clear the list of allowed tags (applied after --add-tag and --rm-tag)
    #[arg(long)]
    pub clear_tags: bool,

    /// Only allow tags from the list of allowed tags
    #[arg(long, conflicts_with = "no_enforce_tags")]
    pub enforce_tags: bool,

    /// Stop enforcing tags
    #[arg(long)]
    pub no_enforce_tags: bool,

    /// Back the database file up before every change
    #[arg(long, conflicts_with = "disable_backups")]
    pub enable_backups: bool,

    /// Stop making backups
    #[arg(long)]
    pub disable_backups: bool,
}

impl ModifyArgs {
    pub fn to_change(&self) -> SettingsChange {
        SettingsChange {
            add_tags: self.add_tags.clone(),
            remove_tags: self.rm_tags.clone(),
            clear_tags: self.clear_tags,
            enforce_tags: switch(self.enforce_tags, self.no_enforce_tags),
            backups_enabled: switch(self.enable_backups, self.disable_backups),
        }
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// The data to store
    pub data: String,

    /// A tag to attach (repeatable)
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// An attribute as KEY:VALUE (repeatable; KEY may not contain a colon)
    #[arg(short = 'a', long = "attr")]
    pub attrs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UnsetArgs {
    /// The id of the entry to delete
    pub id: RecordId,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// The id of the entry to edit
    pub id: RecordId,

    /// Replace the data
    #[arg(short, long)]
    pub data: Option<String>,

    /// Add a tag (repeatable)
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// Remove a tag (repeatable)
    #[arg(short = 'r', long = "rm-tag")]
    pub rm_tags: Vec<String>,

    /// Set an attribute as KEY:VALUE (repeatable)
    #[arg(short = 'a', long = "attr")]
    pub attrs: Vec<String>,

    /// Remove an attribute by key (repeatable)
    #[arg(short = 'u', long = "unset-attr")]
    pub unset_attrs: Vec<String>,
}

impl EditArgs {
    pub fn to_patch(&self) -> Result<RecordPatch> {
        let mut patch = RecordPatch::new()
            .add_tags(self.tags.iter().cloned())
            .remove_tags(self.rm_tags.iter().cloned())
            .set_attrs(parse_attr_pairs(&self.attrs)?)
            .unset_attrs(self.unset_attrs.iter().cloned());
        if let Some(data) = &self.data {
            patch = patch.data(data.clone());
        }
        Ok(patch)
    }
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// The data to search for
    pub data: String,

    /// Match when DATA is a substring of the entry
    #[arg(short, long)]
    pub contains: bool,

    /// Ignore case when matching
    #[arg(short = 'i', long)]
    pub case_insensitive: bool,
}

impl IdArgs {
    pub fn mode(&self) -> FindMode {
        FindMode::new(self.contains, self.case_insensitive)
    }
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// A tag to filter by (repeatable; entries must carry all of them)
    #[arg(short = 'f', long = "filter")]
    pub filters: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Comma separated ids. Read from one line of stdin when omitted
    #[arg(short = 'i', long = "indices")]
    pub indices: Option<String>,

    /// The format string [default: [%id(3)] "%data()" (%tags(", ")) (%attrs(": ","; "))]
    #[arg(short = 'f', long = "format", allow_hyphen_values = true)]
    pub format: Option<String>,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// A tag to filter by (repeatable; entries must carry all of them)
    #[arg(short = 'f', long = "filter")]
    pub filters: Vec<String>,

    /// Do not ask for confirmation before deleting an entry
    #[arg(long)]
    pub no_confirmation_prompt: bool,
}
