//! Turns command results into terminal text.
//!
//! The `render_*` functions build strings so they can be tested; the `print_*`
//! functions decide the stream. Results meant for pipes go to stdout, messages
//! go to stderr.

use super::setup::InfoSubject;
use colored::Colorize;
use jsondb::api::{CmdMessage, MessageLevel};
use jsondb::model::Record;
use jsondb::browse::TablePage;
use jsondb::store::StoreInfo;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DATA_COLUMN_WIDTH: usize = 90;
const TABLE_FOOTER: &str = "[ID] Select entry     [N] Next     [P] Previous     [E] Exit";
const DETAIL_MENU: &str = "[E] Edit data  [A] Add tags  [R] Remove tags  [S] Set attributes  \
                           [U] Unset attributes  [D] Delete  [C] Cancel  [H] Help";

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut output = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        output.push_str(&format!("{}\n", line));
    }
    output
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        eprint!("{}", output);
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}

/// Renders either the full summary or just the value of `subject`.
pub fn render_info(info: &StoreInfo, subject: Option<InfoSubject>) -> String {
    match subject {
        Some(InfoSubject::Tags) => info.tag_universe.join(", "),
        Some(InfoSubject::Enforced) => info.enforced_tags.join(", "),
        Some(InfoSubject::Size) => info.size.to_string(),
        Some(InfoSubject::Bytes) => info.byte_size.to_string(),
        Some(InfoSubject::Path) => info.path.display().to_string(),
        Some(InfoSubject::BackupsEnabled) => on_off(info.backups_enabled).to_string(),
        Some(InfoSubject::EnforceTags) => on_off(info.tags_enforced).to_string(),
        None => [
            format!("Tags:             {}", info.tag_universe.join(", ")),
            format!("Registered tags:  {}", info.enforced_tags.join(", ")),
            format!("Entries:          {}", info.size),
            format!("Size in bytes:    {}", info.byte_size),
            format!("Path:             {}", info.path.display()),
            format!("Backups enabled:  {}", on_off(info.backups_enabled)),
            format!("Tags enforced:    {}", on_off(info.tags_enforced)),
        ]
        .join("\n"),
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let limit = max_width.saturating_sub(3);
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push_str("...");
    result
}

pub fn render_table(page: &TablePage) -> String {
    let mut lines = Vec::new();
    if !page.filter.is_empty() {
        lines.push(format!("Filtering for tags: {}", page.filter.join(", ")));
    }
    lines.push(format!("{:>width$} | DATA", "ID", width = page.id_width));
    lines.push(format!("{}-+-{}", "-".repeat(page.id_width), "-".repeat(DATA_COLUMN_WIDTH)));
    if page.rows.is_empty() {
        lines.push("No entries.".dimmed().to_string());
    }
    for record in &page.rows {
        lines.push(format!(
            "{:0>width$} | {}",
            record.id,
            truncate_to_width(&record.data, DATA_COLUMN_WIDTH),
            width = page.id_width
        ));
    }
    lines.push(format!("Page {}/{}", page.page + 1, page.page_count).dimmed().to_string());
    lines.push(TABLE_FOOTER.bold().to_string());
    lines.join("\n")
}

pub fn render_detail(record: &Record) -> String {
    let mut lines = vec![
        format!("{} {}", "Entry".bold(), record.id),
        format!("\"{}\"", record.data),
        format!("Tags: {}", record.tags.join(", ")),
        "Attributes:".to_string(),
    ];
    for (key, value) in &record.attrs {
        lines.push(format!("    {}: {}", key, value));
    }
    lines.push(String::new());
    lines.push(DETAIL_MENU.bold().to_string());
    lines.join("\n")
}

pub fn render_browse_help() -> String {
    [
        "E <DATA>           replace the data of the entry",
        "A <TAGS>           add tags, separated by spaces",
        "R <TAGS>           remove tags, separated by spaces",
        "S <KEY:VALUE>...   set attributes",
        "U <KEYS>           remove attributes by key",
        "D                  delete the entry",
        "C                  go back to the table",
        "H                  show this help",
    ]
    .join("\n")
}

pub fn render_shell_help(name: &str) -> String {
    format!(
        "You are working on the database '{}'. Every jsondb subcommand that takes a \
         database name works here without it:\n\n  \
         info, modify, set, unset, edit, id, query, format, browse\n\n\
         Use '<command> --help' for details, 'exit' or 'quit' to leave.",
        name
    )
}
