//! # Format Templates
//!
//! A small macro language for rendering records, one line per record.
//!
//! ```text
//! [%id(3)] "%data()" (%tags(", ")) (%attrs(": ","; "))
//! ```
//!
//! | macro | arguments | renders |
//! | --- | --- | --- |
//! | `%id(width=0, fill="0")` | optional | id, padded on the left |
//! | `%data(width=0, fill=" ")` | optional | data, padded on the right, never cut |
//! | `%tags(sep)` | required | tags joined by `sep` |
//! | `%attrs(kv_sep, pair_sep)` | required | `key kv_sep value` pairs joined by `pair_sep` |
//!
//! Numbers are bare integers, strings are double-quoted (`\"`, `\\`, `\n` and
//! `\t` escapes). Arguments may also be passed by name (`%data(fill=".",
//! width=8)`), after any positional ones. `%%` is a literal percent sign and a
//! `%` that does not start `name(` is copied as is.
//!
//! Templates are parsed up front into [`Segment`]s, so a malformed template is
//! rejected as a whole with a [`DbError::FormatSyntax`] and nothing is
//! rendered.

mod parser;

use crate::error::{DbError, Result};
use crate::model::Record;
use once_cell::sync::Lazy;
use std::str::FromStr;

pub const DEFAULT_FORMAT: &str = r#"[%id(3)] "%data()" (%tags(", ")) (%attrs(": ","; "))"#;

static DEFAULT_TEMPLATE: Lazy<Template> = Lazy::new(|| Template {
    source: DEFAULT_FORMAT.to_string(),
    segments: parser::parse(DEFAULT_FORMAT).unwrap_or_default(),
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Macro(Macro),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Macro {
    Id { width: usize, fill: char },
    Data { width: usize, fill: char },
    Tags { sep: String },
    Attrs { kv_sep: String, pair_sep: String },
}

impl Macro {
    fn render(&self, record: &Record, out: &mut String) {
        match self {
            Macro::Id { width, fill } => {
                let id = record.id.to_string();
                out.push_str(&padding(&id, *width, *fill));
                out.push_str(&id);
            }
            Macro::Data { width, fill } => {
                out.push_str(&record.data);
                out.push_str(&padding(&record.data, *width, *fill));
            }
            Macro::Tags { sep } => out.push_str(&record.tags.join(sep)),
            Macro::Attrs { kv_sep, pair_sep } => {
                let pairs: Vec<String> = record
                    .attrs
                    .iter()
                    .map(|(k, v)| format!("{}{}{}", k, kv_sep, v))
                    .collect();
                out.push_str(&pairs.join(pair_sep));
            }
        }
    }
}

/// Fill needed to bring `text` up to `width` characters.
fn padding(text: &str, width: usize, fill: char) -> String {
    let missing = width.saturating_sub(text.chars().count());
    std::iter::repeat(fill).take(missing).collect()
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self {
            source: source.to_string(),
            segments: parser::parse(source)?,
        })
    }

    /// The template built from [`DEFAULT_FORMAT`].
    pub fn default_template() -> &'static Template {
        &DEFAULT_TEMPLATE
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn render(&self, record: &Record) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Macro(m) => m.render(record, &mut out),
            }
        }
        out
    }

    /// Renders each record on its own line, in the order given.
    pub fn render_all<'a, I>(&self, records: I) -> String
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .map(|r| self.render(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromStr for Template {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        Template::parse(s)
    }
}
