//! Recursive-descent parser for format templates.
//!
//! ```text
//! template := (text | "%%" | macro)*
//! macro    := "%" name "(" [arg ("," arg)*] ")"
//! arg      := value | name "=" value
//! value    := digits | '"' chars '"'
//! ```

use super::{Macro, Segment};
use crate::error::{DbError, Result};

pub(super) fn parse(source: &str) -> Result<Vec<Segment>> {
    Parser::new(source).template()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Int(usize),
    Str(String),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Str,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Int => "number",
            Kind::Str => "string",
        }
    }
}

struct Param {
    name: &'static str,
    kind: Kind,
    required: bool,
}

const fn param(name: &'static str, kind: Kind, required: bool) -> Param {
    Param {
        name,
        kind,
        required,
    }
}

const PADDED: [Param; 2] = [param("width", Kind::Int, false), param("fill", Kind::Str, false)];
const TAGS: [Param; 1] = [param("sep", Kind::Str, true)];
const ATTRS: [Param; 2] = [param("kv_sep", Kind::Str, true), param("pair_sep", Kind::Str, true)];

/// One argument as written, with the position it started at.
struct Arg {
    name: Option<String>,
    value: Value,
    position: usize,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    /// Start of the macro currently being parsed.
    macro_start: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            macro_start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Length of the identifier starting `offset` chars ahead.
    fn ident_len(&self, offset: usize) -> usize {
        let mut len = 0;
        while self
            .peek_at(offset + len)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            len += 1;
        }
        len
    }

    fn template(mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            if c != '%' {
                text.push(c);
                self.pos += 1;
                continue;
            }
            if self.peek_at(1) == Some('%') {
                text.push('%');
                self.pos += 2;
                continue;
            }
            let len = self.ident_len(1);
            if len == 0 || self.peek_at(1 + len) != Some('(') {
                text.push('%');
                self.pos += 1;
                continue;
            }

            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            let name: String = self.chars[self.pos + 1..self.pos + 1 + len].iter().collect();
            self.macro_start = self.pos;
            self.pos += len + 2;
            segments.push(Segment::Macro(self.macro_call(&name)?));
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Ok(segments)
    }

    fn macro_call(&mut self, name: &str) -> Result<Macro> {
        let params: &[Param] = match name {
            "id" | "data" => &PADDED,
            "tags" => &TAGS,
            "attrs" => &ATTRS,
            _ => {
                return Err(self.error_at(
                    self.macro_start,
                    format!(
                        "unknown macro '%{}' (expected %id, %data, %tags or %attrs)",
                        name
                    ),
                ))
            }
        };
        let args = self.arguments()?;
        let mut values = self.bind(name, params, args)?.into_iter();
        let mut next = || values.next().flatten();

        Ok(match name {
            "id" | "data" => {
                let width = match next() {
                    Some(Value::Int(w)) => w,
                    _ => 0,
                };
                let default_fill = if name == "id" { '0' } else { ' ' };
                let fill = match next() {
                    Some(Value::Str(f)) => self.fill_char(&f)?,
                    _ => default_fill,
                };
                if name == "id" {
                    Macro::Id { width, fill }
                } else {
                    Macro::Data { width, fill }
                }
            }
            "tags" => Macro::Tags {
                sep: string_value(next()),
            },
            _ => Macro::Attrs {
                kv_sep: string_value(next()),
                pair_sep: string_value(next()),
            },
        })
    }

    /// Parses `arg, arg, ... )`; the opening parenthesis is already consumed.
    fn arguments(&mut self) -> Result<Vec<Arg>> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(args);
        }

        loop {
            self.skip_whitespace();
            args.push(self.argument()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    return Ok(args);
                }
                Some(c) => {
                    return Err(self.error_here(format!("expected ',' or ')', found '{}'", c)))
                }
                None => return Err(self.error_here("unterminated macro, missing ')'")),
            }
        }
    }

    fn argument(&mut self) -> Result<Arg> {
        let position = self.pos;
        let len = self.ident_len(0);
        let starts_with_letter = self.peek().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if len > 0 && starts_with_letter {
            let name: String = self.chars[self.pos..self.pos + len].iter().collect();
            self.pos += len;
            self.skip_whitespace();
            if self.peek() != Some('=') {
                return Err(self.error_here(format!("expected '=' after argument name '{}'", name)));
            }
            self.pos += 1;
            self.skip_whitespace();
            let value = self.value()?;
            return Ok(Arg {
                name: Some(name),
                value,
                position,
            });
        }
        Ok(Arg {
            name: None,
            value: self.value()?,
            position,
        })
    }

    fn value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('"') => self.string().map(Value::Str),
            Some(c) if c.is_ascii_digit() => self.number().map(Value::Int),
            Some(c) => Err(self.error_here(format!(
                "expected a number or a quoted string, found '{}'",
                c
            ))),
            None => Err(self.error_here("unterminated macro, missing ')'")),
        }
    }

    fn number(&mut self) -> Result<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse()
            .map_err(|_| self.error_at(start, format!("number '{}' is too large", digits)))
    }

    fn string(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some('"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    let escaped = match self.peek_at(1) {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some(c) => {
                            return Err(self.error_here(format!("unknown escape '\\{}'", c)))
                        }
                        None => return Err(self.error_at(start, "unterminated string")),
                    };
                    out.push(escaped);
                    self.pos += 2;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Matches written arguments to parameters, checking arity and types.
    fn bind(&self, name: &str, params: &[Param], args: Vec<Arg>) -> Result<Vec<Option<Value>>> {
        let mut bound: Vec<Option<Value>> = vec![None; params.len()];
        let mut seen_named = false;
        let mut positional = 0;

        for arg in args {
            let index = match &arg.name {
                None => {
                    if seen_named {
                        return Err(self.error_at(
                            arg.position,
                            "positional argument after a named argument",
                        ));
                    }
                    if positional >= params.len() {
                        return Err(self.error_at(
                            arg.position,
                            format!(
                                "%{} takes at most {} argument{}",
                                name,
                                params.len(),
                                if params.len() == 1 { "" } else { "s" }
                            ),
                        ));
                    }
                    positional += 1;
                    positional - 1
                }
                Some(arg_name) => {
                    seen_named = true;
                    params
                        .iter()
                        .position(|p| p.name == arg_name)
                        .ok_or_else(|| {
                            self.error_at(
                                arg.position,
                                format!("%{} has no argument named '{}'", name, arg_name),
                            )
                        })?
                }
            };

            let param = &params[index];
            let matches = matches!(
                (param.kind, &arg.value),
                (Kind::Int, Value::Int(_)) | (Kind::Str, Value::Str(_))
            );
            if !matches {
                return Err(self.error_at(
                    arg.position,
                    format!(
                        "argument '{}' of %{} must be a {}, got a {}",
                        param.name,
                        name,
                        param.kind.name(),
                        arg.value.kind()
                    ),
                ));
            }
            if bound[index].is_some() {
                return Err(self.error_at(
                    arg.position,
                    format!("argument '{}' given twice", param.name),
                ));
            }
            bound[index] = Some(arg.value);
        }

        if let Some(missing) = params
            .iter()
            .zip(&bound)
            .find(|(p, v)| p.required && v.is_none())
        {
            return Err(self.error_here(format!(
                "%{} is missing required argument '{}'",
                name, missing.0.name
            )));
        }
        Ok(bound)
    }

    fn fill_char(&self, fill: &str) -> Result<char> {
        let mut chars = fill.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(self.error_at(
                self.macro_start,
                format!("fill must be exactly one character, got \"{}\"", fill),
            )),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> DbError {
        self.error_at(self.pos, message)
    }

    /// The fragment is the macro text up to its closing parenthesis (or the
    /// end of the input when it has none).
    fn error_at(&self, position: usize, message: impl Into<String>) -> DbError {
        let end = self.macro_end();
        DbError::FormatSyntax {
            position,
            fragment: self.chars[self.macro_start..end].iter().collect(),
            message: message.into(),
        }
    }

    /// Index just past the `)` closing the current macro. Parentheses inside
    /// string literals don't count.
    fn macro_end(&self) -> usize {
        let mut in_string = false;
        let mut escaped = false;
        for (i, &c) in self.chars.iter().enumerate().skip(self.macro_start) {
            match (in_string, escaped, c) {
                (true, true, _) => escaped = false,
                (true, false, '\\') => escaped = true,
                (true, false, '"') => in_string = false,
                (false, _, '"') => in_string = true,
                (false, _, ')') => return i + 1,
                _ => {}
            }
        }
        self.chars.len()
    }
}

fn string_value(value: Option<Value>) -> String {
    match value {
        Some(Value::Str(s)) => s,
        _ => String::new(),
    }
}
