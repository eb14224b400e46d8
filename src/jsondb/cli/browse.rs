//! Terminal driver for [`BrowseSession`]: reads lines, prints views.

use super::print::{render_browse_help, render_detail, render_messages, render_table};
use jsondb::browse::{BrowseCommand, BrowseSession, BrowseState, DetailCommand, Response, View};
use jsondb::error::Result;
use jsondb::store::StorageBackend;
use std::io::{BufRead, Write};

const PROMPT: &str = "> ";
const DELETE_PROMPT: &str = "Do you really want to delete the entry? [y/N] ";

fn render_view<W: Write>(output: &mut W, view: &View) -> Result<()> {
    match view {
        View::Table(page) => writeln!(output, "{}", render_table(page))?,
        View::Detail(record) => writeln!(output, "{}", render_detail(record))?,
        View::Help => writeln!(output, "{}", render_browse_help())?,
        View::Exit => {}
    }
    Ok(())
}

/// Reads one line, `None` on end of input.
fn read_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "1" | "true")
}

/// Runs the session until the user exits or input ends.
pub fn run_browse<B, R, W>(
    session: &mut BrowseSession<'_, B>,
    input: &mut R,
    output: &mut W,
    confirm_delete: bool,
) -> Result<()>
where
    B: StorageBackend,
    R: BufRead,
    W: Write,
{
    render_view(output, &session.view())?;
    while session.state() != BrowseState::Exit {
        let Some(line) = read_line(input, output, PROMPT)? else {
            break;
        };
        let response = match BrowseCommand::parse(session.state(), &line) {
            Ok(BrowseCommand::Detail(DetailCommand::Delete)) if confirm_delete => {
                match read_line(input, output, DELETE_PROMPT)? {
                    Some(answer) if confirmed(&answer) => {
                        session.apply(BrowseCommand::Detail(DetailCommand::Delete))
                    }
                    Some(_) => Response {
                        view: session.view(),
                        message: None,
                    },
                    None => break,
                }
            }
            Ok(command) => session.apply(command),
            Err(_) => session.handle_line(&line),
        };
        if let Some(message) = &response.message {
            write!(output, "{}", render_messages(std::slice::from_ref(message)))?;
        }
        render_view(output, &response.view)?;
    }
    Ok(())
}
