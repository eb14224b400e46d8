//! The `jsondb` binary. All of the CLI lives in `cli/`; this file only runs it
//! and turns errors into an exit code.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
