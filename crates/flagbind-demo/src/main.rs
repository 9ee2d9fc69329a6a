//! `fbdemo`: a small command tree built with flagbind.
//!
//! Set `FLAGBIND_LOG` (e.g. `FLAGBIND_LOG=flagbind=debug`) to trace parsing
//! and dispatch on stderr.

mod commands;

use flagbind::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("FLAGBIND_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let root = match commands::build() {
        Ok(root) => root,
        Err(err) => {
            eprintln!("error: invalid command tree: {err}");
            std::process::exit(2);
        }
    };

    Cli::new(root).parse().run_fatal_with_sig_cancel()
}
