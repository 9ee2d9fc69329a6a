//! Command records for the demo tree.

use std::thread;
use std::time::{Duration, Instant};

use flagbind::{
    Before, CancellationToken, Command, ConfigShapeError, ExitError, Record, Run, RunContext,
    Setup, UsageError,
};

/// Builds the whole `fbdemo` command tree.
pub fn build() -> Result<Command, ConfigShapeError> {
    Command::build("fbdemo", Global::default())
}

// =============================================================================
// Root
// =============================================================================

#[derive(Debug, Default, Record)]
#[record(before, setup)]
pub struct Global {
    /// Print what each command is doing.
    #[flag(short = 'v', env = "FBDEMO_VERBOSE")]
    verbose: bool,
}

impl Setup for Global {
    fn setup_command(&self, cmd: &mut Command) -> Result<(), ConfigShapeError> {
        cmd.set_help("Demonstrates declarative flag binding")
            .set_description("Flags, environment fallback and subcommands bound from plain structs.");

        let http = Command::build("http", Http::default())?
            .with_help("Serve until interrupted\nStops on SIGINT/SIGTERM or after --for-ms.");
        let serve = Command::build("serve", ())?
            .with_help("Run a server")
            .subcommand(http)?;

        cmd.add_command(serve)?
            .add_command(Command::build("ls", List::default())?.with_help("List paths"))?
            .add_command(Command::build("exit", Exit::default())?.with_help("Exit with a code"))?
            .add_command(Command::build("version", Version)?.with_help("Print the version"))?;
        Ok(())
    }
}

impl Before for Global {
    fn before(&mut self) -> anyhow::Result<()> {
        if self.verbose {
            eprintln!("verbose output enabled");
        }
        tracing::debug!(verbose = self.verbose, "global flags bound");
        Ok(())
    }
}

// =============================================================================
// serve http
// =============================================================================

#[derive(Debug, Default, Record)]
#[record(run_context)]
pub struct Http {
    #[flag(short = 'H', env = "FBDEMO_HOST", default = "127.0.0.1", help = "address to bind")]
    host: String,

    #[flag(short = 'p', env = "FBDEMO_PORT", default = 8080, placeholder = "PORT", help = "port to bind")]
    port: u16,

    /// Stop after this many milliseconds.
    #[flag(placeholder = "MS")]
    for_ms: Option<u64>,
}

impl RunContext for Http {
    fn run(&mut self, ctx: &CancellationToken) -> anyhow::Result<()> {
        println!("serving on {}:{}", self.host, self.port);
        let deadline = self
            .for_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        while !ctx.is_cancelled() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }

        if ctx.is_cancelled() {
            println!("interrupted, shutting down");
        } else {
            println!("shutting down");
        }
        Ok(())
    }
}

// =============================================================================
// ls
// =============================================================================

#[derive(Debug, Default, Record)]
#[record(run)]
pub struct List {
    #[flag(short = 'a', help = "include entries starting with '.'")]
    all: bool,

    #[flag(args)]
    paths: Vec<String>,
}

impl Run for List {
    fn run(&mut self) -> anyhow::Result<()> {
        if self.paths.is_empty() {
            return Err(UsageError::new("at least one path is required").into());
        }
        for path in &self.paths {
            let hidden = path
                .rsplit('/')
                .next()
                .is_some_and(|name| name.starts_with('.'));
            if hidden && !self.all {
                continue;
            }
            println!("{path}");
        }
        Ok(())
    }
}

// =============================================================================
// exit
// =============================================================================

#[derive(Debug, Default, Record)]
#[record(run)]
pub struct Exit {
    #[flag(short = 'c', required, help = "process exit code")]
    code: i32,
}

impl Run for Exit {
    fn run(&mut self) -> anyhow::Result<()> {
        if self.code == 0 {
            return Ok(());
        }
        Err(ExitError::msg(self.code, format!("exiting with code {}", self.code)).into())
    }
}

// =============================================================================
// version
// =============================================================================

#[derive(Debug, Default, Record)]
#[record(run)]
pub struct Version;

impl Run for Version {
    fn run(&mut self) -> anyhow::Result<()> {
        println!("fbdemo {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
