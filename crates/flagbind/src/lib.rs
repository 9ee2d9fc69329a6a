//! Declarative command-line binding for typed configuration records.
//!
//! `flagbind` derives a flag grammar from a record's fields, fills the record
//! from command-line tokens and environment variables, resolves which
//! (sub)command was invoked and runs it with cancellation support.
//!
//! # Features
//!
//! - **Derived flags**: `#[derive(Record)]` turns struct fields into flags
//! - **Environment fallback**: unset flags are read from named variables
//! - **Command trees**: nested subcommands with per-level pre-run hooks
//! - **Cancellation**: context-aware entry points get a `CancellationToken`,
//!   optionally cancelled on SIGINT/SIGTERM
//! - **Exit codes**: uniform mapping from outcomes to process exit codes
//!
//! # Example
//!
//! ```rust
//! use flagbind::{Cli, Command, MockEnv, Record, Run};
//!
//! #[derive(Default, Record)]
//! #[record(run)]
//! struct Serve {
//!     #[flag(short = 'p', env = "PORT", default = "8080", help = "port to bind")]
//!     port: u16,
//!     #[flag(help = "log every request")]
//!     verbose: bool,
//! }
//!
//! impl Run for Serve {
//!     fn run(&mut self) -> anyhow::Result<()> {
//!         println!("listening on {}", self.port);
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = Command::build("tool", ())?
//!     .subcommand(Command::build("serve", Serve::default())?.with_help("Run the server"))?;
//!
//! let mut cli = Cli::new(root).with_env(MockEnv::new().with_var("PORT", "9000"));
//! let parsed = cli.parse_args(["serve", "--verbose"]);
//! assert_eq!(parsed.config::<Serve>().map(|s| s.port), Some(9000));
//! parsed.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Run modes
//!
//! [`ParseResult`] offers three families of run methods:
//!
//! - `run*`: run and return the error
//! - `run_and_report*`: also write help and `error: ...` lines to the sinks
//!   configured on [`Cli`]
//! - `run_fatal*`: report, then exit the process with [`exit_code`]

extern crate self as flagbind;

// Core modules
mod binder;
mod command;
mod env;
mod error;
mod field;
mod grammar;
mod help;
mod parse;
mod record;
mod signal;
mod value;

// Re-export core types
pub use binder::Binder;
pub use command::Command;
pub use env::{EnvLookup, MockEnv, ProcessEnv};
pub use error::{exit_code, ConfigShapeError, EnvError, Error, ExitError, UsageError};
pub use field::{FieldDescriptor, FieldSpec, PositionalDescriptor};
pub use grammar::{FlagGrammar, GrammarError};
pub use help::render_help;
pub use parse::{Cli, ParseResult};
pub use record::{AsAny, Before, EntryPoint, Record, Run, RunContext, Setup};
pub use signal::active_signal_listeners;
pub use value::FlagValue;

pub use flagbind_macros::Record;
pub use tokio_util::sync::CancellationToken;
