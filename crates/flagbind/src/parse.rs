//! Parse engine and run dispatch.
//!
//! [`Cli::parse_args`] walks the command tree once per level:
//!
//! 1. flags are applied from the tokens;
//! 2. `-h`/`--help` stops the walk;
//! 3. unset flags with an environment variable are filled from it;
//! 4. leftover tokens become positional arguments or select a subcommand;
//! 5. required flags are checked;
//! 6. the record's [`Before`](crate::Before) hook runs;
//! 7. the walk descends into the subcommand, or ends at this command.
//!
//! The resulting [`ParseResult`] runs the command it ended at.

use std::any::Any;
use std::ffi::OsString;
use std::io::{self, Write};

use tokio_util::sync::CancellationToken;

use crate::command::{Command, Internal, HELP_FIELD};
use crate::env::{EnvLookup, ProcessEnv};
use crate::error::{exit_code, Error};
use crate::field::Owner;
use crate::help::render_help;
use crate::record::{EntryPoint, Record};
use crate::signal::SignalListener;

/// A command tree together with its environment and output sinks.
///
/// ```no_run
/// use flagbind::{Cli, Command};
///
/// # fn main() -> Result<(), flagbind::ConfigShapeError> {
/// let root = Command::build("tool", ())?;
/// Cli::new(root).parse().run_fatal();
/// # }
/// ```
pub struct Cli {
    root: Command,
    env: Box<dyn EnvLookup>,
    help_writer: Option<Box<dyn Write>>,
    error_writer: Option<Box<dyn Write>>,
}

impl Cli {
    /// Reads the process environment and writes help and errors to stderr.
    pub fn new(root: Command) -> Self {
        Self {
            root,
            env: Box::new(ProcessEnv),
            help_writer: Some(Box::new(io::stderr())),
            error_writer: Some(Box::new(io::stderr())),
        }
    }

    pub fn with_env(mut self, env: impl EnvLookup + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_help_writer(mut self, writer: impl Write + 'static) -> Self {
        self.help_writer = Some(Box::new(writer));
        self
    }

    pub fn with_error_writer(mut self, writer: impl Write + 'static) -> Self {
        self.error_writer = Some(Box::new(writer));
        self
    }

    /// Suppresses help output from the reporting run modes.
    pub fn without_help_writer(mut self) -> Self {
        self.help_writer = None;
        self
    }

    /// Suppresses `error: ...` lines from the reporting run modes.
    pub fn without_error_writer(mut self) -> Self {
        self.error_writer = None;
        self
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Command {
        &mut self.root
    }

    pub fn into_root(self) -> Command {
        self.root
    }

    /// Parses the process arguments, program name excluded.
    pub fn parse(&mut self) -> ParseResult<'_> {
        self.parse_args_os(std::env::args_os().skip(1))
    }

    /// Like [`parse_args`](Self::parse_args) for raw OS strings.
    ///
    /// An argument that is not valid unicode fails the parse with a usage
    /// error at the root command.
    pub fn parse_args_os<I, S>(&mut self, args: I) -> ParseResult<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Result<Vec<String>, Error> = args
            .into_iter()
            .map(|arg| {
                arg.into().into_string().map_err(|raw| {
                    Error::usage(format!(
                        "failed to parse args: invalid unicode in argument {raw:?}"
                    ))
                })
            })
            .collect();

        match args {
            Ok(args) => self.parse_args(args),
            Err(err) => {
                tracing::debug!(%err, "parse failed");
                ParseResult {
                    cli: self,
                    path: Vec::new(),
                    outcome: Err(err),
                }
            }
        }
    }

    /// Parses `args` against the command tree.
    ///
    /// Flag state accumulates across calls; build a fresh tree to parse
    /// another invocation from scratch.
    pub fn parse_args<I, S>(&mut self, args: I) -> ParseResult<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut path = Vec::new();
        let outcome = self.root.resolve(&args, self.env.as_ref(), &mut path);

        match &outcome {
            Ok(entry) => tracing::debug!(?path, ?entry, "parse succeeded"),
            Err(err) => tracing::debug!(?path, %err, "parse failed"),
        }

        ParseResult {
            cli: self,
            path,
            outcome,
        }
    }
}

impl Command {
    /// Resolves `args` against this command and, recursively, its children.
    ///
    /// `trail` receives the child index of every level descended into, so on
    /// return it points at the command the walk ended at.
    pub(crate) fn resolve(
        &mut self,
        args: &[String],
        env: &dyn EnvLookup,
        trail: &mut Vec<usize>,
    ) -> Result<Option<EntryPoint>, Error> {
        let Command {
            name,
            config,
            internal,
            fields,
            positional,
            grammar,
            children,
            child_index,
            ..
        } = self;
        let config: &mut dyn Record = &mut **config;
        tracing::debug!(command = %name, args = args.len(), "resolving command");

        let flagged = grammar.parse(args, |index, raw| {
            let field = &mut fields[index];
            let owner = field.owner;
            field.apply(target(owner, &mut *internal, &mut *config), raw)
        });
        if fields[HELP_FIELD].is_set() {
            return Err(Error::HelpRequested);
        }
        flagged.map_err(|err| Error::usage(format!("failed to parse args: {err}")))?;

        for field in fields.iter_mut().filter(|field| !field.is_set()) {
            let Some(var) = field.env_var().map(str::to_owned) else {
                continue;
            };
            let value = env
                .lookup(&var)
                .map_err(|err| Error::usage(format!("failed to parse environment variables: {err}")))?;
            let Some(value) = value else {
                continue;
            };
            tracing::trace!(flag = field.name(), var = %var, "applying environment fallback");
            let owner = field.owner;
            field
                .apply(target(owner, &mut *internal, &mut *config), &value)
                .map_err(|reason| {
                    Error::usage(format!(
                        "failed to parse environment variables: error parsing {var}: {reason}"
                    ))
                })?;
        }

        let leftovers = grammar.leftovers();
        let mut next = None;
        if let Some(positional) = positional.as_ref() {
            if !leftovers.is_empty() {
                positional
                    .bind(config.as_any_mut(), leftovers.to_vec())
                    .map_err(|reason| Error::Execution(anyhow::anyhow!(reason)))?;
            }
        } else if let Some(first) = leftovers.first() {
            if children.is_empty() {
                return Err(Error::usage("command does not take arguments"));
            }
            let index = child_index
                .get(first)
                .copied()
                .ok_or_else(|| Error::usage(format!("unknown command: {first}")))?;
            next = Some((index, leftovers[1..].to_vec()));
        }

        if let Some(missing) = fields.iter().find(|f| f.is_required() && !f.is_set()) {
            return Err(Error::usage(format!("required flag {} not set", missing.name())));
        }

        if let Some(hook) = config.as_before() {
            tracing::trace!(command = %name, "running before hook");
            hook.before().map_err(Error::Execution)?;
        }

        if let Some((index, rest)) = next {
            trail.push(index);
            return children[index].resolve(&rest, env, trail);
        }

        let entry = EntryPoint::of(config);
        if entry.is_none() && !children.is_empty() {
            return Err(Error::usage("no command specified"));
        }
        Ok(entry)
    }
}

fn target<'a>(owner: Owner, internal: &'a mut Internal, config: &'a mut dyn Record) -> &'a mut dyn Any {
    match owner {
        Owner::Internal => internal,
        Owner::Record => config.as_any_mut(),
    }
}

/// Outcome of a parse, ready to run.
///
/// Holds the command the walk ended at: the command to run on success, or the
/// command whose flags or arguments were rejected on failure.
pub struct ParseResult<'a> {
    cli: &'a mut Cli,
    path: Vec<usize>,
    outcome: Result<Option<EntryPoint>, Error>,
}

impl<'a> ParseResult<'a> {
    /// The command the walk ended at.
    pub fn command(&self) -> &Command {
        self.cli.root.descend(&self.path)
    }

    pub fn command_mut(&mut self) -> &mut Command {
        self.cli.root.descend_mut(&self.path)
    }

    /// Commands above [`command`](Self::command), root first.
    pub fn ancestors(&self) -> Vec<&Command> {
        self.cli.root.ancestors(&self.path)
    }

    /// The bound record of the command the walk ended at, if it is a `T`.
    pub fn config<T: Record>(&self) -> Option<&T> {
        self.command().config::<T>()
    }

    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    pub fn is_help_requested(&self) -> bool {
        self.error().is_some_and(Error::is_help_requested)
    }

    pub fn entry_point(&self) -> Option<EntryPoint> {
        self.outcome.as_ref().ok().copied().flatten()
    }

    /// Help for the command the walk ended at.
    pub fn help_text(&self) -> String {
        render_help(self.command(), &self.ancestors())
    }

    /// Runs the command with a fresh, never-cancelled context.
    pub fn run(self) -> Result<(), Error> {
        self.run_with_context(&CancellationToken::new())
    }

    /// Runs the command, passing `ctx` to a context-aware entry point.
    pub fn run_with_context(mut self, ctx: &CancellationToken) -> Result<(), Error> {
        self.execute(ctx)
    }

    /// Runs the command, cancelling its context on SIGINT or SIGTERM.
    ///
    /// The listener is installed only for context-aware entry points.
    pub fn run_with_sig_cancel(mut self) -> Result<(), Error> {
        self.execute_with_sig_cancel(&CancellationToken::new())
    }

    /// Like [`run`](Self::run), and reports failures.
    ///
    /// Usage errors and help requests write help to the help sink; every
    /// failure other than a help request writes `error: MESSAGE` to the error
    /// sink.
    pub fn run_and_report(self) -> Result<(), Error> {
        self.run_and_report_with_context(&CancellationToken::new())
    }

    pub fn run_and_report_with_context(mut self, ctx: &CancellationToken) -> Result<(), Error> {
        let result = self.execute(ctx);
        self.report(result)
    }

    pub fn run_and_report_with_sig_cancel(mut self) -> Result<(), Error> {
        let result = self.execute_with_sig_cancel(&CancellationToken::new());
        self.report(result)
    }

    /// Reports like [`run_and_report`](Self::run_and_report) and returns the
    /// exit code for the outcome.
    pub fn run_to_exit_code(self) -> i32 {
        exit_code(&self.run_and_report())
    }

    /// Reports like [`run_and_report`](Self::run_and_report), then exits the
    /// process with the code from [`exit_code`](crate::exit_code).
    pub fn run_fatal(self) -> ! {
        let code = exit_code(&self.run_and_report());
        std::process::exit(code)
    }

    pub fn run_fatal_with_context(self, ctx: &CancellationToken) -> ! {
        let code = exit_code(&self.run_and_report_with_context(ctx));
        std::process::exit(code)
    }

    pub fn run_fatal_with_sig_cancel(self) -> ! {
        let code = exit_code(&self.run_and_report_with_sig_cancel());
        std::process::exit(code)
    }

    fn execute(&mut self, ctx: &CancellationToken) -> Result<(), Error> {
        let entry = std::mem::replace(&mut self.outcome, Ok(None))?.ok_or(Error::NoRunMethod)?;
        let cmd = self.cli.root.descend_mut(&self.path);
        tracing::debug!(command = %cmd.name(), ?entry, "running command");

        entry
            .invoke(cmd.record_mut(), ctx)
            .ok_or(Error::NoRunMethod)?
            .map_err(Error::Execution)
    }

    fn execute_with_sig_cancel(&mut self, parent: &CancellationToken) -> Result<(), Error> {
        let ctx = parent.child_token();
        let _listener = match self.entry_point() {
            Some(entry) if entry.supports_context() => match SignalListener::spawn(&ctx) {
                Ok(listener) => Some(listener),
                Err(err) => {
                    tracing::warn!(%err, "failed to install signal listener");
                    None
                }
            },
            _ => None,
        };
        self.execute(&ctx)
    }

    fn report(&mut self, result: Result<(), Error>) -> Result<(), Error> {
        let Err(err) = &result else {
            return result;
        };

        if err.wants_help() && self.cli.help_writer.is_some() {
            let text = self.help_text();
            if let Some(writer) = self.cli.help_writer.as_mut() {
                if let Err(io_err) = writer.write_all(text.as_bytes()).and_then(|()| writer.flush()) {
                    tracing::warn!(%io_err, "failed to write help");
                }
            }
        }

        if !err.is_help_requested() {
            if let Some(writer) = self.cli.error_writer.as_mut() {
                let written = match err {
                    Error::Execution(cause) => writeln!(writer, "error: {cause:#}"),
                    _ => writeln!(writer, "error: {err}"),
                };
                if let Err(io_err) = written.and_then(|()| writer.flush()) {
                    tracing::warn!(%io_err, "failed to write error");
                }
            }
        }

        result
    }
}
