//! Error types for building, parsing and running commands.
//!
//! Errors fall into four groups:
//!
//! - [`ConfigShapeError`]: the record's field declarations or the command tree
//!   are malformed. Raised while building, never while parsing.
//! - [`UsageError`]: the user supplied bad input. Reporting modes print help
//!   alongside the message.
//! - [`Error::HelpRequested`]: not a failure. Reporting modes print help and
//!   nothing else.
//! - [`Error::Execution`]: whatever a pre-run hook or entry point returned,
//!   passed through untouched.

use std::fmt;

use thiserror::Error;

/// Static misconfiguration of a record or command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigShapeError {
    /// Two fields of one command share a name.
    #[error("duplicate flag name `{name}`")]
    DuplicateName { name: String },

    /// A short alias collides with another field's name or alias.
    #[error("short alias `{alias}` of flag `{field}` collides with flag `{other}`")]
    AliasCollision {
        field: String,
        alias: String,
        other: String,
    },

    /// A name or alias that the grammar could never match.
    #[error("invalid flag name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// More than one field was marked as the positional-arguments capture.
    #[error("more than one positional arguments field: `{first}` and `{second}`")]
    MultiplePositional { first: String, second: String },

    /// A declared default could not be applied through the field's adapter.
    #[error("invalid default `{value}` for flag `{field}`: {reason}")]
    InvalidDefault {
        field: String,
        value: String,
        reason: String,
    },

    /// Subcommands and positional arguments are mutually exclusive.
    #[error("subcommand `{child}` cannot be added to `{command}`, which takes positional arguments")]
    SubcommandWithPositional { command: String, child: String },

    /// A command already has a child with this name.
    #[error("command `{command}` already has a subcommand named `{child}`")]
    DuplicateCommand { command: String, child: String },
}

/// The caller supplied input the command cannot accept.
///
/// Carries a one-line message. Entry points may return one (wrapped in
/// `anyhow::Error`) to get the same help-printing treatment as parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UsageError {
    message: String,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error that asks for a specific process exit code.
///
/// Return it (or anything whose `anyhow` chain contains it) from an entry
/// point to control the code used by the terminating run modes.
#[derive(Debug)]
pub struct ExitError {
    code: i32,
    inner: anyhow::Error,
}

impl ExitError {
    /// Wraps an existing error with an exit code.
    pub fn new(code: i32, source: impl Into<anyhow::Error>) -> Self {
        Self {
            code,
            inner: source.into(),
        }
    }

    /// Builds an exit error from a plain message.
    pub fn msg<M>(code: i32, message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            code,
            inner: anyhow::Error::msg(message),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

// Displays as the wrapped error and continues its chain, so the code does
// not add a link of its own.
impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Failure reported by an environment provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The variable exists but is not valid unicode.
    #[error("environment variable {name} is not valid unicode")]
    NotUnicode { name: String },

    /// Any other provider-specific failure.
    #[error("environment lookup for {name} failed: {reason}")]
    Lookup { name: String, reason: String },
}

/// Outcome of a failed parse or run.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input at parse time (or returned by an entry point).
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// `-h`/`--help` was given.
    #[error("help requested")]
    HelpRequested,

    /// The resolved command has no entry point.
    #[error("no run method implemented")]
    NoRunMethod,

    /// Error returned by a pre-run hook or an entry point.
    #[error(transparent)]
    Execution(anyhow::Error),
}

impl Error {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Error::Usage(UsageError::new(message))
    }

    pub fn is_help_requested(&self) -> bool {
        matches!(self, Error::HelpRequested)
    }

    /// Returns the usage error, whether raised by the parser or by an entry point.
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            Error::Usage(usage) => Some(usage),
            Error::Execution(err) => err.downcast_ref::<UsageError>(),
            _ => None,
        }
    }

    /// True when reporting this error should also print help text.
    pub fn wants_help(&self) -> bool {
        self.is_help_requested() || self.as_usage().is_some()
    }

    /// The process exit code for this error.
    ///
    /// An [`ExitError`] anywhere in an execution error's chain supplies the
    /// code; everything else, help requests included, maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Execution(err) => err
                .chain()
                .find_map(|cause| cause.downcast_ref::<ExitError>())
                .map(ExitError::code)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

/// Maps a run outcome to a process exit code.
pub fn exit_code(result: &Result<(), Error>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_error_displays_message() {
        let err = Error::usage("unknown command: frob");
        assert_eq!(err.to_string(), "unknown command: frob");
        assert!(err.wants_help());
    }

    #[test]
    fn help_requested_wants_help() {
        assert!(Error::HelpRequested.wants_help());
        assert!(Error::HelpRequested.is_help_requested());
    }

    #[test]
    fn execution_error_does_not_want_help() {
        let err = Error::Execution(anyhow::anyhow!("disk full"));
        assert!(!err.wants_help());
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn usage_error_from_entry_point_wants_help() {
        let err = Error::Execution(UsageError::new("missing target").into());
        assert!(err.wants_help());
        assert_eq!(err.as_usage().map(UsageError::message), Some("missing target"));
    }

    #[test]
    fn exit_code_defaults_to_one() {
        assert_eq!(exit_code(&Ok(())), 0);
        assert_eq!(exit_code(&Err(Error::NoRunMethod)), 1);
        assert_eq!(exit_code(&Err(Error::HelpRequested)), 1);
        assert_eq!(exit_code(&Err(Error::usage("bad"))), 1);
    }

    #[test]
    fn exit_code_found_in_chain() {
        let inner: anyhow::Error = ExitError::msg(3, "not found").into();
        let err = Error::Execution(inner.context("while fetching"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn exit_error_chain_lists_each_cause_once() {
        let cause = anyhow::anyhow!("disk full").context("saving index");
        let err: anyhow::Error = ExitError::new(4, cause).into();
        assert_eq!(format!("{err:#}"), "saving index: disk full");
        assert_eq!(err.chain().count(), 2);
        assert_eq!(Error::Execution(err).exit_code(), 4);
    }

    #[test]
    fn exit_error_displays_source() {
        let err = ExitError::msg(42, "quota exceeded");
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(err.code(), 42);
    }
}
