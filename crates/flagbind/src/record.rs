//! Configuration records and their optional capabilities.
//!
//! A record is any `'static` type whose fields can be bound to flags. What it
//! can *do* is expressed through independent capability traits rather than a
//! base type:
//!
//! | Capability     | Trait          | Accessor on [`Record`]  |
//! |----------------|----------------|-------------------------|
//! | Plain run      | [`Run`]        | `as_run`                |
//! | Cancellable run| [`RunContext`] | `as_run_context`        |
//! | Pre-run hook   | [`Before`]     | `as_before`             |
//! | Command setup  | [`Setup`]      | `as_setup`              |
//!
//! Each accessor returns `None` by default. `#[derive(Record)]` overrides the
//! ones named in `#[record(...)]`; hand-written impls return `Some(self)`.
//!
//! ```
//! use flagbind::{Binder, FieldSpec, Record, Run};
//!
//! #[derive(Default)]
//! struct Greet {
//!     name: String,
//! }
//!
//! impl Record for Greet {
//!     fn bind(binder: &mut Binder<Self>) {
//!         binder.field(FieldSpec::new("name").short("n"), |r: &mut Self| &mut r.name);
//!     }
//!
//!     fn as_run(&mut self) -> Option<&mut dyn Run> {
//!         Some(self)
//!     }
//! }
//!
//! impl Run for Greet {
//!     fn run(&mut self) -> anyhow::Result<()> {
//!         println!("hello {}", self.name);
//!         Ok(())
//!     }
//! }
//! ```

use std::any::Any;

use tokio_util::sync::CancellationToken;

use crate::binder::Binder;
use crate::command::Command;
use crate::error::ConfigShapeError;

/// Upcast helper so records can be downcast back to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A configuration record bound to a [`Command`].
pub trait Record: AsAny {
    /// Declares the record's bindable fields, in order.
    fn bind(binder: &mut Binder<Self>)
    where
        Self: Sized,
    {
        let _ = binder;
    }

    fn as_run(&mut self) -> Option<&mut dyn Run> {
        None
    }

    fn as_run_context(&mut self) -> Option<&mut dyn RunContext> {
        None
    }

    fn as_before(&mut self) -> Option<&mut dyn Before> {
        None
    }

    fn as_setup(&self) -> Option<&dyn Setup> {
        None
    }
}

/// The empty record, for grouping commands that only hold subcommands.
impl Record for () {}

/// Entry point that ignores cancellation.
pub trait Run {
    fn run(&mut self) -> anyhow::Result<()>;
}

/// Entry point that observes a cancellation context.
pub trait RunContext {
    fn run(&mut self, ctx: &CancellationToken) -> anyhow::Result<()>;
}

/// Hook invoked after a command's flags are bound and validated, before any
/// subcommand is parsed or the entry point runs.
pub trait Before {
    fn before(&mut self) -> anyhow::Result<()>;
}

/// Hook invoked once while the command is being built.
///
/// Typical uses are setting help text and attaching subcommands.
pub trait Setup {
    fn setup_command(&self, cmd: &mut Command) -> Result<(), ConfigShapeError>;
}

/// How a resolved command will be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// [`Run`]: the dispatched context is dropped.
    Plain,
    /// [`RunContext`]: receives the live context.
    Context,
}

impl EntryPoint {
    /// Inspects a record's capabilities. [`Run`] wins when both are present.
    pub fn of(record: &mut dyn Record) -> Option<Self> {
        if record.as_run().is_some() {
            Some(EntryPoint::Plain)
        } else if record.as_run_context().is_some() {
            Some(EntryPoint::Context)
        } else {
            None
        }
    }

    pub fn supports_context(self) -> bool {
        self == EntryPoint::Context
    }

    /// Runs the record through this entry point.
    pub(crate) fn invoke(
        self,
        record: &mut dyn Record,
        ctx: &CancellationToken,
    ) -> Option<anyhow::Result<()>> {
        match self {
            EntryPoint::Plain => record.as_run().map(|runner| runner.run()),
            EntryPoint::Context => record.as_run_context().map(|runner| runner.run(ctx)),
        }
    }
}
