//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use flagbind::{Before, Cli, Command, MockEnv, Record, Run};

// =============================================================================
// Output capture
// =============================================================================

/// Cloneable in-memory writer; every clone appends to the same buffer.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("captured output is utf-8")
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Shared record of which hooks and entry points ran, in order.
pub type Journal = Rc<RefCell<Vec<String>>>;

// =============================================================================
// A three-level tree: app -> remote -> add
// =============================================================================

#[derive(Default, Record)]
#[record(before)]
pub struct App {
    #[flag(short = 'v', help = "print more")]
    pub verbose: bool,
    #[flag(skip)]
    pub journal: Journal,
}

impl Before for App {
    fn before(&mut self) -> anyhow::Result<()> {
        self.journal.borrow_mut().push("before app".into());
        Ok(())
    }
}

#[derive(Default, Record)]
#[record(before)]
pub struct Remote {
    #[flag(env = "REMOTE_TIMEOUT", default = 30)]
    pub timeout: u32,
    #[flag(skip)]
    pub journal: Journal,
}

impl Before for Remote {
    fn before(&mut self) -> anyhow::Result<()> {
        self.journal.borrow_mut().push("before remote".into());
        Ok(())
    }
}

#[derive(Default, Record)]
#[record(run, before)]
pub struct Add {
    #[flag(short = 'n', env = "REMOTE_NAME", required, help = "remote name")]
    pub name: String,
    #[flag(short = 'u', help = "remote url", placeholder = "URL")]
    pub url: String,
    #[flag(skip)]
    pub journal: Journal,
}

impl Before for Add {
    fn before(&mut self) -> anyhow::Result<()> {
        self.journal.borrow_mut().push("before add".into());
        Ok(())
    }
}

impl Run for Add {
    fn run(&mut self) -> anyhow::Result<()> {
        self.journal.borrow_mut().push(format!("run add {}", self.name));
        Ok(())
    }
}

#[derive(Default, Record)]
pub struct Show {
    #[flag(args)]
    pub names: Vec<String>,
}

pub fn app_tree(journal: &Journal) -> Command {
    let add = Command::build(
        "add",
        Add {
            journal: journal.clone(),
            ..Add::default()
        },
    )
    .expect("add builds")
    .with_help("Add a remote");

    let remote = Command::build(
        "remote",
        Remote {
            journal: journal.clone(),
            ..Remote::default()
        },
    )
    .expect("remote builds")
    .with_help("Manage remotes")
    .subcommand(add)
    .expect("add attaches")
    .subcommand(Command::build("show", Show::default()).expect("show builds"))
    .expect("show attaches");

    Command::build(
        "app",
        App {
            journal: journal.clone(),
            ..App::default()
        },
    )
    .expect("app builds")
    .subcommand(remote)
    .expect("remote attaches")
}

/// A `Cli` over [`app_tree`] with a fixed environment and captured sinks.
pub fn app_cli(env: MockEnv) -> (Cli, Journal, Capture, Capture) {
    let journal = Journal::default();
    let help = Capture::default();
    let errors = Capture::default();
    let cli = Cli::new(app_tree(&journal))
        .with_env(env)
        .with_help_writer(help.clone())
        .with_error_writer(errors.clone());
    (cli, journal, help, errors)
}

pub fn journal_entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}
