//! Integration tests for `#[derive(Record)]`.
//!
//! These check that derived records bind the same way hand-written ones do:
//! names, aliases, defaults, value adapters and capability accessors.

#![allow(dead_code)]

use std::path::PathBuf;

use flagbind::{
    Before, CancellationToken, Cli, Command, EntryPoint, MockEnv, Record, Run, RunContext, Setup,
};

// =============================================================================
// Field binding
// =============================================================================

#[derive(Debug, Default, Record)]
struct Fetch {
    /// Remote to fetch from.
    #[flag(short = 'r', env = "FETCH_REMOTE", default = "origin")]
    remote: String,

    #[flag(default = 3, placeholder = "N")]
    max_depth: u8,

    #[flag(short = 'o', required)]
    output_dir: PathBuf,

    dry_run: bool,

    #[flag(name = "tag", short = 't')]
    tags: Vec<String>,

    timeout: Option<u64>,

    #[flag(hidden)]
    debug_trace: bool,

    #[flag(skip)]
    fetched: usize,
}

fn fetch() -> Command {
    Command::build("fetch", Fetch::default()).unwrap()
}

#[test]
fn fields_become_kebab_case_flags_in_order() {
    let cmd = fetch();
    let names: Vec<_> = cmd.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec![
            "help",
            "remote",
            "max-depth",
            "output-dir",
            "dry-run",
            "tag",
            "timeout",
            "debug-trace"
        ]
    );
}

#[test]
fn attribute_metadata_is_carried() {
    let cmd = fetch();

    let remote = cmd.field("remote").unwrap();
    assert_eq!(remote.short(), Some("r"));
    assert_eq!(remote.env_var(), Some("FETCH_REMOTE"));
    assert_eq!(remote.default_value(), Some("origin"));
    assert_eq!(remote.help(), "Remote to fetch from.");

    assert_eq!(cmd.field("max-depth").unwrap().placeholder(), Some("N"));
    assert!(cmd.field("output-dir").unwrap().is_required());
    assert!(cmd.field("debug-trace").unwrap().is_hidden());
    assert!(!cmd.field("dry-run").unwrap().has_argument());
}

#[test]
fn defaults_applied_at_build() {
    let cmd = fetch();
    let fetch = cmd.config::<Fetch>().unwrap();
    assert_eq!(fetch.remote, "origin");
    assert_eq!(fetch.max_depth, 3);
    assert_eq!(fetch.timeout, None);
}

#[test]
fn value_adapters() {
    let mut cli = Cli::new(fetch()).with_env(MockEnv::new());
    let parsed = cli.parse_args([
        "-o", "/tmp/out", "--dry-run", "-t", "v1", "--tag=v2", "--timeout", "30",
        "--max-depth", "7",
    ]);
    assert!(parsed.error().is_none(), "{:?}", parsed.error());

    let fetch = parsed.config::<Fetch>().unwrap();
    assert_eq!(fetch.output_dir, PathBuf::from("/tmp/out"));
    assert!(fetch.dry_run);
    assert_eq!(fetch.tags, vec!["v1", "v2"]);
    assert_eq!(fetch.timeout, Some(30));
    assert_eq!(fetch.max_depth, 7);
    assert_eq!(parsed.command().field("tag").unwrap().set_count(), 2);
}

#[test]
fn switch_accepts_explicit_value() {
    let mut cli = Cli::new(fetch()).with_env(MockEnv::new());
    let parsed = cli.parse_args(["-o", "x", "--dry-run=false"]);
    assert!(!parsed.config::<Fetch>().unwrap().dry_run);
    assert_eq!(parsed.command().field("dry-run").unwrap().set_count(), 1);
}

#[test]
fn rejected_value_names_the_flag() {
    let mut cli = Cli::new(fetch()).with_env(MockEnv::new());
    let parsed = cli.parse_args(["-o", "x", "--max-depth", "deep"]);
    let message = parsed.error().unwrap().to_string();
    assert!(
        message.starts_with("failed to parse args: invalid value \"deep\" for flag -max-depth:"),
        "{message}"
    );
}

#[derive(Default, Record)]
struct BadDefault {
    #[flag(default = "lots")]
    retries: u8,
}

#[test]
fn bad_default_fails_build() {
    let err = Command::build("retry", BadDefault::default()).unwrap_err();
    assert!(err.to_string().contains("invalid default `lots` for flag `retries`"));
}

#[derive(Default, Record)]
struct ShadowsHelp {
    #[flag(short = 'h')]
    host: String,
}

#[test]
fn alias_colliding_with_help_fails_build() {
    assert!(Command::build("connect", ShadowsHelp::default()).is_err());
}

// =============================================================================
// Capabilities
// =============================================================================

#[derive(Default, Record)]
#[record(run, run_context)]
struct Both;

impl Run for Both {
    fn run(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl RunContext for Both {
    fn run(&mut self, _ctx: &CancellationToken) -> anyhow::Result<()> {
        anyhow::bail!("context entry point should not be chosen")
    }
}

#[test]
fn plain_entry_point_preferred() {
    let mut cli = Cli::new(Command::build("both", Both).unwrap()).with_env(MockEnv::new());
    let parsed = cli.parse_args(Vec::<String>::new());
    assert_eq!(parsed.entry_point(), Some(EntryPoint::Plain));
    assert!(parsed.run().is_ok());
}

#[derive(Default, Record)]
#[record(setup, before)]
struct Toolbox {
    #[flag(skip)]
    prepared: bool,
}

impl Setup for Toolbox {
    fn setup_command(&self, cmd: &mut Command) -> Result<(), flagbind::ConfigShapeError> {
        cmd.set_help("Assorted tools")
            .add_command(Command::build("hammer", ())?)?;
        Ok(())
    }
}

impl Before for Toolbox {
    fn before(&mut self) -> anyhow::Result<()> {
        self.prepared = true;
        Ok(())
    }
}

#[test]
fn setup_and_before_are_wired() {
    let root = Command::build("toolbox", Toolbox::default()).unwrap();
    assert_eq!(root.help(), "Assorted tools");
    assert!(root.find_subcommand("hammer").is_some());

    let mut cli = Cli::new(root).with_env(MockEnv::new());
    let parsed = cli.parse_args(["hammer"]);
    assert_eq!(parsed.command().name(), "hammer");
    assert!(parsed.ancestors()[0].config::<Toolbox>().unwrap().prepared);
}
