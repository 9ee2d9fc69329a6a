//! Command nodes: a record, its derived flags and its subcommands.

use std::collections::HashMap;
use std::fmt;

use crate::binder::{bind_record, validate_names, Binder};
use crate::error::ConfigShapeError;
use crate::field::{FieldDescriptor, FieldSpec, Owner, PositionalDescriptor};
use crate::grammar::FlagGrammar;
use crate::record::Record;

/// Index of the reserved help descriptor in every command's field list.
pub(crate) const HELP_FIELD: usize = 0;

/// Flags every command carries regardless of its record.
#[derive(Debug, Default)]
pub(crate) struct Internal {
    help: bool,
}

impl Record for Internal {
    fn bind(binder: &mut Binder<Self>) {
        binder.field(
            FieldSpec::new("help").short("h").help("show usage help"),
            |r: &mut Self| &mut r.help,
        );
    }
}

/// One level of a command tree.
///
/// A command owns its record and its children. Build leaves first, then
/// attach them with [`subcommand`](Self::subcommand) or
/// [`add_command`](Self::add_command):
///
/// ```
/// use flagbind::Command;
///
/// let root = Command::build("tool", ())?
///     .with_help("Manage things")
///     .subcommand(Command::build("start", ())?)?
///     .subcommand(Command::build("stop", ())?)?;
/// assert_eq!(root.subcommands().count(), 2);
/// # Ok::<(), flagbind::ConfigShapeError>(())
/// ```
pub struct Command {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) description: String,
    pub(crate) config: Box<dyn Record>,
    pub(crate) internal: Internal,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) positional: Option<PositionalDescriptor>,
    pub(crate) grammar: FlagGrammar,
    pub(crate) children: Vec<Command>,
    pub(crate) child_index: HashMap<String, usize>,
}

impl Command {
    /// Builds a command from a record, deriving its flags.
    ///
    /// Runs the record's [`Setup`](crate::Setup) hook, if any, once the flags
    /// are in place.
    pub fn build<C: Record>(name: impl Into<String>, record: C) -> Result<Self, ConfigShapeError> {
        let name = name.into();
        let mut record = record;
        let mut internal = Internal::default();

        let mut fields = bind_record(&mut internal)?.fields;
        for field in &mut fields {
            field.owner = Owner::Internal;
        }

        let bound = bind_record(&mut record)?;
        fields.extend(bound.fields);
        validate_names(&fields)?;

        let grammar = FlagGrammar::new(&fields);
        let mut cmd = Command {
            name,
            help: String::new(),
            description: String::new(),
            config: Box::new(()),
            internal,
            fields,
            positional: bound.positional,
            grammar,
            children: Vec::new(),
            child_index: HashMap::new(),
        };

        if let Some(setup) = record.as_setup() {
            setup.setup_command(&mut cmd)?;
        }
        cmd.config = Box::new(record);

        tracing::debug!(
            command = %cmd.name,
            fields = cmd.fields.len(),
            positional = cmd.positional.is_some(),
            "built command"
        );
        Ok(cmd)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.set_help(help);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.set_description(description);
        self
    }

    pub fn set_help(&mut self, help: impl Into<String>) -> &mut Self {
        self.help = help.into();
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Attaches `child` as a subcommand, builder style.
    pub fn subcommand(mut self, child: Command) -> Result<Self, ConfigShapeError> {
        self.add_command(child)?;
        Ok(self)
    }

    /// Attaches `child` as a subcommand.
    ///
    /// Fails when this command takes positional arguments or already has a
    /// child with the same name.
    pub fn add_command(&mut self, child: Command) -> Result<&mut Self, ConfigShapeError> {
        if self.positional.is_some() {
            return Err(ConfigShapeError::SubcommandWithPositional {
                command: self.name.clone(),
                child: child.name,
            });
        }
        if self.child_index.contains_key(&child.name) {
            return Err(ConfigShapeError::DuplicateCommand {
                command: self.name.clone(),
                child: child.name,
            });
        }
        self.child_index
            .insert(child.name.clone(), self.children.len());
        self.children.push(child);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// First line of the help text, used in command listings.
    pub fn short_help(&self) -> &str {
        self.help.lines().next().unwrap_or_default()
    }

    /// All flags, the built-in help flag first.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn positional(&self) -> Option<&PositionalDescriptor> {
        self.positional.as_ref()
    }

    pub fn grammar(&self) -> &FlagGrammar {
        &self.grammar
    }

    /// Subcommands in registration order.
    pub fn subcommands(&self) -> impl Iterator<Item = &Command> {
        self.children.iter()
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.child_index.get(name).map(|&index| &self.children[index])
    }

    pub fn has_subcommands(&self) -> bool {
        !self.children.is_empty()
    }

    /// The bound record, if it is a `T`.
    pub fn config<T: Record>(&self) -> Option<&T> {
        (*self.config).as_any().downcast_ref::<T>()
    }

    pub fn config_mut<T: Record>(&mut self) -> Option<&mut T> {
        (*self.config).as_any_mut().downcast_mut::<T>()
    }

    /// Value of the built-in help flag after the last parse.
    pub fn help_requested(&self) -> bool {
        self.internal.help
    }

    pub(crate) fn record_mut(&mut self) -> &mut dyn Record {
        &mut *self.config
    }

    /// Follows a trail of child indices down from this command.
    pub(crate) fn descend(&self, path: &[usize]) -> &Command {
        path.iter().fold(self, |cmd, &index| &cmd.children[index])
    }

    pub(crate) fn descend_mut(&mut self, path: &[usize]) -> &mut Command {
        path.iter()
            .fold(self, |cmd, &index| &mut cmd.children[index])
    }

    /// This command's ancestors along `path`, root first, excluding the target.
    pub(crate) fn ancestors(&self, path: &[usize]) -> Vec<&Command> {
        let mut chain = Vec::with_capacity(path.len());
        let mut current = self;
        for &index in path {
            chain.push(current);
            current = &current.children[index];
        }
        chain
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("positional", &self.positional)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
