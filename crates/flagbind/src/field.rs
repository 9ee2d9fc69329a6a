//! Field descriptors: metadata plus mutable binding state for one flag.

use std::any::Any;
use std::fmt;

pub(crate) type Setter = Box<dyn Fn(&mut dyn Any, &str) -> Result<(), String>>;
pub(crate) type ArgsSetter = Box<dyn Fn(&mut dyn Any, Vec<String>) -> Result<(), String>>;

/// Declarative description of one flag, before it is attached to a field.
///
/// ```
/// use flagbind::FieldSpec;
///
/// let spec = FieldSpec::new("port")
///     .short('p')
///     .env("APP_PORT")
///     .default("8080")
///     .help("port to listen on");
/// assert_eq!(spec.name(), "port");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) short: Option<String>,
    pub(crate) env: Option<String>,
    pub(crate) required: bool,
    pub(crate) default: Option<String>,
    pub(crate) help: String,
    pub(crate) placeholder: Option<String>,
    pub(crate) hidden: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn short(mut self, alias: impl Into<String>) -> Self {
        self.short = Some(alias.into());
        self
    }

    /// Environment variable consulted when the flag is not given.
    pub fn env(mut self, var: impl Into<String>) -> Self {
        let var = var.into();
        self.env = (!var.is_empty()).then_some(var);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value applied to the field at build time. Does not count as "set".
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Name shown for the value in help, e.g. `--port <PORT>`.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Keeps the flag out of help output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Which value a descriptor writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Owner {
    /// The command's built-in flags (help).
    Internal,
    /// The user's record.
    Record,
}

/// A bound flag: its spec, its value adapter and how often it was set.
pub struct FieldDescriptor {
    spec: FieldSpec,
    has_argument: bool,
    set_count: usize,
    pub(crate) owner: Owner,
    setter: Setter,
}

impl FieldDescriptor {
    pub(crate) fn new(spec: FieldSpec, has_argument: bool, setter: Setter) -> Self {
        Self {
            spec,
            has_argument,
            set_count: 0,
            owner: Owner::Record,
            setter,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn short(&self) -> Option<&str> {
        self.spec.short.as_deref()
    }

    pub fn env_var(&self) -> Option<&str> {
        self.spec.env.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.spec.required
    }

    pub fn default_value(&self) -> Option<&str> {
        self.spec.default.as_deref()
    }

    pub fn help(&self) -> &str {
        &self.spec.help
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.spec.placeholder.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.spec.hidden
    }

    /// False for switches such as `bool` fields.
    pub fn has_argument(&self) -> bool {
        self.has_argument
    }

    /// Number of times a value was applied from a flag or the environment.
    pub fn set_count(&self) -> usize {
        self.set_count
    }

    pub fn is_set(&self) -> bool {
        self.set_count > 0
    }

    /// Applies a user-supplied value and counts it.
    pub(crate) fn apply(&mut self, target: &mut dyn Any, raw: &str) -> Result<(), String> {
        (self.setter)(target, raw)?;
        self.set_count += 1;
        Ok(())
    }

    /// Applies the declared default without counting it.
    pub(crate) fn apply_default(&self, target: &mut dyn Any) -> Result<(), String> {
        match &self.spec.default {
            Some(value) => (self.setter)(target, value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("spec", &self.spec)
            .field("has_argument", &self.has_argument)
            .field("set_count", &self.set_count)
            .finish_non_exhaustive()
    }
}

/// Captures the tokens left after flags as one ordered list.
pub struct PositionalDescriptor {
    name: String,
    setter: ArgsSetter,
}

impl PositionalDescriptor {
    pub(crate) fn new(name: String, setter: ArgsSetter) -> Self {
        Self { name, setter }
    }

    /// Name of the record field holding the arguments.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bind(&self, target: &mut dyn Any, args: Vec<String>) -> Result<(), String> {
        (self.setter)(target, args)
    }
}

impl fmt::Debug for PositionalDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionalDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
