//! Flag grammar: recognises flag tokens for one command.
//!
//! Accepted forms, for a name or alias `n`:
//!
//! ```text
//! -n value    --n value    -n=value    --n=value
//! -n          --n          (switches only; applies "true")
//! --                       (ends flag parsing)
//! ```
//!
//! Parsing stops at the first token that is not flag-shaped (a lone `-`
//! included). That token and everything after it are the leftovers.

use std::collections::HashMap;

use thiserror::Error;

use crate::field::FieldDescriptor;

/// Why a flag pass failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("flag provided but not defined: -{0}")]
    Undefined(String),

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    #[error("flag needs an argument: -{0}")]
    MissingArgument(String),

    #[error("invalid value {value:?} for flag -{flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
}

/// One command's lookup table from flag spelling to descriptor index.
#[derive(Debug, Default)]
pub struct FlagGrammar {
    lookup: HashMap<String, usize>,
    switches: Vec<bool>,
    leftovers: Vec<String>,
}

impl FlagGrammar {
    /// Builds the grammar over `fields`; names and aliases must already be unique.
    pub(crate) fn new(fields: &[FieldDescriptor]) -> Self {
        let mut lookup = HashMap::new();
        for (index, field) in fields.iter().enumerate() {
            lookup.insert(field.name().to_string(), index);
            if let Some(alias) = field.short() {
                lookup.insert(alias.to_string(), index);
            }
        }
        Self {
            lookup,
            switches: fields.iter().map(|f| !f.has_argument()).collect(),
            leftovers: Vec::new(),
        }
    }

    /// Descriptor index for a name or alias.
    pub fn resolve(&self, spelling: &str) -> Option<usize> {
        self.lookup.get(spelling).copied()
    }

    /// Tokens not consumed by the last [`parse`](Self::parse), in order.
    pub fn leftovers(&self) -> &[String] {
        &self.leftovers
    }

    /// Runs a flag pass over `args`.
    ///
    /// `apply` receives the descriptor index and raw value of every flag, in
    /// order; its error aborts the pass.
    pub(crate) fn parse<F>(&mut self, args: &[String], mut apply: F) -> Result<(), GrammarError>
    where
        F: FnMut(usize, &str) -> Result<(), String>,
    {
        self.leftovers.clear();
        let mut index = 0;

        while index < args.len() {
            let token = &args[index];
            if token.len() < 2 || !token.starts_with('-') {
                break;
            }
            index += 1;
            if token == "--" {
                break;
            }

            let body = token
                .strip_prefix("--")
                .unwrap_or_else(|| &token[1..]);
            if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
                return Err(GrammarError::BadSyntax(token.clone()));
            }

            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let field = self
                .resolve(name)
                .ok_or_else(|| GrammarError::Undefined(name.to_string()))?;

            let value = match inline {
                Some(value) => value,
                None if self.switches[field] => "true",
                None => {
                    let value = args
                        .get(index)
                        .ok_or_else(|| GrammarError::MissingArgument(name.to_string()))?;
                    index += 1;
                    value.as_str()
                }
            };

            tracing::trace!(flag = name, value, "applying flag");
            apply(field, value).map_err(|reason| GrammarError::InvalidValue {
                flag: name.to_string(),
                value: value.to_string(),
                reason,
            })?;
        }

        self.leftovers = args[index..].to_vec();
        Ok(())
    }
}
