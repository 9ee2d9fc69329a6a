//! Field binder: turns a record type into its ordered field descriptors.
//!
//! Binding is a pure step over the record's declarations. The only write is
//! the application of declared defaults to the record being bound.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::error::ConfigShapeError;
use crate::field::{ArgsSetter, FieldDescriptor, FieldSpec, PositionalDescriptor, Setter};
use crate::record::Record;
use crate::value::FlagValue;

/// Collects the field declarations of record type `C`.
///
/// Passed to [`Record::bind`]. Fields are kept in declaration order, which is
/// also the order they appear in help.
pub struct Binder<C> {
    fields: Vec<FieldDescriptor>,
    positional: Vec<PositionalDescriptor>,
    _record: PhantomData<fn(&mut C)>,
}

/// Output of binding one record.
pub(crate) struct Bound {
    pub fields: Vec<FieldDescriptor>,
    pub positional: Option<PositionalDescriptor>,
}

impl<C: Record> Binder<C> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            positional: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Binds a flag to the field returned by `access`.
    pub fn field<T, F>(&mut self, spec: FieldSpec, access: F) -> &mut Self
    where
        T: FlagValue,
        F: Fn(&mut C) -> &mut T + 'static,
    {
        let setter: Setter = Box::new(
            move |target: &mut dyn Any, raw: &str| -> Result<(), String> {
                access(downcast::<C>(target)?).apply(raw)
            },
        );
        self.fields
            .push(FieldDescriptor::new(spec, T::TAKES_ARGUMENT, setter));
        self
    }

    /// Marks the field returned by `access` as the positional-arguments capture.
    pub fn args<F>(&mut self, name: impl Into<String>, access: F) -> &mut Self
    where
        F: Fn(&mut C) -> &mut Vec<String> + 'static,
    {
        let setter: ArgsSetter = Box::new(
            move |target: &mut dyn Any, args: Vec<String>| -> Result<(), String> {
                *access(downcast::<C>(target)?) = args;
                Ok(())
            },
        );
        self.positional
            .push(PositionalDescriptor::new(name.into(), setter));
        self
    }

    fn finish(self, record: &mut C) -> Result<Bound, ConfigShapeError> {
        let mut positional = self.positional.into_iter();
        let first = positional.next();
        if let (Some(first), Some(second)) = (&first, positional.next()) {
            return Err(ConfigShapeError::MultiplePositional {
                first: first.name().to_string(),
                second: second.name().to_string(),
            });
        }

        validate_names(&self.fields)?;

        for field in &self.fields {
            field
                .apply_default(record)
                .map_err(|reason| ConfigShapeError::InvalidDefault {
                    field: field.name().to_string(),
                    value: field.default_value().unwrap_or_default().to_string(),
                    reason,
                })?;
        }

        Ok(Bound {
            fields: self.fields,
            positional: first,
        })
    }
}

/// Derives the descriptors of `record` and applies its declared defaults.
pub(crate) fn bind_record<C: Record>(record: &mut C) -> Result<Bound, ConfigShapeError> {
    let mut binder = Binder::new();
    C::bind(&mut binder);
    binder.finish(record)
}

fn downcast<C: Any>(target: &mut dyn Any) -> Result<&mut C, String> {
    target
        .downcast_mut::<C>()
        .ok_or_else(|| format!("flag is not bound to a {}", type_name::<C>()))
}

/// Checks that every name and alias is well formed and unique.
pub(crate) fn validate_names(fields: &[FieldDescriptor]) -> Result<(), ConfigShapeError> {
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for field in fields {
        check_name(field.name())?;
        if owners.insert(field.name(), field.name()).is_some() {
            return Err(ConfigShapeError::DuplicateName {
                name: field.name().to_string(),
            });
        }
    }

    for field in fields {
        let Some(alias) = field.short() else {
            continue;
        };
        check_name(alias)?;
        if let Some(other) = owners.get(alias) {
            return Err(ConfigShapeError::AliasCollision {
                field: field.name().to_string(),
                alias: alias.to_string(),
                other: other.to_string(),
            });
        }
        owners.insert(alias, field.name());
    }

    Ok(())
}

fn check_name(name: &str) -> Result<(), ConfigShapeError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.starts_with('-') {
        "name starts with '-'"
    } else if name.contains('=') {
        "name contains '='"
    } else {
        return Ok(());
    };
    Err(ConfigShapeError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
