//! Value adapters: how raw strings become typed field values.
//!
//! Every bindable field type implements [`FlagValue`]. A field whose type has
//! no implementation cannot be bound at all, so a missing adapter is caught
//! by the compiler rather than at build time.

use std::path::PathBuf;

/// Conversion from a raw command-line or environment string into a field.
pub trait FlagValue: 'static {
    /// Whether the flag consumes a value token. `false` makes it a switch:
    /// `--name` alone applies `"true"`.
    const TAKES_ARGUMENT: bool = true;

    /// Applies one raw value to the field.
    ///
    /// Scalars overwrite, collections accumulate.
    fn apply(&mut self, raw: &str) -> Result<(), String>;
}

/// Implements [`FlagValue`] for types whose value comes from [`std::str::FromStr`].
///
/// ```
/// use flagbind::flag_value_from_str;
///
/// #[derive(Debug, Default, PartialEq)]
/// enum Format { #[default] Text, Json }
///
/// impl std::str::FromStr for Format {
///     type Err = String;
///     fn from_str(s: &str) -> Result<Self, String> {
///         match s {
///             "text" => Ok(Format::Text),
///             "json" => Ok(Format::Json),
///             other => Err(format!("unknown format {other:?}")),
///         }
///     }
/// }
///
/// flag_value_from_str!(Format);
/// ```
#[macro_export]
macro_rules! flag_value_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::FlagValue for $ty {
                fn apply(&mut self, raw: &str) -> ::std::result::Result<(), ::std::string::String> {
                    *self = raw
                        .parse::<$ty>()
                        .map_err(|err| ::std::string::ToString::to_string(&err))?;
                    Ok(())
                }
            }
        )+
    };
}

flag_value_from_str!(
    String, PathBuf, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64
);

impl FlagValue for bool {
    const TAKES_ARGUMENT: bool = false;

    fn apply(&mut self, raw: &str) -> Result<(), String> {
        *self = parse_bool(raw)?;
        Ok(())
    }
}

impl<T: FlagValue + Default> FlagValue for Option<T> {
    const TAKES_ARGUMENT: bool = T::TAKES_ARGUMENT;

    fn apply(&mut self, raw: &str) -> Result<(), String> {
        let mut value = T::default();
        value.apply(raw)?;
        *self = Some(value);
        Ok(())
    }
}

impl<T: FlagValue + Default> FlagValue for Vec<T> {
    const TAKES_ARGUMENT: bool = T::TAKES_ARGUMENT;

    fn apply(&mut self, raw: &str) -> Result<(), String> {
        let mut value = T::default();
        value.apply(raw)?;
        self.push(value);
        Ok(())
    }
}

/// Accepts `1`, `t`, `true` and `0`, `f`, `false` in lower, upper and title case.
pub(crate) fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(format!("invalid boolean {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_parse() {
        let mut port = 0u16;
        port.apply("8080").unwrap();
        assert_eq!(port, 8080);
        assert!(port.apply("http").is_err());
        assert!(port.apply("70000").is_err());
    }

    #[test]
    fn strings_and_paths() {
        let mut name = String::new();
        name.apply("alice").unwrap();
        assert_eq!(name, "alice");

        let mut path = PathBuf::new();
        path.apply("/tmp/x").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn bool_is_a_switch() {
        assert!(!bool::TAKES_ARGUMENT);
        assert!(String::TAKES_ARGUMENT);

        let mut flag = false;
        flag.apply("true").unwrap();
        assert!(flag);
        flag.apply("F").unwrap();
        assert!(!flag);
        assert!(flag.apply("yes").is_err());
    }

    #[test]
    fn option_wraps_inner() {
        let mut level: Option<u8> = None;
        level.apply("3").unwrap();
        assert_eq!(level, Some(3));
        assert!(!<Option<bool>>::TAKES_ARGUMENT);
    }

    #[test]
    fn vec_accumulates() {
        let mut tags: Vec<String> = Vec::new();
        tags.apply("a").unwrap();
        tags.apply("b").unwrap();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn failed_apply_leaves_value() {
        let mut count = 7u32;
        assert!(count.apply("-1").is_err());
        assert_eq!(count, 7);
    }
}
