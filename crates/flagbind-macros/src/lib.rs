//! Procedural macros for flagbind.
//!
//! - [`Record`]: derive `flagbind::Record` from struct field attributes

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `flagbind::Record` for a struct with named fields.
///
/// Every field becomes a flag named after the field in kebab-case, unless it
/// is marked `#[flag(skip)]`. The field's type must implement
/// `flagbind::FlagValue`.
///
/// # Field Attributes
///
/// | Attribute | Meaning |
/// |-----------|---------|
/// | `name = "..."` | Flag name |
/// | `short = 'x'` | Short alias (`-x`) |
/// | `env = "VAR"` | Read `VAR` when the flag is not given |
/// | `default = ...` | Value applied at build time |
/// | `required` | Fail parsing when never set |
/// | `help = "..."` | Help text; defaults to the first doc comment line |
/// | `placeholder = "..."` | Value name in help |
/// | `hidden` | Leave out of help |
/// | `args` | Capture positional arguments (`Vec<String>`) |
/// | `skip` | Not bound |
///
/// # Container Attributes
///
/// `#[record(run, run_context, before, setup)]` wires the matching
/// capability accessors to the type's `Run`, `RunContext`, `Before` and
/// `Setup` implementations.
///
/// # Example
///
/// ```ignore
/// use flagbind::{Record, Run};
///
/// #[derive(Default, Record)]
/// #[record(run)]
/// struct Serve {
///     /// Port to bind.
///     #[flag(short = 'p', env = "PORT", default = 8080)]
///     port: u16,
///     #[flag(args)]
///     routes: Vec<String>,
/// }
///
/// impl Run for Serve {
///     fn run(&mut self) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_derive(Record, attributes(flag, record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
