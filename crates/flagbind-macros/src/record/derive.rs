//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates an implementation of `flagbind::Record` whose `bind` declares
//! one flag per field, in declaration order, and whose capability accessors
//! follow the container's `#[record(...)]` attribute.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_flag_attrs, parse_record_attrs, FlagAttr};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut binds: Vec<TokenStream> = Vec::new();
    let mut args_field: Option<&syn::Ident> = None;

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let attrs = parse_flag_attrs(&field.attrs)?;

        if attrs.skip {
            continue;
        }

        let display = field_name.unraw().to_string();

        if attrs.args {
            if let Some(first) = args_field {
                return Err(Error::new(
                    field_name.span(),
                    format!("only one field may capture arguments; `{first}` already does"),
                ));
            }
            args_field = Some(field_name);
            binds.push(quote! {
                binder.args(#display, |r: &mut Self| &mut r.#field_name);
            });
            continue;
        }

        let spec = field_spec(&attrs, &to_kebab_case(&display));
        binds.push(quote! {
            binder.field(#spec, |r: &mut Self| &mut r.#field_name);
        });
    }

    let record = parse_record_attrs(&input.attrs)?;
    let mut accessors: Vec<TokenStream> = Vec::new();
    if record.run {
        accessors.push(quote! {
            fn as_run(&mut self) -> ::core::option::Option<&mut dyn ::flagbind::Run> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if record.run_context {
        accessors.push(quote! {
            fn as_run_context(&mut self) -> ::core::option::Option<&mut dyn ::flagbind::RunContext> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if record.before {
        accessors.push(quote! {
            fn as_before(&mut self) -> ::core::option::Option<&mut dyn ::flagbind::Before> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if record.setup {
        accessors.push(quote! {
            fn as_setup(&self) -> ::core::option::Option<&dyn ::flagbind::Setup> {
                ::core::option::Option::Some(self)
            }
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::flagbind::Record for #struct_name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn bind(binder: &mut ::flagbind::Binder<Self>) {
                #(#binds)*
            }

            #(#accessors)*
        }
    };

    Ok(expanded)
}

/// Builder chain for one field's `FieldSpec`.
fn field_spec(attrs: &FlagAttr, default_name: &str) -> TokenStream {
    let name = attrs.name.as_deref().unwrap_or(default_name);
    let mut spec = quote! { ::flagbind::FieldSpec::new(#name) };

    if let Some(short) = &attrs.short {
        spec = quote! { #spec.short(#short) };
    }
    if let Some(env) = &attrs.env {
        spec = quote! { #spec.env(#env) };
    }
    if attrs.required {
        spec = quote! { #spec.required() };
    }
    if let Some(default) = &attrs.default {
        spec = quote! { #spec.default(#default) };
    }
    if let Some(help) = &attrs.help {
        spec = quote! { #spec.help(#help) };
    }
    if let Some(placeholder) = &attrs.placeholder {
        spec = quote! { #spec.placeholder(#placeholder) };
    }
    if attrs.hidden {
        spec = quote! { #spec.hidden() };
    }
    spec
}

/// Convert a field name to kebab-case.
fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('-');
            }
            result.push(c.to_ascii_lowercase());
            prev_was_lower = false;
        } else if c == '_' {
            if !result.is_empty() {
                result.push('-');
            }
            prev_was_lower = false;
        } else {
            result.push(c);
            prev_was_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: DeriveInput) -> String {
        record_derive_impl(input).unwrap().to_string()
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("port"), "port");
        assert_eq!(to_kebab_case("dry_run"), "dry-run");
        assert_eq!(to_kebab_case("maxRetries"), "max-retries");
        assert_eq!(to_kebab_case("_private"), "private");
    }

    #[test]
    fn test_fields_bound_in_order() {
        let output = expand(parse_quote! {
            struct Serve {
                #[flag(short = 'p', env = "PORT", default = 8080)]
                listen_port: u16,
                verbose: bool,
            }
        });
        let port = output.find("\"listen-port\"").unwrap();
        let verbose = output.find("\"verbose\"").unwrap();
        assert!(port < verbose);
        assert!(output.contains(". short (\"p\")"));
        assert!(output.contains(". env (\"PORT\")"));
        assert!(output.contains(". default (\"8080\")"));
    }

    #[test]
    fn test_raw_identifier_name() {
        let output = expand(parse_quote! {
            struct Query {
                r#type: String,
            }
        });
        assert!(output.contains("\"type\""));
    }

    #[test]
    fn test_skip_and_args() {
        let output = expand(parse_quote! {
            struct Cat {
                #[flag(skip)]
                cache: Vec<u8>,
                #[flag(args)]
                files: Vec<String>,
            }
        });
        assert!(!output.contains("cache"));
        assert!(output.contains("binder . args (\"files\""));
    }

    #[test]
    fn test_capability_accessors() {
        let output = expand(parse_quote! {
            #[record(run_context, before)]
            struct Watch {}
        });
        assert!(output.contains("fn as_run_context"));
        assert!(output.contains("fn as_before"));
        assert!(!output.contains("fn as_run ("));
        assert!(!output.contains("fn as_setup"));
    }

    #[test]
    fn test_two_args_fields_rejected() {
        let result = record_derive_impl(parse_quote! {
            struct Bad {
                #[flag(args)]
                a: Vec<String>,
                #[flag(args)]
                b: Vec<String>,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_rejected() {
        let result = record_derive_impl(parse_quote! {
            enum Mode { Fast, Slow }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_struct() {
        let output = expand(parse_quote! {
            #[record(run)]
            struct Version;
        });
        assert!(output.contains("impl :: flagbind :: Record for Version"));
    }
}
