//! Attribute parsing for the Record derive macro.
//!
//! Field attributes, `#[flag(...)]`:
//!
//! - `name = "..."`: flag name (default: the field name in kebab-case)
//! - `short = 'x'` or `short = "x"`: short alias
//! - `env = "VAR"`: environment fallback
//! - `default = ...`: string, integer, float or bool literal
//! - `help = "..."`, `placeholder = "..."`
//! - `required`, `hidden`, `skip`, `args`
//!
//! Container attributes, `#[record(...)]`: `run`, `run_context`, `before`,
//! `setup`.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[flag(...)]`.
#[derive(Debug, Clone)]
pub struct FlagAttr {
    pub name: Option<String>,
    pub short: Option<String>,
    pub env: Option<String>,
    pub default: Option<String>,
    pub help: Option<String>,
    pub placeholder: Option<String>,
    pub required: bool,
    pub hidden: bool,
    pub skip: bool,
    /// Captures positional arguments instead of binding a flag.
    pub args: bool,
    pub span: Span,
}

impl Default for FlagAttr {
    fn default() -> Self {
        FlagAttr {
            name: None,
            short: None,
            env: None,
            default: None,
            help: None,
            placeholder: None,
            required: false,
            hidden: false,
            skip: false,
            args: false,
            span: Span::call_site(),
        }
    }
}

impl FlagAttr {
    fn merge(&mut self, content: Punctuated<Meta, Token![,]>) -> Result<()> {
        for meta in content {
            match &meta {
                Meta::Path(p) => {
                    if p.is_ident("required") {
                        self.required = true;
                    } else if p.is_ident("hidden") {
                        self.hidden = true;
                    } else if p.is_ident("skip") {
                        self.skip = true;
                    } else if p.is_ident("args") {
                        self.args = true;
                    } else {
                        return Err(Error::new(
                            p.span(),
                            "unknown flag option. Expected: required, hidden, skip or args",
                        ));
                    }
                }

                Meta::NameValue(nv) => {
                    let slot = if nv.path.is_ident("name") {
                        &mut self.name
                    } else if nv.path.is_ident("short") {
                        &mut self.short
                    } else if nv.path.is_ident("env") {
                        &mut self.env
                    } else if nv.path.is_ident("default") {
                        &mut self.default
                    } else if nv.path.is_ident("help") {
                        &mut self.help
                    } else if nv.path.is_ident("placeholder") {
                        &mut self.placeholder
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown flag attribute. Expected: name, short, env, default, help or placeholder",
                        ));
                    };
                    let allow_any = nv.path.is_ident("default");
                    let allow_char = nv.path.is_ident("short");
                    *slot = Some(literal_value(&nv.value, allow_char, allow_any)?);
                }

                Meta::List(list) => {
                    return Err(Error::new(list.span(), "unexpected list in flag attribute"));
                }
            }
        }
        Ok(())
    }

    /// Rejects combinations that cannot describe a single field.
    pub fn validate(&self) -> Result<()> {
        if self.args {
            let flag_only = self.name.is_some()
                || self.short.is_some()
                || self.env.is_some()
                || self.default.is_some()
                || self.placeholder.is_some()
                || self.required
                || self.hidden;
            if flag_only {
                return Err(Error::new(
                    self.span,
                    "`args` cannot be combined with flag options",
                ));
            }
        }
        if matches!(&self.short, Some(short) if short.is_empty()) {
            return Err(Error::new(self.span, "short alias cannot be empty"));
        }
        Ok(())
    }
}

fn literal_value(value: &Expr, allow_char: bool, allow_any: bool) -> Result<String> {
    let Expr::Lit(ExprLit { lit, .. }) = value else {
        return Err(Error::new(value.span(), "expected a literal"));
    };
    match lit {
        Lit::Str(s) => Ok(s.value()),
        Lit::Char(c) if allow_char => Ok(c.value().to_string()),
        Lit::Int(i) if allow_any => Ok(i.base10_digits().to_string()),
        Lit::Float(f) if allow_any => Ok(f.base10_digits().to_string()),
        Lit::Bool(b) if allow_any => Ok(b.value.to_string()),
        _ if allow_char => Err(Error::new(lit.span(), "expected a char or string literal")),
        _ => Err(Error::new(lit.span(), "expected a string literal")),
    }
}

/// Collects every `#[flag(...)]` on a field, plus its first doc line as help.
pub fn parse_flag_attrs(attrs: &[Attribute]) -> Result<FlagAttr> {
    let mut flag = FlagAttr::default();
    let mut doc = None;

    for attr in attrs {
        if attr.path().is_ident("flag") {
            flag.span = attr.span();
            flag.merge(attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?)?;
        } else if attr.path().is_ident("doc") && doc.is_none() {
            doc = doc_line(attr);
        }
    }

    if flag.help.is_none() {
        flag.help = doc;
    }
    flag.validate()?;
    Ok(flag)
}

fn doc_line(attr: &Attribute) -> Option<String> {
    let Meta::NameValue(nv) = &attr.meta else {
        return None;
    };
    let Expr::Lit(ExprLit {
        lit: Lit::Str(s), ..
    }) = &nv.value
    else {
        return None;
    };
    let line = s.value().trim().to_string();
    (!line.is_empty()).then_some(line)
}

/// Container capabilities from `#[record(...)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordAttr {
    pub run: bool,
    pub run_context: bool,
    pub before: bool,
    pub setup: bool,
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            let Meta::Path(p) = &meta else {
                return Err(Error::new(meta.span(), "expected a capability name"));
            };
            if p.is_ident("run") {
                attr.run = true;
            } else if p.is_ident("run_context") {
                attr.run_context = true;
            } else if p.is_ident("before") {
                attr.before = true;
            } else if p.is_ident("setup") {
                attr.setup = true;
            } else {
                return Err(Error::new(
                    p.span(),
                    "unknown capability. Expected: run, run_context, before or setup",
                ));
            }
        }

        Ok(attr)
    }
}

/// Extract `#[record(...)]` attributes from a container's attributes.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    let mut record = RecordAttr::default();
    for attr in attrs {
        if attr.path().is_ident("record") {
            let parsed = attr.parse_args::<RecordAttr>()?;
            record.run |= parsed.run;
            record.run_context |= parsed.run_context;
            record.before |= parsed.before;
            record.setup |= parsed.setup;
        }
    }
    Ok(record)
}
