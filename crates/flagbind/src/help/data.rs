//! Help data extraction from a command and its ancestors.

use serde::Serialize;

use crate::command::Command;
use crate::field::FieldDescriptor;

/// Gap between columns.
const GUTTER: &str = "  ";

#[derive(Debug, Serialize)]
pub(crate) struct HelpData {
    pub about: String,
    pub description: String,
    pub usage: String,
    pub options: Vec<Row>,
    pub commands: Vec<Row>,
}

/// One line of a two-column listing. `padding` aligns `detail` across rows.
#[derive(Debug, Serialize)]
pub(crate) struct Row {
    pub name: String,
    pub padding: String,
    pub detail: String,
}

pub(crate) fn extract_help_data(cmd: &Command, ancestors: &[&Command]) -> HelpData {
    HelpData {
        about: cmd.help().to_string(),
        description: cmd.description().to_string(),
        usage: usage(cmd, ancestors),
        options: option_rows(cmd.fields()),
        commands: command_rows(cmd),
    }
}

/// `root [OPTIONS] child [OPTIONS] <COMMAND>`, one segment per level.
pub(crate) fn usage(cmd: &Command, ancestors: &[&Command]) -> String {
    let mut segments: Vec<String> = ancestors.iter().map(|a| segment(a)).collect();

    let mut last = segment(cmd);
    if cmd.has_subcommands() {
        last.push_str(" <COMMAND>");
    }
    if cmd.positional().is_some() {
        last.push_str(" [ARGS]...");
    }
    segments.push(last);
    segments.join(" ")
}

fn segment(cmd: &Command) -> String {
    if cmd.fields().is_empty() {
        cmd.name().to_string()
    } else {
        format!("{} [OPTIONS]", cmd.name())
    }
}

fn option_rows(fields: &[FieldDescriptor]) -> Vec<Row> {
    let visible: Vec<_> = fields.iter().filter(|f| !f.is_hidden()).collect();

    let flags: Vec<String> = visible.iter().map(|f| flag_column(f)).collect();
    let envs: Vec<String> = visible
        .iter()
        .map(|f| f.env_var().map(|var| format!("{GUTTER}{var}")).unwrap_or_default())
        .collect();
    let flag_width = flags.iter().map(String::len).max().unwrap_or(0);
    let env_width = envs.iter().map(String::len).max().unwrap_or(0);

    visible
        .iter()
        .zip(flags)
        .zip(envs)
        .map(|((field, name), env)| {
            let mut detail = format!("{env:env_width$}");
            if !field.help().is_empty() {
                detail.push_str(GUTTER);
                detail.push_str(field.help());
            }
            detail.push_str(&annotation(field));
            row(name, flag_width, detail)
        })
        .collect()
}

fn flag_column(field: &FieldDescriptor) -> String {
    let mut column = String::new();
    if let Some(short) = field.short() {
        column.push_str(&format!("-{short}, "));
    }
    column.push_str(&format!("--{}", field.name()));
    if field.has_argument() {
        column.push_str(&format!(" <{}>", field.placeholder().unwrap_or("VALUE")));
    }
    column
}

/// `(default: X)` or `(required)`, for flags that take a value.
fn annotation(field: &FieldDescriptor) -> String {
    if !field.has_argument() {
        return String::new();
    }
    match field.default_value() {
        Some(value) if !value.is_empty() && !field.is_required() => {
            format!("{GUTTER}(default: {value})")
        }
        _ if field.is_required() => format!("{GUTTER}(required)"),
        _ => String::new(),
    }
}

fn command_rows(cmd: &Command) -> Vec<Row> {
    let width = cmd
        .subcommands()
        .map(|sub| sub.name().len())
        .max()
        .unwrap_or(0);

    cmd.subcommands()
        .map(|sub| {
            let detail = if sub.short_help().is_empty() {
                String::new()
            } else {
                format!("{GUTTER}{}", sub.short_help())
            };
            row(sub.name().to_string(), width, detail)
        })
        .collect()
}

fn row(name: String, width: usize, detail: String) -> Row {
    let detail = detail.trim_end().to_string();
    let padding = if detail.is_empty() {
        String::new()
    } else {
        " ".repeat(width.saturating_sub(name.len()))
    };
    Row {
        name,
        padding,
        detail,
    }
}
