//! Help rendering functions.

use minijinja::Environment;
use once_cell::sync::Lazy;

use crate::command::Command;

use super::data::{extract_help_data, HelpData};

const TEMPLATE_NAME: &str = "help.txt";

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    if let Err(err) = env.add_template(TEMPLATE_NAME, include_str!("help.txt")) {
        tracing::warn!(%err, "invalid help template");
    }
    env
});

/// Renders the help for `cmd`.
///
/// `ancestors` lists the commands above `cmd`, root first; they contribute
/// to the usage line only.
pub fn render_help(cmd: &Command, ancestors: &[&Command]) -> String {
    let data = extract_help_data(cmd, ancestors);
    match render(&data) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%err, command = cmd.name(), "failed to render help");
            format!("USAGE:\n    {}\n", data.usage)
        }
    }
}

fn render(data: &HelpData) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template(TEMPLATE_NAME)?.render(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Binder;
    use crate::field::FieldSpec;
    use crate::record::Record;

    #[derive(Default)]
    struct Ls {
        all: bool,
        paths: Vec<String>,
    }

    impl Record for Ls {
        fn bind(binder: &mut Binder<Self>) {
            binder
                .field(FieldSpec::new("all").short("a").help("include hidden"), |r: &mut Self| {
                    &mut r.all
                })
                .args("paths", |r: &mut Self| &mut r.paths);
        }
    }

    #[test]
    fn leaf_with_positional() {
        let root = Command::build("fs", ())
            .unwrap()
            .subcommand(Command::build("ls", Ls::default()).unwrap().with_help("List files"))
            .unwrap();
        let ls = root.find_subcommand("ls").unwrap();

        assert_eq!(
            render_help(ls, &[&root]),
            "List files\n\
             \n\
             USAGE:\n    fs [OPTIONS] ls [OPTIONS] [ARGS]...\n\
             \n\
             OPTIONS:\n    \
             -h, --help  show usage help\n    \
             -a, --all   include hidden\n"
        );
    }

    #[test]
    fn group_lists_commands() {
        let root = Command::build("fs", ())
            .unwrap()
            .with_help("File tools")
            .with_description("Works on the local disk.")
            .subcommand(Command::build("ls", Ls::default()).unwrap().with_help("List files"))
            .unwrap();

        assert_eq!(
            render_help(&root, &[]),
            "File tools\n\
             \n\
             Works on the local disk.\n\
             \n\
             USAGE:\n    fs [OPTIONS] <COMMAND>\n\
             \n\
             OPTIONS:\n    \
             -h, --help  show usage help\n\
             \n\
             COMMANDS:\n    \
             ls  List files\n"
        );
    }
}
