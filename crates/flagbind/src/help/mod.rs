//! Help text for a command.
//!
//! - [`render_help`]: render the help of a command, given its ancestors
//!
//! The layout is a fixed template:
//!
//! ```text
//! HELP
//!
//! DESCRIPTION
//!
//! USAGE:
//!     tool [OPTIONS] serve [OPTIONS] <COMMAND>
//!
//! OPTIONS:
//!     -h, --help               show usage help
//!     -p, --port <PORT>  PORT  port to bind  (default: 8080)
//!
//! COMMANDS:
//!     http  serve over http
//! ```

pub(crate) mod data;
mod render;

pub use render::render_help;
