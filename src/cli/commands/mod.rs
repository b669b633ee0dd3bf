//! One module per subcommand.

pub mod completions;
pub mod cp;
pub mod env;
pub mod exec;
pub mod list;
pub mod shell;
