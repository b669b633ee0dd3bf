//! `vaulted shell`: spawn an interactive shell inside a vault session.

use crate::cli::commands::exec::run_with;
use crate::cli::output;
use crate::cli::{load_settings, open_store, session_for_path, Cli};
use crate::errors::Result;
use crate::session::variables::VAULTED_ENV;

/// Execute the `shell` command.
pub fn execute(cli: &Cli, vault: &str) -> Result<()> {
    let settings = load_settings(cli)?;

    if let Ok(active) = std::env::var(VAULTED_ENV) {
        output::warning(&format!(
            "Already inside vault session '{active}', the new session is nested in it"
        ));
    }

    let store = open_store(cli);
    let session = session_for_path(cli, &store, vault)?.effective()?;
    let shell = settings.shell_or(std::env::var("SHELL").ok());

    output::info(&format!(
        "Spawning {shell} for vault '{}' (expires {})",
        session.name,
        session.expiration.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    run_with(&shell, &[], &session.variables())
}
