//! `vaulted exec`: run a command inside a vault session.

use std::process::Command;

use tracing::debug;

use crate::cli::{open_store, session_for_path, Cli};
use crate::errors::{Result, VaultedError};
use crate::session::Variables;

/// Execute the `exec` command.
pub fn execute(cli: &Cli, vault: &str, command: &[String]) -> Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or(VaultedError::NoCommandSpecified)?;

    let store = open_store(cli);
    let session = session_for_path(cli, &store, vault)?.effective()?;

    run_with(program, args, &session.variables())
}

/// Spawn `program` with the variable plan applied and forward its exit code.
pub(crate) fn run_with(program: &str, args: &[String], vars: &Variables) -> Result<()> {
    debug!(program, set = vars.set.len(), unset = vars.unset.len(), "spawning");

    let mut cmd = Command::new(program);
    cmd.args(args);
    vars.apply(&mut cmd);

    let status = cmd
        .status()
        .map_err(|e| VaultedError::CommandFailed(format!("failed to run '{program}': {e}")))?;

    // Forward the child's exit code.
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(VaultedError::ChildProcessFailed(code)),
        None => Err(VaultedError::CommandFailed(
            "child process terminated by signal".into(),
        )),
    }
}
