//! `vaulted cp`: copy a vault or sub-vault to a new top-level vault.

use tracing::info;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{Result, VaultedError};
use crate::vault::{join_path, resolve, split_path, validate_vault_name, Store};

/// Execute the `cp` command.
pub fn execute(cli: &Cli, old_vault: &str, new_vault: &str) -> Result<()> {
    let store = open_store(cli);
    copy_vault(&store, old_vault, new_vault)?;

    output::success(&format!("Copied '{old_vault}' to '{new_vault}'"));
    Ok(())
}

/// Copy the vault at `old_path` (with its sub-vaults) to `new_name`.
pub fn copy_vault(store: &impl Store, old_path: &str, new_name: &str) -> Result<()> {
    validate_vault_name(new_name)?;
    if store.vault_exists(new_name) {
        return Err(VaultedError::VaultAlreadyExists(new_name.to_string()));
    }

    let (head, rest) = split_path(old_path)?;
    let root = store.open_vault(head)?;
    let source = resolve(&root, &join_path(&rest))?;

    store.seal_vault(new_name, source)?;
    info!(from = old_path, to = new_name, "vault copied");
    Ok(())
}
