//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::config::Settings;
use crate::credentials::{
    AwsKey, CredentialIssuer, DirectIssuer, IssuanceError, MfaIssuer, UnavailableTokenService,
};
use crate::errors::{Result, VaultedError};
use crate::session::{build_session, Session};
use crate::vault::{combine_all, join_path, resolve_path, split_path, FileStore, Store, Vault};

/// Vaulted CLI: spawn environments from hierarchical vaults.
#[derive(Parser)]
#[command(
    name = "vaulted",
    about = "Spawn shell sessions from hierarchical vaults of secrets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding vault files and vaulted.toml
    #[arg(long, env = "VAULTED_DIR", default_value = ".vaulted", global = true)]
    pub vault_dir: String,

    /// MFA token to use when issuing AWS credentials
    #[arg(long, env = "VAULTED_MFA_TOKEN", hide_env_values = true, global = true)]
    pub mfa_token: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// List every vault and sub-vault path
    #[command(alias = "ls")]
    List,

    /// Print a script that loads a vault session into the current shell
    Env {
        /// Vault path (e.g. prod/admin)
        vault: String,

        /// Output format: sh, fish or json (default from vaulted.toml, else sh)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Spawn a shell with a vault session loaded
    Shell {
        /// Vault path (e.g. prod/admin)
        vault: String,
    },

    /// Run a command with a vault session loaded
    Exec {
        /// Vault path (e.g. prod/admin)
        vault: String,

        /// Command and arguments (after --)
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Copy a vault (or sub-vault) to a new top-level vault
    #[command(alias = "copy")]
    Cp {
        /// Source vault path (e.g. prod/admin)
        old_vault: String,

        /// Name of the new vault
        new_vault: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// The vault directory from the CLI arguments.
pub fn vault_dir(cli: &Cli) -> PathBuf {
    PathBuf::from(&cli.vault_dir)
}

/// The store backing the CLI.
pub fn open_store(cli: &Cli) -> FileStore {
    FileStore::new(vault_dir(cli))
}

/// Settings from `<vault_dir>/vaulted.toml` (defaults if absent).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&vault_dir(cli))
}

/// Load the root vault named by the first segment of `path` and build
/// the session tree for the whole path.
pub fn session_for_path(cli: &Cli, store: &impl Store, path: &str) -> Result<Session> {
    let (head, _) = split_path(path)?;
    let root = store.open_vault(head)?;

    let token = match cli.mfa_token.clone().filter(|t| !t.is_empty()) {
        Some(token) => Some(token),
        None if requires_mfa(&root, path)? => Some(prompt_mfa_token()?),
        None => None,
    };

    let issuer: Box<dyn CredentialIssuer> = match token {
        Some(token) => Box::new(MfaIssuer::new(UnavailableTokenService, token)),
        None => Box::new(DirectIssuer::new(UnavailableTokenService)),
    };

    build_session(&root, path, issuer.as_ref())
}

/// Returns `true` if any level along `path` issues credentials that need MFA.
pub fn requires_mfa(root: &Vault, path: &str) -> Result<bool> {
    let (_, rest) = split_path(path)?;
    let mut levels = vec![root];
    levels.extend(resolve_path(root, &join_path(&rest))?);

    for depth in 1..=levels.len() {
        let effective = combine_all(&levels[..depth])?;
        if effective.aws_key.as_deref().is_some_and(AwsKey::requires_mfa) {
            debug!(path, depth, "MFA required");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Ask for an MFA token on the terminal.
pub fn prompt_mfa_token() -> Result<String> {
    let token: String = dialoguer::Input::new()
        .with_prompt("MFA token")
        .interact_text()
        .map_err(|_| VaultedError::CredentialIssuanceFailed(IssuanceError::MfaRequired))?;

    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(VaultedError::CredentialIssuanceFailed(
            IssuanceError::MfaRequired,
        ));
    }
    Ok(token)
}
