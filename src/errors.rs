use thiserror::Error;

use crate::credentials::IssuanceError;

/// Usage error: the caller named something that does not exist or is malformed.
pub const EX_USAGE_ERROR: i32 = 64;
/// The stored data could not be understood.
pub const EX_DATA_ERROR: i32 = 65;
/// A required service or input was unavailable.
pub const EX_UNAVAILABLE: i32 = 69;
/// Retrying may succeed (e.g. a mistyped MFA token).
pub const EX_TEMPORARY_ERROR: i32 = 79;

/// All errors that can occur in Vaulted.
#[derive(Debug, Error)]
pub enum VaultedError {
    // --- Tree / path errors ---
    #[error("Subvault '{0}' not found")]
    SubvaultNotFound(String),

    #[error("Invalid vault path '{0}'")]
    InvalidPath(String),

    #[error("Cannot combine an empty list of vaults")]
    InvalidMergeInput,

    // --- Credential errors ---
    #[error("Failed to issue AWS credentials: {0}")]
    CredentialIssuanceFailed(#[from] IssuanceError),

    // --- Store errors ---
    #[error("Vault '{0}' not found")]
    VaultNotFound(String),

    #[error("Vault '{0}' already exists")]
    VaultAlreadyExists(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("No command specified, use `vaulted exec <vault> -- <command>`")]
    NoCommandSpecified,

    #[error("Child process exited with code {0}")]
    ChildProcessFailed(i32),
}

impl VaultedError {
    /// Process exit code the CLI should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SubvaultNotFound(_)
            | Self::InvalidPath(_)
            | Self::VaultNotFound(_)
            | Self::VaultAlreadyExists(_)
            | Self::NoCommandSpecified => EX_USAGE_ERROR,
            Self::InvalidVaultFormat(_) | Self::SerializationError(_) | Self::ConfigError(_) => {
                EX_DATA_ERROR
            }
            Self::CredentialIssuanceFailed(IssuanceError::InvalidMfaToken) => EX_TEMPORARY_ERROR,
            Self::CredentialIssuanceFailed(_) | Self::UserCancelled => EX_UNAVAILABLE,
            Self::ChildProcessFailed(code) => *code,
            Self::InvalidMergeInput | Self::Io(_) | Self::CommandFailed(_) => 1,
        }
    }
}

/// Convenience type alias for Vaulted results.
pub type Result<T> = std::result::Result<T, VaultedError>;
