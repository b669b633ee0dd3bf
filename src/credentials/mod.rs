//! AWS credential types and the pluggable issuance capability.
//!
//! This module provides:
//! - `AwsCredentials`, the id/secret/token triple handed to a shell (`AwsCredentials`)
//! - `AwsKey`, the per-vault policy describing how credentials are obtained
//! - The `CredentialIssuer` trait and its two variants (`issuer`)

pub mod issuer;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

pub use issuer::{
    CredentialIssuer, DirectIssuer, MfaChallenge, MfaIssuer, TokenService,
    UnavailableTokenService,
};

/// Errors reported by a credential issuer.
///
/// These are surfaced to the caller unchanged, wrapped in
/// `VaultedError::CredentialIssuanceFailed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuanceError {
    #[error("an MFA token is required for this vault")]
    MfaRequired,

    #[error("the MFA token was rejected")]
    InvalidMfaToken,

    #[error("credential service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("credential request rejected: {0}")]
    Rejected(String),
}

/// A set of AWS credentials.
///
/// `token` is only present for temporary (STS-issued) credentials.
/// Secret material is wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct AwsCredentials {
    pub id: String,

    pub secret: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AwsCredentials {
    /// Long-lived credentials (no session token).
    pub fn permanent(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            token: None,
        }
    }

    /// Temporary credentials carrying a session token.
    pub fn temporary(
        id: impl Into<String>,
        secret: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            token: Some(token.into()),
        }
    }

    /// Returns `true` if these are temporary credentials.
    pub fn is_temporary(&self) -> bool {
        self.token.is_some()
    }

    /// A copy of these credentials with any session token removed.
    pub fn without_token(&self) -> Self {
        Self::permanent(self.id.clone(), self.secret.clone())
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// AWS key policy attached to a vault.
///
/// Holds the long-lived key plus the settings that decide how session
/// credentials are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsKey {
    #[serde(flatten)]
    pub credentials: AwsCredentials,

    /// Serial number or ARN of the MFA device, if one is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfa: Option<String>,

    /// Role to assume with the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Hand out the long-lived key as-is instead of generating
    /// temporary credentials.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forgo_temp_cred_generation: bool,
}

impl AwsKey {
    pub fn new(credentials: AwsCredentials) -> Self {
        Self {
            credentials,
            mfa: None,
            role: None,
            forgo_temp_cred_generation: false,
        }
    }

    /// A key is usable once both the access key id and secret are set.
    pub fn is_valid(&self) -> bool {
        !self.credentials.id.is_empty() && !self.credentials.secret.is_empty()
    }

    /// The MFA device serial, treating an empty string as unset.
    pub fn mfa_device(&self) -> Option<&str> {
        self.mfa.as_deref().filter(|serial| !serial.is_empty())
    }

    /// Returns `true` when issuing credentials for this key needs an MFA token.
    pub fn requires_mfa(&self) -> bool {
        self.is_valid() && !self.forgo_temp_cred_generation && self.mfa_device().is_some()
    }
}
