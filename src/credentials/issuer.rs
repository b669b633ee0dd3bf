//! Credential issuance.
//!
//! The session builder never talks to AWS directly.  It is handed a
//! `CredentialIssuer`, of which there are exactly two variants:
//!
//! - `DirectIssuer`: issues without any user interaction.
//! - `MfaIssuer`: carries an MFA token that was obtained out-of-band
//!   before the build started.
//!
//! Both delegate the actual token minting to a `TokenService`, which is
//! where an STS client plugs in.

use std::time::Duration;

use tracing::debug;
use zeroize::Zeroizing;

use super::{AwsCredentials, AwsKey, IssuanceError};

/// Issues AWS credentials for a key policy and a requested lifetime.
pub trait CredentialIssuer {
    fn issue(&self, key: &AwsKey, duration: Duration) -> Result<AwsCredentials, IssuanceError>;
}

/// MFA device serial plus the one-time code read from it.
#[derive(Debug, Clone, Copy)]
pub struct MfaChallenge<'a> {
    pub serial: &'a str,
    pub token: &'a str,
}

/// A service able to mint temporary credentials (e.g. AWS STS).
pub trait TokenService {
    /// Exchange long-lived credentials for session credentials.
    fn session_token(
        &self,
        credentials: &AwsCredentials,
        mfa: Option<MfaChallenge<'_>>,
        duration: Duration,
    ) -> Result<AwsCredentials, IssuanceError>;

    /// Assume `role` using the long-lived credentials.
    fn assume_role(
        &self,
        credentials: &AwsCredentials,
        role: &str,
        mfa: Option<MfaChallenge<'_>>,
        duration: Duration,
    ) -> Result<AwsCredentials, IssuanceError>;
}

/// Token service used when no STS backend is wired in.
///
/// Long-lived keys (`forgo_temp_cred_generation`) never reach it, so
/// they keep working; anything needing temporary credentials fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTokenService;

const NO_BACKEND: &str =
    "no STS backend is configured, set forgo_temp_cred_generation to use the key as-is";

impl TokenService for UnavailableTokenService {
    fn session_token(
        &self,
        _credentials: &AwsCredentials,
        _mfa: Option<MfaChallenge<'_>>,
        _duration: Duration,
    ) -> Result<AwsCredentials, IssuanceError> {
        Err(IssuanceError::ServiceUnavailable(NO_BACKEND.into()))
    }

    fn assume_role(
        &self,
        _credentials: &AwsCredentials,
        _role: &str,
        _mfa: Option<MfaChallenge<'_>>,
        _duration: Duration,
    ) -> Result<AwsCredentials, IssuanceError> {
        Err(IssuanceError::ServiceUnavailable(NO_BACKEND.into()))
    }
}

/// Issues credentials without user interaction.
#[derive(Debug, Clone)]
pub struct DirectIssuer<S> {
    service: S,
}

impl<S: TokenService> DirectIssuer<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S: TokenService> CredentialIssuer for DirectIssuer<S> {
    fn issue(&self, key: &AwsKey, duration: Duration) -> Result<AwsCredentials, IssuanceError> {
        if key.requires_mfa() {
            return Err(IssuanceError::MfaRequired);
        }
        issue_with(&self.service, key, None, duration)
    }
}

/// Issues credentials using an MFA token supplied up front.
pub struct MfaIssuer<S> {
    service: S,
    token: Zeroizing<String>,
}

impl<S: TokenService> MfaIssuer<S> {
    pub fn new(service: S, token: impl Into<String>) -> Self {
        Self {
            service,
            token: Zeroizing::new(token.into()),
        }
    }
}

impl<S: TokenService> CredentialIssuer for MfaIssuer<S> {
    fn issue(&self, key: &AwsKey, duration: Duration) -> Result<AwsCredentials, IssuanceError> {
        let challenge = key.mfa_device().map(|serial| MfaChallenge {
            serial,
            token: self.token.as_str(),
        });
        issue_with(&self.service, key, challenge, duration)
    }
}

/// Shared issuance path for both variants.
fn issue_with<S: TokenService>(
    service: &S,
    key: &AwsKey,
    mfa: Option<MfaChallenge<'_>>,
    duration: Duration,
) -> Result<AwsCredentials, IssuanceError> {
    if key.forgo_temp_cred_generation {
        debug!(access_key = %key.credentials.id, "using long-lived AWS key as-is");
        return Ok(key.credentials.without_token());
    }

    match key.role.as_deref().filter(|role| !role.is_empty()) {
        Some(role) => {
            debug!(role, mfa = mfa.is_some(), ?duration, "assuming AWS role");
            service.assume_role(&key.credentials, role, mfa, duration)
        }
        None => {
            debug!(mfa = mfa.is_some(), ?duration, "requesting AWS session token");
            service.session_token(&key.credentials, mfa, duration)
        }
    }
}
