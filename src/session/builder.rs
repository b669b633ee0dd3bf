//! Session construction over a vault tree.
//!
//! `build_session(root, "root/child/leaf", issuer)` evaluates every
//! level of the path: the root on its own, then the root merged with
//! `child`, then that merged with `leaf`.  Each level becomes a session,
//! and each nested level hangs off its parent's `sub_sessions`.
//!
//! The whole path is resolved before any credentials are issued, and a
//! failure at any level returns an error with no session at all.

use std::time::Duration;

use chrono::{SubsecRound, Utc};
use tracing::debug;

use super::model::Session;
use crate::credentials::CredentialIssuer;
use crate::errors::{Result, VaultedError};
use crate::vault::merge::merge_from;
use crate::vault::path::{join_path, split_path};
use crate::vault::tree::resolve_path;
use crate::vault::Vault;

/// Credential lifetime used when the effective vault leaves it unset.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(60 * 60);

/// Build the session tree for `path`, whose first segment names `root`.
pub fn build_session<I>(root: &Vault, path: &str, issuer: &I) -> Result<Session>
where
    I: CredentialIssuer + ?Sized,
{
    let (_, rest) = split_path(path)?;
    let chain = resolve_path(root, &join_path(&rest))?;
    let levels: Vec<(&str, &Vault)> = rest.into_iter().zip(chain).collect();

    debug!(path, depth = levels.len(), "building session");
    build_level(root.settings_only(), path, &levels, issuer)
}

/// Construct the session for `effective`, then recurse into the next level.
fn build_level<I>(
    effective: Vault,
    name: &str,
    remaining: &[(&str, &Vault)],
    issuer: &I,
) -> Result<Session>
where
    I: CredentialIssuer + ?Sized,
{
    let mut session = construct_session(&effective, name, issuer)?;

    if let Some(((segment, child), rest)) = remaining.split_first() {
        let merged = merge_from(&effective, child);
        let sub_session = build_level(merged, segment, rest, issuer)?;
        session.sub_sessions.insert((*segment).to_string(), sub_session);
    }

    Ok(session)
}

/// Materialize a single session from an (already merged) vault.
///
/// Credentials are only requested when the vault carries a valid AWS
/// key policy; an issuance failure is returned unchanged.
pub fn construct_session<I>(vault: &Vault, name: &str, issuer: &I) -> Result<Session>
where
    I: CredentialIssuer + ?Sized,
{
    let duration = if vault.duration.is_zero() {
        DEFAULT_SESSION_DURATION
    } else {
        vault.duration
    };

    let mut session = Session::new(name, Utc::now());
    session.vars = vault.vars.clone();
    session.ssh_keys = vault.ssh_keys.clone();

    if let Some(key) = vault.aws_key.as_deref().filter(|key| key.is_valid()) {
        debug!(session = name, ?duration, "issuing AWS credentials");
        session.aws_creds = Some(issuer.issue(key, duration)?);
        session.role = key.role.clone();
    }

    // The clock starts once credentials are in hand.
    let too_large =
        || VaultedError::InvalidVaultFormat(format!("duration {duration:?} is too large"));
    let lifetime = chrono::Duration::from_std(duration).map_err(|_| too_large())?;
    session.expiration = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or_else(too_large)?
        .trunc_subsecs(0);

    Ok(session)
}

impl Vault {
    /// Build the session tree for `path`; see [`build_session`].
    pub fn create_session<I>(&self, path: &str, issuer: &I) -> Result<Session>
    where
        I: CredentialIssuer + ?Sized,
    {
        build_session(self, path, issuer)
    }
}
