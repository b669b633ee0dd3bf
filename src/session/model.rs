use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::AwsCredentials;
use crate::errors::{Result, VaultedError};
use crate::vault::path::{join_path, segments, split_path};

/// A point-in-time evaluation of one vault along a requested path.
///
/// The outermost session is named after the full requested path; each
/// nested sub-session is named after its own path segment.  A session
/// owns copies of everything it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,

    /// When the session (and any issued credentials) expire, whole seconds.
    pub expiration: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_creds: Option<AwsCredentials>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ssh_keys: BTreeMap<String, String>,

    #[serde(default, rename = "subsessions", skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_sessions: BTreeMap<String, Session>,
}

impl Session {
    /// An empty session expiring at `expiration`.
    pub fn new(name: impl Into<String>, expiration: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            expiration,
            aws_creds: None,
            role: None,
            vars: BTreeMap::new(),
            ssh_keys: BTreeMap::new(),
            sub_sessions: BTreeMap::new(),
        }
    }

    /// Returns `true` once the expiration time has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiration
    }

    /// Descend into nested sub-sessions by slash path.
    pub fn sub_session(&self, path: &str) -> Result<&Session> {
        let mut session = self;
        for segment in segments(path)? {
            session = session
                .sub_sessions
                .get(segment)
                .ok_or_else(|| VaultedError::SubvaultNotFound(segment.to_string()))?;
        }
        Ok(session)
    }

    /// The session for the innermost segment of this session's name,
    /// carrying that full name.
    ///
    /// `build_session` names the outer session after the requested path
    /// and nests one sub-session per remaining segment, so the descent
    /// follows the name rather than whatever sub-sessions exist.  The
    /// innermost level is built from the fully merged configuration, so
    /// this is what gets exported for the requested path as a whole.
    pub fn effective(&self) -> Result<Session> {
        let (_, rest) = split_path(&self.name)?;
        let leaf = if rest.is_empty() {
            self
        } else {
            self.sub_session(&join_path(&rest))?
        };

        let mut effective = leaf.clone();
        effective.name = self.name.clone();
        effective.sub_sessions.clear();
        Ok(effective)
    }
}
