//! Projection of a session into shell environment mutations.

use std::collections::{BTreeMap, BTreeSet};
use std::process::Command;

use chrono::SecondsFormat;

use super::model::Session;

pub const VAULTED_ENV: &str = "VAULTED_ENV";
pub const VAULTED_ENV_EXPIRATION: &str = "VAULTED_ENV_EXPIRATION";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SECURITY_TOKEN: &str = "AWS_SECURITY_TOKEN";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Variables to assign and to remove in a target environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    pub set: BTreeMap<String, String>,
    pub unset: BTreeSet<String>,
}

impl Variables {
    /// Apply the plan to a child process before it is spawned.
    pub fn apply(&self, command: &mut Command) {
        for name in &self.unset {
            command.env_remove(name);
        }
        command.envs(&self.set);
    }
}

impl Session {
    /// The environment changes that activate this session.
    ///
    /// Only this session is projected, never its sub-sessions.  Vault
    /// vars are written first so the reserved names always win.
    pub fn variables(&self) -> Variables {
        let mut vars = Variables {
            set: self.vars.clone(),
            unset: BTreeSet::new(),
        };

        vars.set.insert(VAULTED_ENV.into(), self.name.clone());
        vars.set.insert(
            VAULTED_ENV_EXPIRATION.into(),
            self.expiration.to_rfc3339_opts(SecondsFormat::Secs, true),
        );

        if let Some(creds) = &self.aws_creds {
            vars.set.insert(AWS_ACCESS_KEY_ID.into(), creds.id.clone());
            vars.set.insert(AWS_SECRET_ACCESS_KEY.into(), creds.secret.clone());

            match &creds.token {
                Some(token) => {
                    vars.set.insert(AWS_SECURITY_TOKEN.into(), token.clone());
                    vars.set.insert(AWS_SESSION_TOKEN.into(), token.clone());
                }
                None => {
                    // Drop tokens a previously exported temporary session may have left.
                    vars.unset.insert(AWS_SECURITY_TOKEN.into());
                    vars.unset.insert(AWS_SESSION_TOKEN.into());
                }
            }
        }

        vars
    }
}
