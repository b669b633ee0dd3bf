//! The `Vault` tree node.
//!
//! A vault owns its sub-vaults by value, so the tree is strict: no
//! sharing and no cycles.  Only the AWS key policy is reference
//! counted, because merging hands the same policy to the merged result
//! instead of copying it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::path::{validate_var_name, validate_vault_name};
use crate::credentials::AwsKey;
use crate::errors::{Result, VaultedError};

/// A configuration node: secrets, SSH keys, AWS policy and sub-vaults.
///
/// All fields are optional on the wire; missing fields deserialize to
/// their zero/empty value and zero/empty fields are not written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Requested credential lifetime. Zero means "use the default".
    #[serde(
        default,
        with = "duration_nanos",
        skip_serializing_if = "Duration::is_zero"
    )]
    pub duration: Duration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_key: Option<Arc<AwsKey>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ssh_keys: BTreeMap<String, String>,

    #[serde(default, rename = "subvaults", skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_vaults: BTreeMap<String, Vault>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_aws_key(mut self, key: AwsKey) -> Self {
        self.aws_key = Some(Arc::new(key));
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with_ssh_key(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.ssh_keys.insert(name.into(), key.into());
        self
    }

    pub fn with_sub_vault(mut self, name: impl Into<String>, vault: Vault) -> Self {
        self.sub_vaults.insert(name.into(), vault);
        self
    }

    /// Look up a direct sub-vault by name.
    pub fn sub_vault(&self, name: &str) -> Result<&Vault> {
        self.sub_vaults
            .get(name)
            .ok_or_else(|| VaultedError::SubvaultNotFound(name.to_string()))
    }

    /// This vault's own settings, without its sub-vaults.
    pub fn settings_only(&self) -> Vault {
        Vault {
            duration: self.duration,
            aws_key: self.aws_key.clone(),
            vars: self.vars.clone(),
            ssh_keys: self.ssh_keys.clone(),
            sub_vaults: BTreeMap::new(),
        }
    }

    /// Returns `true` if a valid AWS key policy is attached.
    pub fn has_aws_key(&self) -> bool {
        self.aws_key.as_deref().is_some_and(AwsKey::is_valid)
    }

    /// Check that every sub-vault name in the tree is addressable by path
    /// and every variable name can be exported by a shell.
    pub fn validate(&self) -> Result<()> {
        for name in self.vars.keys() {
            validate_var_name(name)?;
        }
        for (name, child) in &self.sub_vaults {
            validate_vault_name(name).map_err(|_| {
                VaultedError::InvalidVaultFormat(format!("invalid sub-vault name '{name}'"))
            })?;
            child.validate()?;
        }
        Ok(())
    }
}

/// Serde helpers storing a `Duration` as integer nanoseconds.
mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nanos = u64::try_from(duration.as_nanos())
            .map_err(|_| serde::ser::Error::custom("duration exceeds u64 nanoseconds"))?;
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
