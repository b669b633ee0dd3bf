//! Merge engine.
//!
//! Merging never touches its inputs: every result owns freshly
//! allocated maps.  The AWS key policy is the one exception, it is
//! shared by `Arc` because policies are replaced, never edited.

use std::collections::BTreeMap;

use super::model::Vault;
use crate::errors::{Result, VaultedError};

/// The effective configuration of `child` applied on top of `parent`.
///
/// - `duration` is the smaller of the two raw values (zero included).
/// - `vars` and `ssh_keys` are unions where the child wins on collision.
/// - `aws_key` is the child's policy if present, else the parent's.
/// - `sub_vaults` are not carried over.
pub fn merge_from(parent: &Vault, child: &Vault) -> Vault {
    Vault {
        duration: parent.duration.min(child.duration),
        aws_key: child.aws_key.clone().or_else(|| parent.aws_key.clone()),
        vars: override_union(&parent.vars, &child.vars),
        ssh_keys: override_union(&parent.ssh_keys, &child.ssh_keys),
        sub_vaults: BTreeMap::new(),
    }
}

/// Left fold of `merge_from` over `vaults`, first element outermost.
pub fn combine_all(vaults: &[&Vault]) -> Result<Vault> {
    let (first, rest) = vaults
        .split_first()
        .ok_or(VaultedError::InvalidMergeInput)?;

    Ok(rest
        .iter()
        .fold(first.settings_only(), |acc, child| merge_from(&acc, child)))
}

impl Vault {
    /// See [`merge_from`].
    pub fn merge_from(&self, child: &Vault) -> Vault {
        merge_from(self, child)
    }
}

fn override_union(
    parent: &BTreeMap<String, String>,
    child: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = parent.clone();
    merged.extend(child.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
