//! Path resolution and enumeration over a vault tree.

use super::model::Vault;
use super::path::{segments, SEPARATOR};
use crate::errors::Result;

/// Resolve `path` below `root` into the chain of sub-vaults it names.
///
/// The chain is in descent order and does not include `root`.  An
/// empty path resolves to an empty chain.
pub fn resolve_path<'a>(root: &'a Vault, path: &str) -> Result<Vec<&'a Vault>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let mut chain = Vec::new();
    let mut node = root;
    for segment in segments(path)? {
        node = node.sub_vault(segment)?;
        chain.push(node);
    }
    Ok(chain)
}

/// The vault addressed by `path` below `root` (or `root` for an empty path).
pub fn resolve<'a>(root: &'a Vault, path: &str) -> Result<&'a Vault> {
    Ok(resolve_path(root, path)?.last().copied().unwrap_or(root))
}

/// Every path reachable from `vault`, depth-first, starting with `base_name`.
///
/// Siblings are visited in name order.
pub fn enumerate_paths(vault: &Vault, base_name: &str) -> Vec<String> {
    let mut paths = vec![base_name.to_string()];
    for (name, child) in &vault.sub_vaults {
        let prefix = format!("{base_name}{SEPARATOR}{name}");
        paths.extend(enumerate_paths(child, &prefix));
    }
    paths
}
