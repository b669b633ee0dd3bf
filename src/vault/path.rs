//! Slash-delimited vault paths (`parent/child/grandchild`).

use crate::errors::{Result, VaultedError};

/// Separator between the segments of a vault path.
pub const SEPARATOR: char = '/';

/// Maximum length of a top-level vault name.
const MAX_NAME_LEN: usize = 64;

/// Split a path into its segments, rejecting empty paths and empty segments.
pub fn segments(name: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = name.split(SEPARATOR).collect();
    if name.is_empty() || parts.iter().any(|segment| segment.is_empty()) {
        return Err(VaultedError::InvalidPath(name.to_string()));
    }
    Ok(parts)
}

/// Split a path into its first segment and the remaining segments.
///
/// `"parent/child/leaf"` becomes `("parent", ["child", "leaf"])`.
pub fn split_path(name: &str) -> Result<(&str, Vec<&str>)> {
    let mut parts = segments(name)?;
    let head = parts.remove(0);
    Ok((head, parts))
}

/// Join segments back into a path.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/")
}

/// Validate a single vault or sub-vault name.
///
/// Allowed: ASCII letters, digits, hyphens, underscores, periods.
/// Must be non-empty and at most 64 characters.
pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultedError::InvalidPath("vault name cannot be empty".into()));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(VaultedError::InvalidPath(format!(
            "vault name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
    {
        return Err(VaultedError::InvalidPath(format!(
            "{name} (only ASCII letters, digits, hyphens, underscores and periods are allowed)"
        )));
    }

    if name == "." || name == ".." {
        return Err(VaultedError::InvalidPath(name.to_string()));
    }

    Ok(())
}

/// Validate an environment variable name.
///
/// Allowed: `[A-Za-z_][A-Za-z0-9_]*`.  Anything else could not be
/// exported by a shell and is refused before it reaches one.
pub fn validate_var_name(name: &str) -> Result<()> {
    let mut bytes = name.bytes();
    let valid_start = bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_');
    if !valid_start || !bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(VaultedError::InvalidVaultFormat(format!(
            "invalid variable name '{name}' (must match [A-Za-z_][A-Za-z0-9_]*)"
        )));
    }
    Ok(())
}
