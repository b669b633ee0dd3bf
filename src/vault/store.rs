//! The storage boundary.
//!
//! The session engine only ever receives a root `Vault`; where it came
//! from is the business of a `Store`.  `FileStore` is a plain JSON
//! implementation (`<dir>/<name>.json`), written atomically via a temp
//! file and rename.  It performs no encryption.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::model::Vault;
use super::path::validate_vault_name;
use crate::errors::{Result, VaultedError};

/// File extension of stored vaults.
const EXTENSION: &str = "json";

/// Supplies root vaults by name and persists them.
pub trait Store {
    /// Names of all stored vaults, sorted.
    fn list_vaults(&self) -> Result<Vec<String>>;

    /// Returns `true` if a vault with this name is stored.
    fn vault_exists(&self, name: &str) -> bool;

    /// Load the vault stored under `name`.
    fn open_vault(&self, name: &str) -> Result<Vault>;

    /// Persist `vault` under `name`, replacing any existing vault.
    fn seal_vault(&self, name: &str, vault: &Vault) -> Result<()>;
}

/// Stores each vault as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory vault files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file backing vault `name`.
    pub fn vault_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }
}

impl Store for FileStore {
    fn list_vaults(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    let name = stem.to_string_lossy().to_string();
                    if validate_vault_name(&name).is_ok() {
                        names.push(name);
                    }
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn vault_exists(&self, name: &str) -> bool {
        validate_vault_name(name).is_ok() && self.vault_path(name).exists()
    }

    fn open_vault(&self, name: &str) -> Result<Vault> {
        validate_vault_name(name)?;
        let path = self.vault_path(name);
        if !path.exists() {
            return Err(VaultedError::VaultNotFound(name.to_string()));
        }

        debug!(vault = name, path = %path.display(), "reading vault");
        let data = fs::read(&path)?;
        let vault: Vault = serde_json::from_slice(&data)
            .map_err(|e| VaultedError::InvalidVaultFormat(format!("{name}: {e}")))?;
        vault.validate()?;
        Ok(vault)
    }

    fn seal_vault(&self, name: &str, vault: &Vault) -> Result<()> {
        validate_vault_name(name)?;
        vault.validate()?;

        let bytes = serde_json::to_vec_pretty(vault)
            .map_err(|e| VaultedError::SerializationError(format!("{name}: {e}")))?;

        fs::create_dir_all(&self.dir)?;
        let path = self.vault_path(name);
        let tmp_path = self.dir.join(format!(".{name}.{EXTENSION}.tmp"));

        if let Err(e) = write_private(&tmp_path, &bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        debug!(vault = name, path = %path.display(), "vault written");
        Ok(())
    }
}

/// Write `bytes` to a new file that is owner-only from the moment it exists.
///
/// A leftover temp file from an interrupted write is replaced.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = match options.open(path) {
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path)?;
            options.open(path)?
        }
        other => other?,
    };
    file.write_all(bytes)?;
    file.sync_all()
}
