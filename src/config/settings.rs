use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultedError};

/// Shell used when neither the config nor `$SHELL` names one.
const FALLBACK_SHELL: &str = "/bin/sh";

/// How `vaulted env` renders a variable projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// POSIX shell `export` / `unset` lines.
    #[default]
    Sh,
    /// fish `set -gx` / `set -e` lines.
    Fish,
    /// A JSON object with `set` and `unset` keys.
    Json,
}

impl FromStr for ExportFormat {
    type Err = VaultedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sh" | "bash" | "zsh" => Ok(Self::Sh),
            "fish" => Ok(Self::Fish),
            "json" => Ok(Self::Json),
            other => Err(VaultedError::CommandFailed(format!(
                "unknown export format '{other}', use 'sh', 'fish' or 'json'"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sh => "sh",
            Self::Fish => "fish",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// User configuration, loaded from `<vault_dir>/vaulted.toml`.
///
/// Every field has a default so Vaulted works without a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Shell spawned by `vaulted shell` (default: `$SHELL`, then `/bin/sh`).
    #[serde(default)]
    pub shell: Option<String>,

    /// Default output format of `vaulted env`.
    #[serde(default)]
    pub export_format: ExportFormat,
}

impl Settings {
    /// Name of the config file we look for in the vault directory.
    const FILE_NAME: &'static str = "vaulted.toml";

    /// Load settings from `<vault_dir>/vaulted.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(vault_dir: &Path) -> Result<Self> {
        let config_path = vault_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultedError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// The shell to spawn, given the current value of `$SHELL`.
    pub fn shell_or(&self, env_shell: Option<String>) -> String {
        self.shell
            .clone()
            .filter(|s| !s.is_empty())
            .or(env_shell.filter(|s| !s.is_empty()))
            .unwrap_or_else(|| FALLBACK_SHELL.to_string())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert!(s.shell.is_none());
        assert_eq!(s.export_format, ExportFormat::Sh);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.export_format, ExportFormat::Sh);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
shell = "/usr/bin/fish"
export_format = "fish"
"#;
        fs::write(tmp.path().join("vaulted.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.shell.as_deref(), Some("/usr/bin/fish"));
        assert_eq!(settings.export_format, ExportFormat::Fish);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("vaulted.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultedError::ConfigError(_))));
    }

    #[test]
    fn shell_prefers_config_then_env_then_fallback() {
        let configured = Settings {
            shell: Some("/bin/zsh".into()),
            ..Settings::default()
        };
        assert_eq!(configured.shell_or(Some("/bin/bash".into())), "/bin/zsh");

        let s = Settings::default();
        assert_eq!(s.shell_or(Some("/bin/bash".into())), "/bin/bash");
        assert_eq!(s.shell_or(Some(String::new())), "/bin/sh");
        assert_eq!(s.shell_or(None), "/bin/sh");
    }

    #[test]
    fn export_format_parses_aliases() {
        assert_eq!("bash".parse::<ExportFormat>().unwrap(), ExportFormat::Sh);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("csv".parse::<ExportFormat>().is_err());
    }
}
