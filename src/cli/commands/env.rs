//! `vaulted env`: print a script that loads a vault session.
//!
//! Meant to be evaluated by the calling shell:
//!   eval "$(vaulted env prod/admin)"
//!   vaulted env prod/admin --format fish | source

use std::fmt::Write;

use serde::Serialize;

use crate::cli::{load_settings, open_store, session_for_path, Cli};
use crate::config::ExportFormat;
use crate::errors::{Result, VaultedError};
use crate::session::Variables;
use crate::vault::validate_var_name;

/// Execute the `env` command.
pub fn execute(cli: &Cli, vault: &str, format: Option<&str>) -> Result<()> {
    let format = match format {
        Some(name) => name.parse()?,
        None => load_settings(cli)?.export_format,
    };

    let store = open_store(cli);
    let session = session_for_path(cli, &store, vault)?.effective()?;

    print!("{}", render(&session.variables(), format)?);
    Ok(())
}

/// Render a variable projection as a script in the given format.
///
/// Names are emitted unquoted, so any name a shell could not export is
/// refused rather than rendered.
pub fn render(vars: &Variables, format: ExportFormat) -> Result<String> {
    for name in vars.unset.iter().chain(vars.set.keys()) {
        validate_var_name(name)?;
    }

    match format {
        ExportFormat::Sh => Ok(render_sh(vars)),
        ExportFormat::Fish => Ok(render_fish(vars)),
        ExportFormat::Json => render_json(vars),
    }
}

fn render_sh(vars: &Variables) -> String {
    let mut out = String::new();
    for name in &vars.unset {
        let _ = writeln!(out, "unset {name}");
    }
    for (name, value) in &vars.set {
        let _ = writeln!(out, "export {name}={}", sh_quote(value));
    }
    out
}

fn render_fish(vars: &Variables) -> String {
    let mut out = String::new();
    for name in &vars.unset {
        let _ = writeln!(out, "set -e {name}");
    }
    for (name, value) in &vars.set {
        let _ = writeln!(out, "set -gx {name} {}", fish_quote(value));
    }
    out
}

fn render_json(vars: &Variables) -> Result<String> {
    #[derive(Serialize)]
    struct Plan<'a> {
        set: &'a std::collections::BTreeMap<String, String>,
        unset: &'a std::collections::BTreeSet<String>,
    }

    let mut json = serde_json::to_string_pretty(&Plan {
        set: &vars.set,
        unset: &vars.unset,
    })
    .map_err(|e| VaultedError::SerializationError(format!("JSON export: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Single-quote a value for POSIX shells.
fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Single-quote a value for fish, where `\` and `'` are escapable.
fn fish_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
}
