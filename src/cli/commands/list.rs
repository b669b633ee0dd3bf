//! `vaulted list`: list every vault and sub-vault path.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::vault::{enumerate_paths, join_path, resolve, split_path, Store};

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSummary {
    pub path: String,
    pub vars: usize,
    pub ssh_keys: usize,
    pub aws: bool,
}

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let store = open_store(cli);
    let summaries = summarize(&store)?;

    if summaries.is_empty() {
        output::info("No vaults found.");
        output::tip(&format!(
            "Vaults are read from {}/<name>.json",
            store.dir().display()
        ));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Vault", "Vars", "SSH keys", "AWS"]);

    for summary in &summaries {
        let aws = if summary.aws {
            style("yes").green().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            summary.path.clone(),
            summary.vars.to_string(),
            summary.ssh_keys.to_string(),
            aws,
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Summaries of every path in every stored vault, in listing order.
pub fn summarize(store: &impl Store) -> Result<Vec<VaultSummary>> {
    let mut summaries = Vec::new();

    for name in store.list_vaults()? {
        let root = store.open_vault(&name)?;
        for path in enumerate_paths(&root, &name) {
            let (_, rest) = split_path(&path)?;
            let vault = resolve(&root, &join_path(&rest))?;
            summaries.push(VaultSummary {
                vars: vault.vars.len(),
                ssh_keys: vault.ssh_keys.len(),
                aws: vault.has_aws_key(),
                path,
            });
        }
    }

    Ok(summaries)
}
