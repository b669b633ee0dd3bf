use clap::Parser;
use tracing_subscriber::EnvFilter;
use vaulted::cli::{Cli, Commands};

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::List => vaulted::cli::commands::list::execute(&cli),
        Commands::Env { vault, format } => {
            vaulted::cli::commands::env::execute(&cli, vault, format.as_deref())
        }
        Commands::Shell { vault } => vaulted::cli::commands::shell::execute(&cli, vault),
        Commands::Exec { vault, command } => {
            vaulted::cli::commands::exec::execute(&cli, vault, command)
        }
        Commands::Cp {
            old_vault,
            new_vault,
        } => vaulted::cli::commands::cp::execute(&cli, old_vault, new_vault),
        Commands::Completions { shell } => vaulted::cli::commands::completions::execute(*shell),
    };

    if let Err(e) = result {
        // A failing child has already reported its own error.
        if !matches!(e, vaulted::errors::VaultedError::ChildProcessFailed(_)) {
            vaulted::cli::output::error(&e.to_string());
        }
        std::process::exit(e.exit_code());
    }
}

/// Diagnostic logs go to stderr, filtered by `VAULTED_LOG` (default: warn).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("VAULTED_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
