//! CLI command definitions and dispatch.
//!
//! Each group of subcommands is implemented in its own submodule:
//! - `books`: list, get, add, update and delete catalog entries
//! - `lookup`: run Open Library enrichment for a title without storing it
//!
//! Configuration is layered: config file, then environment variables, then
//! the `--storage` flag.

mod books;
mod lookup;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::enrichment::CoverSize;

pub use books::{AddArgs, ListArgs, UpdateArgs, cmd_add, cmd_delete, cmd_get, cmd_list, cmd_update};
pub use lookup::cmd_lookup;

/// Book catalog CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/book-catalog/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend: file, jsonbin or db (overrides config and STORAGE_TYPE)
    #[arg(long, global = true)]
    pub storage: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List books, optionally filtered
    List(ListArgs),
    /// Show one book
    Get {
        /// Book id
        id: i64,
    },
    /// Add a book (enriched from Open Library by title)
    Add(AddArgs),
    /// Change fields of a book; a new title is enriched again
    Update {
        /// Book id
        id: i64,
        #[command(flatten)]
        changes: UpdateArgs,
    },
    /// Remove a book
    Delete {
        /// Book id
        id: i64,
    },
    /// Look up cover, description and rating for a title without storing anything
    Lookup {
        /// Title to search for
        title: String,
        /// Cover size: S, M or L (default from config)
        #[arg(long)]
        size: Option<CoverSize>,
    },
}

/// Run the specified CLI command.
///
/// Returns the process exit code: failure when the requested book doesn't
/// exist or a lookup found nothing.
pub fn run_command(cli: &Cli) -> anyhow::Result<ExitCode> {
    let rt = Runtime::new()?;
    let config = load_config(cli)?;

    match &cli.command {
        Commands::List(args) => cmd_list(&rt, &config, args),
        Commands::Get { id } => cmd_get(&rt, &config, *id),
        Commands::Add(args) => cmd_add(&rt, &config, args),
        Commands::Update { id, changes } => cmd_update(&rt, &config, *id, changes),
        Commands::Delete { id } => cmd_delete(&rt, &config, *id),
        Commands::Lookup { title, size } => cmd_lookup(&rt, &config, title, *size),
    }
}

/// Build the effective configuration for this invocation.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            config::load_from(path)
        }
        None => config::load(),
    };

    config.apply_process_env()?;

    if let Some(ref mode) = cli.storage {
        config.storage.mode = mode.clone();
    }
    Ok(config)
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Availability, NewBook};
    use tempfile::TempDir;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "book-catalog",
            "add",
            "--title",
            "Dune",
            "--author",
            "Frank Herbert",
            "--year",
            "1965",
            "--genre",
            "Sci-Fi",
            "--pages",
            "412",
        ])
        .unwrap();

        let Commands::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(NewBook::from(&args), crate::test_utils::dune());
    }

    #[test]
    fn test_parse_update_with_global_flags() {
        let cli = Cli::try_parse_from([
            "book-catalog",
            "update",
            "3",
            "--availability",
            "borrowed",
            "--storage",
            "db",
        ])
        .unwrap();

        assert_eq!(cli.storage.as_deref(), Some("db"));
        let Commands::Update { id, changes } = cli.command else {
            panic!("expected update");
        };
        assert_eq!(id, 3);
        let update = crate::model::BookUpdate::from(&changes);
        assert_eq!(update.availability, Some(Availability::Borrowed));
        assert_eq!(update.title, None);
    }

    #[test]
    fn test_rejects_unknown_availability() {
        let result = Cli::try_parse_from(["book-catalog", "list", "--availability", "lost"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_lookup_size() {
        let cli = Cli::try_parse_from(["book-catalog", "lookup", "Dune", "--size", "L"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Lookup { ref title, size: Some(CoverSize::Large) } if title == "Dune"
        ));
    }

    #[test]
    fn test_storage_flag_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nmode = \"jsonbin\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "book-catalog",
            "--config",
            path.to_str().unwrap(),
            "--storage",
            "file",
            "get",
            "1",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.storage.mode, "file");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let cli = Cli::try_parse_from(["book-catalog", "--config", "/nonexistent/book-catalog.toml", "get", "1"])
            .unwrap();
        assert!(load_config(&cli).is_err());
    }
}
