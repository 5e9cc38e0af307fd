//! Book Catalog - a catalog of books with pluggable storage.
//!
//! Books are kept in a local JSON file, a hosted JSON document store or a
//! SQL database, and are enriched with cover, description and rating from
//! Open Library when they are added or retitled.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod model;
pub mod storage;
#[cfg(test)]
pub mod test_utils;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Cli::parse();

    // Initialize logging (stderr, so stdout stays machine-readable)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("book_catalog=info".parse()?))
        .init();

    cli::run_command(&args)
}
