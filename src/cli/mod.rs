//! Command-line interface for book-catalog.
//!
//! This module provides CLI commands for managing catalog entries and for
//! running Open Library lookups by hand.

mod commands;

pub use commands::{Cli, Commands, run_command};
