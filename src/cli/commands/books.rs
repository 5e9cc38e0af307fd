//! Catalog CRUD commands.

use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use tokio::runtime::Runtime;

use crate::catalog::BookService;
use crate::config::Config;
use crate::model::{Availability, BookQuery, BookUpdate, DEFAULT_LIMIT, NewBook};
use crate::{enrichment, storage};

use super::print_json;

/// Filters and paging for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Number of matching books to skip
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Maximum number of books to print
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
    /// Exact author, case-insensitive
    #[arg(long)]
    pub author: Option<String>,
    /// Exact genre, case-insensitive
    #[arg(long)]
    pub genre: Option<String>,
    /// available or borrowed
    #[arg(long)]
    pub availability: Option<Availability>,
}

impl From<&ListArgs> for BookQuery {
    fn from(args: &ListArgs) -> Self {
        BookQuery {
            offset: args.offset,
            limit: args.limit,
            author: args.author.clone(),
            genre: args.genre.clone(),
            availability: args.availability,
        }
    }
}

/// Fields for `add`
#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    /// Publication year
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub genre: String,
    #[arg(long)]
    pub pages: u32,
    /// available (default) or borrowed
    #[arg(long)]
    pub availability: Option<Availability>,
}

impl From<&AddArgs> for NewBook {
    fn from(args: &AddArgs) -> Self {
        NewBook {
            title: args.title.clone(),
            author: args.author.clone(),
            publication_year: args.year,
            genre: args.genre.clone(),
            pages: args.pages,
            availability: args.availability,
        }
    }
}

/// Fields for `update`; anything omitted is left as it is
#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    /// Publication year
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub pages: Option<u32>,
    #[arg(long)]
    pub availability: Option<Availability>,
}

impl From<&UpdateArgs> for BookUpdate {
    fn from(args: &UpdateArgs) -> Self {
        BookUpdate {
            title: args.title.clone(),
            author: args.author.clone(),
            publication_year: args.year,
            genre: args.genre.clone(),
            pages: args.pages,
            availability: args.availability,
        }
    }
}

/// Open the configured backend and enricher.
async fn open_service(config: &Config) -> anyhow::Result<BookService> {
    let storage = storage::open(config).await?;
    let enricher = enrichment::from_settings(&config.enrichment)?;
    Ok(BookService::new(storage, enricher))
}

fn not_found(id: i64) -> ExitCode {
    eprintln!("No book with id {}", id);
    ExitCode::FAILURE
}

/// List books matching the filters
pub fn cmd_list(rt: &Runtime, config: &Config, args: &ListArgs) -> anyhow::Result<ExitCode> {
    rt.block_on(async {
        let service = open_service(config).await?;
        let books = service.list(&BookQuery::from(args)).await;
        tracing::debug!("Listed {} books from {} storage", books.len(), service.storage_name());
        print_json(&books)?;
        Ok(ExitCode::SUCCESS)
    })
}

/// Show one book
pub fn cmd_get(rt: &Runtime, config: &Config, id: i64) -> anyhow::Result<ExitCode> {
    rt.block_on(async {
        let service = open_service(config).await?;
        match service.get(id).await {
            Some(book) => {
                print_json(&book)?;
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(not_found(id)),
        }
    })
}

/// Add a book
pub fn cmd_add(rt: &Runtime, config: &Config, args: &AddArgs) -> anyhow::Result<ExitCode> {
    rt.block_on(async {
        let service = open_service(config).await?;
        let book = service
            .create(NewBook::from(args))
            .await
            .context("Failed to add book")?;
        print_json(&book)?;
        Ok(ExitCode::SUCCESS)
    })
}

/// Update a book
pub fn cmd_update(rt: &Runtime, config: &Config, id: i64, args: &UpdateArgs) -> anyhow::Result<ExitCode> {
    rt.block_on(async {
        let service = open_service(config).await?;
        let updated = service
            .update(id, BookUpdate::from(args))
            .await
            .with_context(|| format!("Failed to update book {id}"))?;
        match updated {
            Some(book) => {
                print_json(&book)?;
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(not_found(id)),
        }
    })
}

/// Delete a book
pub fn cmd_delete(rt: &Runtime, config: &Config, id: i64) -> anyhow::Result<ExitCode> {
    rt.block_on(async {
        let service = open_service(config).await?;
        let deleted = service
            .delete(id)
            .await
            .with_context(|| format!("Failed to delete book {id}"))?;
        if !deleted {
            return Ok(not_found(id));
        }
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
        Ok(ExitCode::SUCCESS)
    })
}
