//! Stand-alone enrichment lookup.

use std::process::ExitCode;

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::enrichment::{CoverSize, Enricher, EnrichmentService};

use super::print_json;

/// Look up cover, description and rating for a title and print them
///
/// Exits with failure when nothing at all was found.
pub fn cmd_lookup(
    rt: &Runtime,
    config: &Config,
    title: &str,
    size: Option<CoverSize>,
) -> anyhow::Result<ExitCode> {
    let mut settings = config.enrichment.clone();
    if let Some(size) = size {
        settings.cover_size = size;
    }

    if !settings.enabled {
        eprintln!("Enrichment is disabled in the configuration");
        return Ok(ExitCode::FAILURE);
    }

    rt.block_on(async {
        let service = EnrichmentService::from_settings(&settings)?;
        let found = service.enrich(title).await;

        print_json(&serde_json::json!({
            "title": title,
            "cover_url": found.cover_url,
            "description": found.description,
            "rating": found.rating,
        }))?;

        if found.is_empty() {
            eprintln!("Nothing found for {:?}", title);
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    })
}
