use std::sync::Arc;

use async_trait::async_trait;
use scraper::ElementRef;

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::global::Global;
use crate::types::GameRecord;

pub mod filter;
pub mod gamerpower_api;
pub mod gamerpower_web;
pub mod redirect;
pub mod telegram;

#[cfg(test)]
pub(crate) mod stub_server;

pub use gamerpower_api::GamerPowerApi;
pub use gamerpower_web::GamerPowerWeb;
pub use telegram::Telegram;

/// A giveaway feed that produces an ordered, already filtered record list.
#[async_trait]
pub trait Source: Send + Sync {
    /// Slug used in logs and on the command line.
    fn name(&self) -> &'static str;

    /// File name of the standalone snapshot this source writes.
    fn snapshot_file(&self) -> &'static str;

    fn enabled(&self, config: &SourcesConfig) -> bool;

    async fn fetch(&self, global: &Arc<Global>) -> Result<Vec<GameRecord>>;

    /// Reorder records before they are written as a standalone snapshot.
    fn prepare_snapshot(&self, _records: &mut [GameRecord]) {}
}

pub fn by_name(name: &str) -> Option<Box<dyn Source>> {
    match name {
        "telegram" => Some(Box::new(Telegram)),
        "gamerpower-web" => Some(Box::new(GamerPowerWeb)),
        "gamerpower-api" => Some(Box::new(GamerPowerApi)),
        _ => None,
    }
}

/// Fetch a source, turning a disabled or failing source into an empty list so
/// the catalog can still be built from the others.
#[tracing::instrument(skip_all, fields(source = source.name()))]
pub async fn fetch_or_empty(source: &dyn Source, global: &Arc<Global>) -> Vec<GameRecord> {
    if !source.enabled(&global.config.sources) {
        tracing::info!("source is disabled");
        return Vec::new();
    }

    match source.fetch(global).await {
        Ok(records) => {
            tracing::info!(count = records.len(), "source fetched");
            records
        }
        Err(e) => {
            tracing::error!(error = %e, "source failed, continuing without it");
            Vec::new()
        }
    }
}

/// Trimmed, non-empty text nodes of `element` joined by `separator`.
pub(crate) fn element_text(element: &ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
