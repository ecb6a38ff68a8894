use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;

use crate::global::Global;
use crate::merge::merge_with_stats;
use crate::sources::{self, GamerPowerApi, GamerPowerWeb, Telegram};
use crate::storage;
use crate::types::{CatalogDocument, GameRecord, Platform};
use crate::util::sleep_until_aligned;

/// Outcome of one catalog build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub total: usize,
    pub previous: usize,
    pub written: bool,
    pub platforms: Vec<Platform>,
}

/// Build the catalog once, or forever on the configured interval.
#[tracing::instrument(name = "Catalog", skip_all)]
pub async fn run(global: Arc<Global>) -> anyhow::Result<()> {
    let interval_secs = global.config.schedule.interval_secs;

    if interval_secs == 0 {
        build(&global).await?;
        return Ok(());
    }

    tracing::info!(interval_secs, "starting scheduled builds");

    loop {
        if let Err(e) = build(&global).await {
            tracing::error!("catalog build failed: {:#}", e);
        }

        sleep_until_aligned(interval_secs).await;
    }
}

/// Fetch every source, merge them and publish the result.
#[tracing::instrument(skip_all)]
pub async fn build(global: &Arc<Global>) -> anyhow::Result<BuildReport> {
    let started = Instant::now();

    let (web, feed, api) = tokio::join!(
        sources::fetch_or_empty(&GamerPowerWeb, global),
        sources::fetch_or_empty(&Telegram, global),
        sources::fetch_or_empty(&GamerPowerApi, global),
    );

    let merged = assemble(web, vec![("telegram", feed), ("gamerpower-api", api)]);

    let report = publish(&global.config.output.catalog_path, merged).await?;

    tracing::info!(
        total = report.total,
        previous = report.previous,
        written = report.written,
        elapsed = ?started.elapsed(),
        "catalog build complete"
    );

    Ok(report)
}

/// Fold each secondary source into `base`, in the order given.
pub fn assemble(base: Vec<GameRecord>, secondary: Vec<(&str, Vec<GameRecord>)>) -> Vec<GameRecord> {
    secondary.into_iter().fold(base, |acc, (source, records)| {
        let _span = tracing::info_span!("merge", source).entered();
        let (merged, stats) = merge_with_stats(acc, &records);

        tracing::info!(
            added = stats.added,
            updated = stats.updated,
            skipped = stats.skipped,
            total = merged.len(),
            "merged source"
        );

        merged
    })
}

/// Write `merged` to `path` unless it is no bigger than what is already there.
pub async fn publish(path: &Path, merged: Vec<GameRecord>) -> anyhow::Result<BuildReport> {
    let previous = storage::load_previous(path).await.len();
    let total = merged.len();

    if total <= previous {
        tracing::info!(total, previous, "no new games, catalog left untouched");
        return Ok(BuildReport {
            total,
            previous,
            written: false,
            platforms: Vec::new(),
        });
    }

    let document = CatalogDocument::new(merged);
    storage::save_document(path, &document)
        .await
        .with_context(|| format!("writing catalog to {}", path.display()))?;

    let platforms = document.platforms;
    tracing::info!(
        total,
        platforms = %platforms.iter().map(Platform::slug).collect::<Vec<_>>().join(", "),
        "catalog updated"
    );

    Ok(BuildReport {
        total,
        previous,
        written: true,
        platforms,
    })
}
