use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sources::Source;
use crate::types::{CatalogDocument, GameRecord, PreviousCatalog};

/// Games of the last written catalog. A missing or unreadable file counts as
/// an empty catalog.
#[tracing::instrument]
pub async fn load_previous(path: &Path) -> Vec<GameRecord> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("no previous catalog");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not read previous catalog");
            return Vec::new();
        }
    };

    match serde_json::from_slice::<PreviousCatalog>(&bytes) {
        Ok(previous) => previous.games,
        Err(e) => {
            tracing::warn!(error = %e, "previous catalog is not valid json, treating as empty");
            Vec::new()
        }
    }
}

/// Write `document` to `path`, replacing any existing file in one step.
#[tracing::instrument(skip(document), fields(total = document.total_games))]
pub async fn save_document(path: &Path, document: &CatalogDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(document)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::info!("catalog written");

    Ok(())
}

/// Write a single source's records as its own standalone document.
pub async fn save_snapshot(
    dir: &Path,
    source: &dyn Source,
    mut records: Vec<GameRecord>,
) -> Result<CatalogDocument> {
    source.prepare_snapshot(&mut records);

    let document = CatalogDocument::new(records);
    save_document(&dir.join(source.snapshot_file()), &document).await?;

    Ok(document)
}
