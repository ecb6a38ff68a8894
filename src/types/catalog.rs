use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GameRecord, Platform};

/// On-disk shape of both the merged catalog and the per-source snapshots.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub last_updated: DateTime<Utc>,
    pub total_games: usize,
    pub platforms: Vec<Platform>,
    pub games: Vec<GameRecord>,
}

impl CatalogDocument {
    pub fn new(games: Vec<GameRecord>) -> Self {
        let mut platforms: Vec<Platform> = games.iter().filter_map(|g| g.platform).collect();
        platforms.sort_by_key(|p| p.slug());
        platforms.dedup();

        Self {
            last_updated: Utc::now(),
            total_games: games.len(),
            platforms,
            games,
        }
    }
}

/// Previous catalog, read back only to compare sizes. Everything except the
/// game list is ignored so older files with other metadata still load.
#[derive(Debug, Default, Deserialize)]
pub struct PreviousCatalog {
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platforms_are_sorted_and_distinct() {
        let mut a = GameRecord::named("A");
        a.platform = Some(Platform::Ubisoft);
        let mut b = GameRecord::named("B");
        b.platform = Some(Platform::EpicGamesStore);
        let mut c = GameRecord::named("C");
        c.platform = Some(Platform::Ubisoft);
        let d = GameRecord::named("D");

        let doc = CatalogDocument::new(vec![a, b, c, d]);

        assert_eq!(doc.total_games, 4);
        assert_eq!(doc.platforms, vec![Platform::EpicGamesStore, Platform::Ubisoft]);
    }

    #[test]
    fn previous_catalog_ignores_foreign_metadata() {
        let json = r#"{
            "last_updated": "2025-01-01T12:00:00.123456",
            "total_games": 1,
            "platforms": ["steam"],
            "games": [{"name": "Hades", "platform": "steam"}]
        }"#;

        let prev: PreviousCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(prev.games.len(), 1);
        assert_eq!(prev.games[0].platform, Some(Platform::Steam));
    }
}
