//! Which GamerPower listings count as a full game giveaway.

use crate::types::game::TITLE_MARKERS;

const EXCLUDED_KEYWORDS: [&str; 19] = [
    "starter pack",
    "content pack",
    "starter kit",
    "dlc pack",
    "cosmetic pack",
    "bonus pack",
    "dlc",
    "expansion pack",
    "season pass",
    "add-on",
    "addon",
    "in-game item",
    "in-game content",
    "cosmetic",
    "skin pack",
    "bundle pack",
    "character pack",
    "weapon pack",
    "loot pack",
];

const DLC_PATTERNS: [&str; 8] = [
    " dlc ",
    "dlc:",
    "- dlc",
    "(dlc)",
    "downloadable content",
    "expansion:",
    "chapter pack",
    "booster pack",
];

/// True for a tracked-store giveaway of a base game, false for DLC and packs.
pub fn is_valid_giveaway(title: &str, description: Option<&str>) -> bool {
    if !TITLE_MARKERS.iter().any(|(marker, _)| title.contains(marker)) {
        return false;
    }

    let title = title.to_lowercase();
    let description = description.unwrap_or_default().to_lowercase();

    !EXCLUDED_KEYWORDS
        .iter()
        .chain(DLC_PATTERNS.iter())
        .any(|needle| title.contains(needle) || description.contains(needle))
}

/// Title with every store marker removed.
pub fn clean_game_name(title: &str) -> String {
    TITLE_MARKERS
        .iter()
        .fold(title.to_string(), |acc, (marker, _)| acc.replace(marker, "").trim().to_string())
}
