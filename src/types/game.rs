use serde::{Deserialize, Serialize};

/// Store a giveaway is redeemed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Steam,
    EpicGamesStore,
    Gog,
    Ubisoft,
    /// Anything a previous catalog carried that we no longer recognise.
    #[serde(other)]
    Unknown,
}

/// Title suffixes GamerPower uses for the stores we track.
pub const TITLE_MARKERS: [(&str, Platform); 4] = [
    ("(Steam) Giveaway", Platform::Steam),
    ("(Epic Games) Giveaway", Platform::EpicGamesStore),
    ("(GOG) Giveaway", Platform::Gog),
    ("(Ubisoft) Giveaway", Platform::Ubisoft),
];

impl Platform {
    pub const TRACKED: [Platform; 4] = [
        Platform::Steam,
        Platform::EpicGamesStore,
        Platform::Gog,
        Platform::Ubisoft,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Steam => "steam",
            Self::EpicGamesStore => "epic-games-store",
            Self::Gog => "gog",
            Self::Ubisoft => "ubisoft",
            Self::Unknown => "unknown",
        }
    }

    /// Guess the store from a redemption link.
    pub fn from_link(link: &str) -> Option<Self> {
        let link = link.to_lowercase();

        if link.contains("steam") {
            Some(Self::Steam)
        } else if link.contains("epicgames") {
            Some(Self::EpicGamesStore)
        } else if link.contains("gog") {
            Some(Self::Gog)
        } else if link.contains("ubisoft") {
            Some(Self::Ubisoft)
        } else {
            None
        }
    }

    /// Platform of the first title marker contained in `title`, if any.
    pub fn from_title(title: &str) -> Option<Self> {
        TITLE_MARKERS
            .iter()
            .find(|(marker, _)| title.contains(marker))
            .map(|(_, platform)| *platform)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// One giveaway listing, as produced by any source.
///
/// Only `name` carries identity; every other field may be missing and gets
/// filled in when the same game shows up in another source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
    pub post_date: Option<String>,
    pub link: Option<String>,
    pub platform: Option<Platform>,
}

impl GameRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
