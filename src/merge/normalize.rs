use unicode_normalization::UnicodeNormalization;

/// Comparison key for a game name.
///
/// NFKD-decomposes the name, drops everything outside ASCII, lower-cases,
/// strips punctuation and collapses whitespace, so `"Amnesia: Rebirth"` and
/// `"AMNESIA  rebirth"` both become `"amnesia rebirth"`. An empty key means the
/// record cannot be identified.
///
/// Only ASCII letters and digits survive, so `_` is stripped like any other
/// punctuation. A regex `\w` class would keep it; `"snake_case"` becomes
/// `"snakecase"` here.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
