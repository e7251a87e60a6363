//! Translation key derivation from source-language text

/// Maximum number of words kept in a derived key
pub const MAX_KEY_WORDS: usize = 16;

/// Derive a translation key from a primary-language phrase
///
/// `"Home Title"` becomes `home_title`. Anything that is not an ASCII
/// lowercase letter, digit or whitespace is dropped after lowercasing, so
/// accented and CJK text vanish rather than being transliterated. Returns an
/// empty string when nothing survives; such rows cannot be merged.
pub fn derive_key(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    // `_` is stripped above and words are never empty, so joining cannot
    // produce doubled or leading/trailing underscores.
    cleaned
        .split_whitespace()
        .take(MAX_KEY_WORDS)
        .collect::<Vec<_>>()
        .join("_")
}
