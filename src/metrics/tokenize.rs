//! Word tokenization shared by the lexical metrics.

use unicode_segmentation::UnicodeSegmentation;

/// Splits text into word tokens on Unicode word boundaries (UAX #29).
///
/// Punctuation and whitespace only separate tokens, casing is preserved and
/// no stemming is applied. The same input always yields the same tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.unicode_words().collect()
}

/// Tokenizes and lowercases, for metrics that compare case-insensitively.
pub fn tokenize_lower(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

/// True when every character of the token is alphabetic.
#[inline]
pub fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}
