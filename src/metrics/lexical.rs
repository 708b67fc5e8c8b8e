//! Lexical summary metrics: compression, coverage and n-gram density.

use std::collections::HashSet;

use super::tokenize::{is_alphabetic, tokenize, tokenize_lower};

/// Default maximum n-gram order for [`density`].
pub const DEFAULT_MAX_N: usize = 3;

/// Ratio of original length to summary length, in tokens.
///
/// The summary length is floored at one token, so an empty summary yields the
/// original token count instead of a division error.
pub fn compression(original: &str, summary: &str) -> f64 {
    let original_len = tokenize(original).len();
    let summary_len = tokenize(summary).len().max(1);
    original_len as f64 / summary_len as f64
}

/// Fraction of the original's distinct alphabetic vocabulary present in the summary.
///
/// Tokens are lowercased and anything with a non-alphabetic character is
/// ignored. Returns 0 when the original has no alphabetic tokens.
pub fn coverage(original: &str, summary: &str) -> f64 {
    let original_vocab = alphabetic_vocabulary(original);
    if original_vocab.is_empty() {
        return 0.0;
    }
    let summary_vocab = alphabetic_vocabulary(summary);
    let shared = original_vocab.intersection(&summary_vocab).count();
    shared as f64 / original_vocab.len() as f64
}

fn alphabetic_vocabulary(text: &str) -> HashSet<String> {
    tokenize_lower(text)
        .into_iter()
        .filter(|token| is_alphabetic(token))
        .collect()
}

/// Summary n-grams (orders `1..=max_n`) found verbatim in the original, per summary token.
///
/// Summary n-grams are counted as a sequence, so a repeated phrase counts each
/// time it appears. Matches are summed over all orders and divided by the
/// summary token count (floored at 1), so a fully extractive summary scores
/// close to `max_n`. Callers scale it to a percentage.
pub fn density(original: &str, summary: &str, max_n: usize) -> f64 {
    let original_tokens = tokenize_lower(original);
    let summary_tokens = tokenize_lower(summary);

    let mut matched = 0usize;

    for n in 1..=max_n {
        if summary_tokens.len() < n {
            break;
        }
        let original_ngrams: HashSet<&[String]> = original_tokens.windows(n).collect();
        matched += summary_tokens
            .windows(n)
            .filter(|ngram| original_ngrams.contains(ngram))
            .count();
    }

    matched as f64 / summary_tokens.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "The cat sat on the mat. The cat was happy.";
    const SUMMARY: &str = "The cat sat on the mat.";

    #[test]
    fn test_compression_example() {
        let value = compression(ORIGINAL, SUMMARY);
        assert!((value - 10.0 / 6.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}", value), "1.67");
    }

    #[test]
    fn test_compression_empty_summary_is_finite() {
        assert_eq!(compression(ORIGINAL, ""), 10.0);
        assert_eq!(compression("", ""), 0.0);
    }

    #[test]
    fn test_coverage_example() {
        // 5 of the 7 distinct original words appear in the summary.
        let value = coverage(ORIGINAL, SUMMARY);
        assert!((value - 5.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_full_and_empty() {
        assert_eq!(coverage(SUMMARY, ORIGINAL), 1.0);
        assert_eq!(coverage("2024 ... 15", "anything"), 0.0);
        assert_eq!(coverage("", "anything"), 0.0);
        assert_eq!(coverage(ORIGINAL, ""), 0.0);
    }

    #[test]
    fn test_coverage_ignores_case_and_numbers() {
        let value = coverage("Sarajevo 2024 sarajevo Mostar", "SARAJEVO");
        assert!((value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_density_fully_extractive() {
        // 6 unigrams + 5 bigrams + 4 trigrams over 6 tokens
        let value = density(ORIGINAL, SUMMARY, DEFAULT_MAX_N);
        assert!((value - 2.5).abs() < 1e-9);
        assert_eq!(format!("{:.2}", value * 100.0), "250.00");
        assert_eq!(density(ORIGINAL, "happy", DEFAULT_MAX_N), 1.0);
    }

    #[test]
    fn test_density_partial_reuse() {
        // unigrams: cat, was, sad -> 2 of 3
        // bigrams: (cat was), (was sad) -> 1 of 2
        // trigram: (cat was sad) -> 0 of 1
        // 3 matches over 3 tokens
        let value = density(ORIGINAL, "cat was sad", DEFAULT_MAX_N);
        assert!((value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_density_repeats_count() {
        let value = density("a b", "a a z", 1);
        assert!((value - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_density_degenerate_inputs() {
        assert_eq!(density(ORIGINAL, "", DEFAULT_MAX_N), 0.0);
        assert_eq!(density("", SUMMARY, DEFAULT_MAX_N), 0.0);
        assert_eq!(density(ORIGINAL, SUMMARY, 0), 0.0);
    }

    #[test]
    fn test_bounds_hold_on_mixed_text() {
        let original = "Vlada je u ponedjeljak usvojila budžet za 2025. godinu, rekao je ministar.";
        let summaries = [
            "Vlada je usvojila budžet.",
            "Ministar kaže: budžet, budžet, budžet!",
            "Potpuno drugačiji sažetak bez preklapanja",
        ];
        for summary in summaries {
            let c = coverage(original, summary);
            let d = density(original, summary, DEFAULT_MAX_N) * 100.0;
            assert!((0.0..=1.0).contains(&c));
            assert!((0.0..=DEFAULT_MAX_N as f64 * 100.0).contains(&d));
            assert!(compression(original, summary) > 0.0);
        }
    }
}
