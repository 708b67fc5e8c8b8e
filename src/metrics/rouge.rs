//! ROUGE-1, ROUGE-2 and ROUGE-L overlap scoring.

use std::collections::HashMap;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Precision, recall and F-measure for one ROUGE variant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl RougeScore {
    fn from_counts(overlap: usize, candidate_total: usize, reference_total: usize) -> Self {
        let precision = overlap as f64 / candidate_total.max(1) as f64;
        let recall = overlap as f64 / reference_total.max(1) as f64;
        Self {
            precision,
            recall,
            fmeasure: fmeasure(precision, recall),
        }
    }
}

/// The three ROUGE variants reported in the scorecard.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RougeScores {
    pub rouge1: RougeScore,
    pub rouge2: RougeScore,
    pub rouge_l: RougeScore,
}

/// Scores candidate summaries against a reference.
///
/// Text is lowercased, every run of characters outside `[a-z0-9]` becomes a
/// separator, and tokens longer than three characters are stemmed when
/// stemming is enabled.
///
/// The stemmer is Snowball English (Porter2), not the original Porter
/// algorithm. The two disagree on some common words: `news` stays `news`
/// (Porter: `new`) and `fairly` becomes `fair` (Porter: `fairli`). Scores can
/// therefore differ slightly from Porter-based ROUGE tools when such words
/// overlap.
pub struct RougeScorer {
    separator: Regex,
    stemmer: Option<Stemmer>,
}

impl RougeScorer {
    /// Creates a scorer, optionally stemming tokens with the English Snowball stemmer.
    pub fn new(use_stemmer: bool) -> Self {
        Self {
            separator: Regex::new(r"[^a-z0-9]+").expect("static pattern is valid"),
            stemmer: use_stemmer.then(|| Stemmer::create(Algorithm::English)),
        }
    }

    /// Computes ROUGE-1, ROUGE-2 and ROUGE-L for `candidate` against `reference`.
    ///
    /// An empty side yields zero for every variant.
    pub fn score(&self, reference: &str, candidate: &str) -> RougeScores {
        let reference_tokens = self.tokenize(reference);
        let candidate_tokens = self.tokenize(candidate);

        RougeScores {
            rouge1: ngram_score(&reference_tokens, &candidate_tokens, 1),
            rouge2: ngram_score(&reference_tokens, &candidate_tokens, 2),
            rouge_l: lcs_score(&reference_tokens, &candidate_tokens),
        }
    }

    /// Normalizes and splits text the way the scorer compares it.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.separator
            .split(&lowered)
            .filter(|token| !token.is_empty())
            .map(|token| match &self.stemmer {
                Some(stemmer) if token.len() > 3 => stemmer.stem(token).into_owned(),
                _ => token.to_string(),
            })
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl Default for RougeScorer {
    fn default() -> Self {
        Self::new(true)
    }
}

fn fmeasure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 {
        return counts;
    }
    for ngram in tokens.windows(n) {
        *counts.entry(ngram).or_insert(0) += 1;
    }
    counts
}

fn ngram_score(reference: &[String], candidate: &[String], n: usize) -> RougeScore {
    let reference_counts = ngram_counts(reference, n);
    let candidate_counts = ngram_counts(candidate, n);

    // Overlap is clipped by the reference count of each n-gram.
    let overlap: usize = candidate_counts
        .iter()
        .map(|(ngram, &count)| count.min(reference_counts.get(ngram).copied().unwrap_or(0)))
        .sum();

    RougeScore::from_counts(
        overlap,
        candidate_counts.values().sum(),
        reference_counts.values().sum(),
    )
}

fn lcs_score(reference: &[String], candidate: &[String]) -> RougeScore {
    if reference.is_empty() || candidate.is_empty() {
        return RougeScore::default();
    }
    let lcs = lcs_length(reference, candidate);
    RougeScore::from_counts(lcs, candidate.len(), reference.len())
}

/// Length of the longest common subsequence, using two rolling DP rows.
fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for token_a in a {
        for (j, token_b) in b.iter().enumerate() {
            current[j + 1] = if token_a == token_b {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_identical_texts_score_one() {
        let scorer = RougeScorer::new(true);
        let scores = scorer.score("The cat sat on the mat.", "the cat sat on the mat");
        assert!((scores.rouge1.fmeasure - 1.0).abs() < 1e-9);
        assert!((scores.rouge2.fmeasure - 1.0).abs() < 1e-9);
        assert!((scores.rouge_l.fmeasure - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sides_score_zero() {
        let scorer = RougeScorer::default();
        assert_eq!(scorer.score("", "a summary"), RougeScores::default());
        assert_eq!(scorer.score("a reference", ""), RougeScores::default());
        assert_eq!(scorer.score("...", "!!!"), RougeScores::default());
    }

    #[test]
    fn test_tokenize_normalizes_and_stems() {
        let scorer = RougeScorer::new(true);
        assert_eq!(scorer.tokenize("Running, RUNS; ran!"), tokens(&["run", "run", "ran"]));

        let plain = RougeScorer::new(false);
        assert_eq!(plain.tokenize("Running, RUNS"), tokens(&["running", "runs"]));
    }

    #[test]
    fn test_stemming_only_for_long_tokens() {
        let scorer = RougeScorer::new(true);
        // "cats" has four characters and is stemmed, "was" is left alone.
        assert_eq!(scorer.tokenize("cats was"), tokens(&["cat", "was"]));
    }

    #[test]
    fn test_snowball_stems_differ_from_porter() {
        let scorer = RougeScorer::new(true);
        assert_eq!(scorer.tokenize("news fairly"), vec!["news", "fair"]);
    }

    #[test]
    fn test_non_ascii_letters_split_tokens() {
        let scorer = RougeScorer::new(false);
        assert_eq!(scorer.tokenize("Šta će biti"), tokens(&["ta", "e", "biti"]));
    }

    #[test]
    fn test_rouge1_clips_repeated_tokens() {
        let reference = tokens(&["the", "cat"]);
        let candidate = tokens(&["the", "the", "the"]);
        let score = ngram_score(&reference, &candidate, 1);
        assert!((score.precision - 1.0 / 3.0).abs() < 1e-9);
        assert!((score.recall - 0.5).abs() < 1e-9);
        assert!((score.fmeasure - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_rouge2_partial_overlap() {
        let reference = tokens(&["police", "found", "the", "car"]);
        let candidate = tokens(&["police", "found", "a", "car"]);
        let score = ngram_score(&reference, &candidate, 2);
        assert!((score.precision - 1.0 / 3.0).abs() < 1e-9);
        assert!((score.recall - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_lcs_length() {
        let a = tokens(&["a", "b", "c", "d", "e"]);
        let b = tokens(&["a", "c", "e", "x"]);
        assert_eq!(lcs_length(&a, &b), 3);
        assert_eq!(lcs_length(&a, &[]), 0);
    }

    #[test]
    fn test_rouge_l_precision_recall_orientation() {
        let reference = tokens(&["a", "b", "c", "d"]);
        let candidate = tokens(&["a", "c"]);
        let score = lcs_score(&reference, &candidate);
        assert!((score.precision - 1.0).abs() < 1e-9);
        assert!((score.recall - 0.5).abs() < 1e-9);
    }
}
