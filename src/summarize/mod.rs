//! Phase 2: filling candidate summaries from a text generation backend.

pub mod gemini;

pub use gemini::{GeminiClient, RetryPolicy};

use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::dataset::{ArticleRecord, SummaryModel};
use crate::error::SummarizeError;

/// A backend that turns a text into its summary.
pub trait Summarizer {
    fn generate(&self, text: &str) -> Result<String, SummarizeError>;
}

/// Splits `text` into chunks of at most `max_len` characters.
///
/// A chunk ends at the last `.` inside its window, unless the window has no
/// period after its first character, in which case it is cut at `max_len`.
pub fn split_text(text: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = start + max_len;
        if end >= chars.len() {
            chunks.push(chars[start..].iter().collect());
            break;
        }

        let period = chars[start..end]
            .iter()
            .rposition(|&c| c == '.')
            .filter(|&offset| offset > 0);
        match period {
            Some(offset) => {
                let stop = start + offset + 1;
                chunks.push(chars[start..stop].iter().collect());
                start = stop;
            }
            None => {
                chunks.push(chars[start..end].iter().collect());
                start = end;
            }
        }
    }
    chunks
}

/// Settings for one summarization run.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Records kept from the start of the collection
    pub limit: usize,
    pub max_chunk_len: usize,
    /// Pause after each successful request
    pub pacing: Duration,
    /// Field the summaries are written to
    pub target: SummaryModel,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            limit: 200,
            max_chunk_len: 1500,
            pacing: Duration::from_secs(4),
            target: SummaryModel::Gemini,
        }
    }
}

/// Counters reported by [`summarize_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummarizeStats {
    pub records: usize,
    pub chunks: usize,
    pub failed_chunks: usize,
}

/// Summarizes the first `options.limit` records in place, dropping the rest.
///
/// Each article is split with [`split_text`]; the chunk summaries are joined
/// with a space into the target field. A chunk whose request fails
/// contributes an empty string and the run continues.
pub fn summarize_records(
    records: &mut Vec<ArticleRecord>,
    summarizer: &dyn Summarizer,
    options: &SummarizeOptions,
) -> SummarizeStats {
    records.truncate(options.limit);
    let total = records.len();
    let mut stats = SummarizeStats {
        records: total,
        ..Default::default()
    };

    for (index, record) in records.iter_mut().enumerate() {
        info!("({}/{}) summarizing {}", index + 1, total, record.title);

        let mut parts = Vec::new();
        for chunk in split_text(&record.original_text, options.max_chunk_len) {
            stats.chunks += 1;
            match summarizer.generate(&chunk) {
                Ok(summary) => {
                    parts.push(summary);
                    if !options.pacing.is_zero() {
                        thread::sleep(options.pacing);
                    }
                }
                Err(err) => {
                    warn!(id = %record.id, error = %err, "chunk summary failed");
                    stats.failed_chunks += 1;
                    parts.push(String::new());
                }
            }
        }
        record.set_candidate(options.target, parts.join(" ").trim().to_string());
    }

    stats
}
