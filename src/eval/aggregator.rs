//! Folding per-record metrics into the scorecard.

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::semantic::{DeferredBatch, PairId, SemanticScorer};
use crate::dataset::{ArticleRecord, SummaryModel};
use crate::error::EvalError;
use crate::metrics::{compression, coverage, density, RougeScorer};
use crate::Result;

/// Scores of one candidate summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub category: String,
    pub id: String,
    pub model: SummaryModel,
    pub compression: f64,
    pub coverage: f64,
    /// Matched n-grams per summary token, ×100; can exceed 100
    pub density: f64,
    pub rouge1: f64,
    pub rouge2: f64,
    pub rouge_l: f64,
    pub bertscore: f64,
}

/// Row whose semantic score is still queued in the batch.
struct PendingRow {
    row: MetricRow,
    pair: PairId,
}

/// Walks records and accumulates rows for one evaluation run.
///
/// Lexical metrics and ROUGE are computed as records arrive; semantic
/// similarity is deferred and computed for all rows at once by [`finish`].
///
/// [`finish`]: Aggregator::finish
pub struct Aggregator {
    max_n: usize,
    rouge: RougeScorer,
    pending: Vec<PendingRow>,
    batch: DeferredBatch,
    records_seen: usize,
}

impl Aggregator {
    pub fn new(max_n: usize) -> Self {
        Self {
            max_n,
            rouge: RougeScorer::new(true),
            pending: Vec::new(),
            batch: DeferredBatch::new(),
            records_seen: 0,
        }
    }

    /// Scores every non-empty candidate of `record` and returns how many rows it added.
    pub fn add_record(&mut self, record: &ArticleRecord) -> usize {
        self.records_seen += 1;
        let mut added = 0;

        for (model, summary) in record.candidates() {
            if summary.trim().is_empty() {
                debug!(id = %record.id, model = model.label(), "no summary, skipping");
                continue;
            }

            let original = &record.original_text;
            let reference = &record.reference_summary;
            let rouge = self.rouge.score(reference, summary);
            let pair = self.batch.push(summary, reference);

            self.pending.push(PendingRow {
                row: MetricRow {
                    category: record.category.clone(),
                    id: record.id.clone(),
                    model,
                    compression: compression(original, summary),
                    coverage: coverage(original, summary),
                    density: density(original, summary, self.max_n) * 100.0,
                    rouge1: rouge.rouge1.fmeasure,
                    rouge2: rouge.rouge2.fmeasure,
                    rouge_l: rouge.rouge_l.fmeasure,
                    bertscore: 0.0,
                },
                pair,
            });
            added += 1;
        }
        added
    }

    /// Records seen so far.
    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Rows waiting for their semantic score.
    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Runs the single batched semantic scoring pass and completes every row.
    pub fn finish(self, scorer: &dyn SemanticScorer) -> std::result::Result<Scorecard, EvalError> {
        let expected = self.pending.len();
        let scores = self.batch.flush(scorer)?;

        let rows = self
            .pending
            .into_iter()
            .map(|PendingRow { mut row, pair }| {
                let score = scores.get(pair).ok_or(EvalError::MisalignedBatch {
                    expected,
                    got: scores.len(),
                })?;
                row.bertscore = f64::from(score);
                Ok(row)
            })
            .collect::<std::result::Result<Vec<_>, EvalError>>()?;

        Ok(Scorecard { rows })
    }
}

/// Header of the scorecard CSV.
pub const SCORECARD_HEADER: [&str; 10] = [
    "Kategorija",
    "ID",
    "Model",
    "Compression",
    "Coverage",
    "Density",
    "ROUGE-1",
    "ROUGE-2",
    "ROUGE-L",
    "BERTScore",
];

#[derive(Serialize)]
struct ScorecardLine<'a> {
    #[serde(rename = "Kategorija")]
    category: &'a str,
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Model")]
    model: &'a str,
    #[serde(rename = "Compression")]
    compression: String,
    #[serde(rename = "Coverage")]
    coverage: String,
    #[serde(rename = "Density")]
    density: String,
    #[serde(rename = "ROUGE-1")]
    rouge1: String,
    #[serde(rename = "ROUGE-2")]
    rouge2: String,
    #[serde(rename = "ROUGE-L")]
    rouge_l: String,
    #[serde(rename = "BERTScore")]
    bertscore: String,
}

fn two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

impl<'a> From<&'a MetricRow> for ScorecardLine<'a> {
    fn from(row: &'a MetricRow) -> Self {
        Self {
            category: &row.category,
            id: &row.id,
            model: row.model.label(),
            compression: two_decimals(row.compression),
            coverage: two_decimals(row.coverage),
            density: two_decimals(row.density),
            rouge1: two_decimals(row.rouge1),
            rouge2: two_decimals(row.rouge2),
            rouge_l: two_decimals(row.rouge_l),
            bertscore: two_decimals(row.bertscore),
        }
    }
}

/// The final table: one row per scored (record, model) pair, in encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scorecard {
    rows: Vec<MetricRow>,
}

impl Scorecard {
    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as CSV with two-decimal numbers.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if self.rows.is_empty() {
            csv_writer.write_record(SCORECARD_HEADER)?;
        }
        for row in &self.rows {
            csv_writer.serialize(ScorecardLine::from(row))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the CSV next to `path` and renames it into place, so a failed
    /// write never leaves a truncated scorecard behind.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        let file = fs::File::create(tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        if let Err(err) = self.write_to(file) {
            let _ = fs::remove_file(tmp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(tmp_path, path) {
            let _ = fs::remove_file(tmp_path);
            return Err(err).with_context(|| format!("moving scorecard into {}", path.display()));
        }
        Ok(())
    }
}
