//! Phase 3: scoring candidate summaries into a scorecard.

mod aggregator;
mod config;
pub mod semantic;

pub use aggregator::{Aggregator, MetricRow, Scorecard, SCORECARD_HEADER};
pub use config::EvalConfig;
pub use semantic::{BatchScores, DeferredBatch, PairId, ScorePair, SemanticScorer};

use tracing::info;

use crate::dataset::{collection_files, load_records};
use crate::error::EvalError;
use crate::Result;

/// Scores every record under `config.input_dir` with `scorer` and writes the scorecard.
///
/// Nothing is written if any stage fails.
pub fn run_evaluation(config: &EvalConfig, scorer: &dyn SemanticScorer) -> Result<Scorecard> {
    if !config.input_dir.is_dir() {
        return Err(EvalError::InputNotFound(config.input_dir.display().to_string()).into());
    }

    let mut aggregator = Aggregator::new(config.max_n);
    for path in collection_files(&config.input_dir)? {
        let records = load_records(&path)?;
        let rows: usize = records.iter().map(|record| aggregator.add_record(record)).sum();
        info!(
            file = %path.display(),
            records = records.len(),
            rows,
            "processed collection"
        );
    }
    info!(
        records = aggregator.records_seen(),
        pairs = aggregator.pending_rows(),
        "lexical and ROUGE metrics done"
    );

    let scorecard = aggregator.finish(scorer)?;
    scorecard.write_csv(&config.output_path)?;
    info!(
        rows = scorecard.len(),
        output = %config.output_path.display(),
        "scorecard written"
    );
    Ok(scorecard)
}
