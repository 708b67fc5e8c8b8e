//! Summary quality evaluation for news-article datasets.
//!
//! The crate covers the whole offline pipeline: ingesting raw article dumps,
//! requesting machine summaries, and scoring candidate summaries against a
//! reference with lexical metrics, ROUGE and BERTScore.

pub mod cli;
pub mod core;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod summarize;

// Re-export main types
pub use core::{BERTScorer, BERTScorerBuilder, BERTScorerConfig, BERTScoreResult};
pub use dataset::{ArticleRecord, SummaryModel};
pub use error::{EvalError, SummarizeError};
pub use eval::{Aggregator, EvalConfig, MetricRow, Scorecard, SemanticScorer};

/// Convenient alias for a result with a boxed error.
pub type Result<T> = anyhow::Result<T>;
