//! Deferred, batched semantic similarity scoring.
//!
//! Pairs are collected while records are walked and scored in a single call
//! at the end. Every pair gets a [`PairId`] when it is queued; the scores come
//! back in queue order and are looked up by that id.

use tracing::info;

use crate::core::BERTScorer;
use crate::error::EvalError;
use crate::Result;

/// A candidate summary and the reference it is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePair {
    pub candidate: String,
    pub reference: String,
}

/// Capability to score many (candidate, reference) pairs in one call.
///
/// Implementations must return exactly one score per pair, in input order.
pub trait SemanticScorer {
    fn batch_score(&self, pairs: &[ScorePair]) -> Result<Vec<f32>>;
}

impl SemanticScorer for BERTScorer {
    /// BERTScore F1 of each pair.
    fn batch_score(&self, pairs: &[ScorePair]) -> Result<Vec<f32>> {
        let candidates: Vec<&str> = pairs.iter().map(|p| p.candidate.as_str()).collect();
        let references: Vec<&str> = pairs.iter().map(|p| p.reference.as_str()).collect();
        Ok(self
            .score(&candidates, &references)?
            .into_iter()
            .map(|result| result.f1)
            .collect())
    }
}

/// Position of a pair in a [`DeferredBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairId(usize);

/// Ordered buffer of pairs waiting for one batched scoring call.
#[derive(Debug, Default)]
pub struct DeferredBatch {
    pairs: Vec<ScorePair>,
}

impl DeferredBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a pair and returns the id its score will be found under.
    pub fn push(&mut self, candidate: &str, reference: &str) -> PairId {
        let id = PairId(self.pairs.len());
        self.pairs.push(ScorePair {
            candidate: candidate.to_string(),
            reference: reference.to_string(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Scores every queued pair with one call to `scorer`.
    ///
    /// Fails when nothing was queued, when the scorer fails, or when it returns
    /// a different number of scores than pairs.
    pub fn flush(self, scorer: &dyn SemanticScorer) -> std::result::Result<BatchScores, EvalError> {
        if self.pairs.is_empty() {
            return Err(EvalError::EmptyBatch);
        }

        info!(pairs = self.pairs.len(), "calculating BERTScore");
        let scores = scorer
            .batch_score(&self.pairs)
            .map_err(|err| EvalError::BatchScoring(format!("{:#}", err)))?;

        if scores.len() != self.pairs.len() {
            return Err(EvalError::MisalignedBatch {
                expected: self.pairs.len(),
                got: scores.len(),
            });
        }
        Ok(BatchScores { scores })
    }
}

/// Scores returned by [`DeferredBatch::flush`], addressable by [`PairId`].
#[derive(Debug)]
pub struct BatchScores {
    scores: Vec<f32>,
}

impl BatchScores {
    pub fn get(&self, id: PairId) -> Option<f32> {
        self.scores.get(id.0).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
