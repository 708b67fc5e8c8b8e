//! Typed failures for the evaluation and summarization stages.

/// Fatal failures of an evaluation run.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The input location is missing or is not a directory.
    #[error("input directory not found: {0}")]
    InputNotFound(String),

    /// No (summary, reference) pair was collected, so there is nothing to score.
    #[error("no summary/reference pairs to score")]
    EmptyBatch,

    /// The semantic similarity scorer failed for the whole batch.
    #[error("batched semantic scoring failed: {0}")]
    BatchScoring(String),

    /// The scorer returned a different number of scores than pairs submitted.
    #[error("semantic scorer returned {got} scores for {expected} pairs")]
    MisalignedBatch { expected: usize, got: usize },
}

/// Failures reported by a summarization backend.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("unexpected response shape: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}
