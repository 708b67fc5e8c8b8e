//! BERTScore engine: contextual embeddings and greedy cosine matching.

mod model;
mod pipeline;
mod score;
mod tokenizer;
pub mod api;

pub use pipeline::{encoder_for_language, BERTScorer, BERTScorerBuilder, BERTScorerConfig, EncoderSpec};
pub use score::{compute_bertscore, create_scoring_mask, BERTScoreResult};
pub use tokenizer::{EncodingResult, Tokenizer, TokenizerArgs};
