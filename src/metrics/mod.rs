//! Per-pair summary metrics that need no model.

pub mod lexical;
pub mod rouge;
pub mod tokenize;

pub use lexical::{compression, coverage, density, DEFAULT_MAX_N};
pub use rouge::{RougeScore, RougeScorer, RougeScores};
pub use tokenize::tokenize;
