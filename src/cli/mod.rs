pub mod types;
mod evaluate;
mod export;
mod ingest;
mod summarize;

pub use types::{Cli, Command, EvaluateArgs, ExportArgs, IngestArgs, SummarizeArgs, VocabSpec};
pub use evaluate::cmd_evaluate;
pub use export::cmd_export;
pub use ingest::cmd_ingest;
pub use summarize::cmd_summarize;
