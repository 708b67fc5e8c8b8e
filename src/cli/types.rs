//! Command-line interface for summary-eval.
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dataset::SummaryModel;
use crate::eval::EvalConfig;
use crate::metrics::DEFAULT_MAX_N;

#[derive(Parser)]
#[command(name = "summary-eval", version, about = "News summary dataset pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score candidate summaries and write the metrics CSV
    Evaluate(EvaluateArgs),

    /// Parse raw article dumps into per-category record collections
    Ingest(IngestArgs),

    /// Fill one summary field of a collection using Gemini
    Summarize(SummarizeArgs),

    /// Convert a record collection to a flattened, fully quoted CSV
    ExportCsv(ExportArgs),
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Directory holding the `*.json` collections
    #[arg(short, long, default_value = "faza3")]
    pub input: PathBuf,

    /// Scorecard CSV to write
    #[arg(short, long, default_value = "Metrike_sumarizacija_inicijali.csv")]
    pub output: PathBuf,

    /// Highest n-gram order for density
    #[arg(long, default_value_t = DEFAULT_MAX_N)]
    pub max_n: usize,

    /// Language of the texts; selects the BERTScore encoder
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// Pairs per encoder forward pass
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Hidden-state index to take embeddings from (negative counts from the last layer)
    #[arg(long, allow_hyphen_values = true)]
    pub layer: Option<i32>,

    /// Run the encoder on CPU even when CUDA is available
    #[arg(long)]
    pub cpu: bool,

    #[clap(flatten)]
    pub vocab: VocabSpec,
}

impl EvaluateArgs {
    pub fn eval_config(&self) -> EvalConfig {
        EvalConfig::new(&self.input, &self.output)
            .max_n(self.max_n)
            .language(&self.lang)
            .batch_size(self.batch_size)
            .num_layers(self.layer)
            .force_cpu(self.cpu)
    }
}

/// Local tokenizer files, for running without access to the hub.
#[derive(Debug, Args)]
pub struct VocabSpec {
    /// Path to vocabulary file
    #[arg(long)]
    pub vocab: Option<PathBuf>,

    /// Path to merges file (BPE tokenizers)
    #[arg(long, requires = "vocab")]
    pub merges: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Directory with one sub-directory of `*.txt` dumps per category
    #[arg(short, long)]
    pub root: PathBuf,

    /// Where the collections are written
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Portal name prefixed to every output file
    #[arg(short, long)]
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliSummaryModel {
    Extractive,
    Chatgpt,
    Gemini,
    Claude,
}

impl From<CliSummaryModel> for SummaryModel {
    fn from(model: CliSummaryModel) -> Self {
        match model {
            CliSummaryModel::Extractive => SummaryModel::Extractive,
            CliSummaryModel::Chatgpt => SummaryModel::ChatGpt,
            CliSummaryModel::Gemini => SummaryModel::Gemini,
            CliSummaryModel::Claude => SummaryModel::Claude,
        }
    }
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    /// Collection to summarize
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the result; the input is rewritten when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Records kept from the start of the collection
    #[arg(long, default_value_t = 200)]
    pub limit: usize,

    /// Maximum characters per request
    #[arg(long, default_value_t = 1500)]
    pub chunk_len: usize,

    /// Seconds to wait after each request
    #[arg(long, default_value_t = 4)]
    pub pacing_secs: u64,

    /// Summary field to fill
    #[arg(long, default_value = "gemini")]
    pub target: CliSummaryModel,

    /// Gemini model name
    #[arg(long, default_value = crate::summarize::gemini::DEFAULT_MODEL)]
    pub model: String,

    /// Instruction placed before each text
    #[arg(long, default_value = crate::summarize::gemini::DEFAULT_PROMPT)]
    pub prompt: String,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Collection to export
    #[arg(short, long)]
    pub input: PathBuf,

    /// CSV file to write
    #[arg(short, long)]
    pub output: PathBuf,
}
