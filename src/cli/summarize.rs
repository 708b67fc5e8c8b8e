use anyhow::Result;
use std::time::Duration;
use tracing::info;

use crate::cli::SummarizeArgs;
use crate::dataset::{load_records, write_candidates};
use crate::summarize::{summarize_records, GeminiClient, SummarizeOptions};

/// Summarizes a collection with Gemini and writes it back (or to `--output`).
pub fn cmd_summarize(args: SummarizeArgs) -> Result<()> {
    let client = GeminiClient::from_env()?
        .with_model(&args.model)
        .with_prompt(&args.prompt);

    let options = SummarizeOptions {
        limit: args.limit,
        max_chunk_len: args.chunk_len,
        pacing: Duration::from_secs(args.pacing_secs),
        target: args.target.into(),
    };

    let mut records = load_records(&args.input)?;
    let stats = summarize_records(&mut records, &client, &options);

    let output = args.output.as_ref().unwrap_or(&args.input);
    write_candidates(&args.input, output, &records, options.target)?;
    info!(
        records = stats.records,
        chunks = stats.chunks,
        failed = stats.failed_chunks,
        "summaries saved to {}",
        output.display()
    );
    Ok(())
}
