use anyhow::Result;
use tracing::info;

use crate::cli::EvaluateArgs;
use crate::core::BERTScorer;
use crate::eval::run_evaluation;

/// Loads the encoder for the requested language and writes the scorecard.
pub fn cmd_evaluate(args: EvaluateArgs) -> Result<()> {
    let config = args.eval_config();

    let mut scorer_config = config.scorer_config();
    if let Some(vocab) = args.vocab.vocab {
        scorer_config.vocab_path = vocab;
        scorer_config.merges_path = args.vocab.merges;
    }
    let scorer = BERTScorer::new(scorer_config)?;

    let scorecard = run_evaluation(&config, &scorer)?;
    info!(
        rows = scorecard.len(),
        "results saved to {}",
        config.output_path.display()
    );
    Ok(())
}
