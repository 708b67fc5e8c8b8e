//! Hugging Face hub access for tokenizer vocabularies.

use std::path::PathBuf;

use anyhow::Context;
use hf_hub::api::sync::Api;

use crate::Result;

/// Downloads (or reuses from the local hub cache) the vocabulary of `model_name`.
///
/// WordPiece models ship `vocab.txt`; BPE models ship `vocab.json` plus
/// `merges.txt`, which is returned when present.
pub fn fetch_vocab_files(model_name: &str) -> Result<(PathBuf, Option<PathBuf>)> {
    let api = Api::new().context("initializing Hugging Face hub client")?;
    let repo = api.model(model_name.to_string());

    let vocab_path = repo
        .get("vocab.txt")
        .or_else(|_| repo.get("vocab.json"))
        .map_err(|e| {
            anyhow::anyhow!("failed to fetch vocab.txt or vocab.json for {}: {}", model_name, e)
        })?;

    let merges_path = repo.get("merges.txt").ok();

    Ok((vocab_path, merges_path))
}
