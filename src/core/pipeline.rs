//! BERTScore pipeline: tokenizer, encoder and greedy matching.

use crate::core::{
    api::fetch_vocab_files,
    model::Model,
    score::{compute_bertscore, create_scoring_mask, BERTScoreResult},
    tokenizer::{Tokenizer, TokenizerArgs},
};
use crate::Result;
use rust_bert::pipelines::common::ModelType;
use std::path::PathBuf;
use tch::{Device, Tensor};
use tracing::{debug, info};

/// Encoder defaults for a language.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderSpec {
    pub model_type: ModelType,
    /// Hugging Face hub name, used to fetch the vocabulary
    pub model_name: &'static str,
    /// Hidden-state index, negative counts from the last layer
    pub layer: i32,
    pub lower_case: bool,
}

/// Picks the encoder for a language: RoBERTa for English, uncased BERT otherwise.
///
/// Only weights bundled as rust-bert pretrained resources are used:
/// `roberta-base` (hidden state -3) and `bert-base-uncased` (hidden state -4).
/// This differs from the usual BERTScore defaults of `roberta-large` layer 17
/// for English and `bert-base-multilingual-cased` elsewhere. Non-English text
/// is encoded with an English WordPiece vocabulary, so scores for it are only
/// comparable within this crate, not with published BERTScore numbers.
pub fn encoder_for_language(language: &str) -> EncoderSpec {
    if language.eq_ignore_ascii_case("en") {
        EncoderSpec {
            model_type: ModelType::Roberta,
            model_name: "roberta-base",
            layer: -3,
            lower_case: false,
        }
    } else {
        EncoderSpec {
            model_type: ModelType::Bert,
            model_name: "bert-base-uncased",
            layer: -4,
            lower_case: true,
        }
    }
}

/// Configuration for BERTScorer.
#[derive(Debug, Clone)]
pub struct BERTScorerConfig {
    /// Encoder family
    pub model_type: ModelType,
    /// Hub name of the model (vocabulary source)
    pub model_name: String,
    /// Language the encoder was chosen for
    pub language: String,
    /// Local vocabulary file; fetched from the hub when empty
    pub vocab_path: PathBuf,
    /// Local merges file for BPE tokenizers
    pub merges_path: Option<PathBuf>,
    /// Whether to lowercase input text
    pub lower_case: bool,
    /// Device to run on (CPU or CUDA)
    pub device: Device,
    /// Hidden-state index to take embeddings from (negative counts from the end)
    pub num_layers: Option<i32>,
    /// Maximum sequence length
    pub max_length: usize,
    /// Pairs per forward pass
    pub batch_size: usize,
}

impl BERTScorerConfig {
    /// Default configuration for the encoder associated with `language`.
    pub fn for_language(language: &str) -> Self {
        let spec = encoder_for_language(language);
        Self {
            model_type: spec.model_type,
            model_name: spec.model_name.into(),
            language: language.into(),
            vocab_path: PathBuf::default(),
            merges_path: None,
            lower_case: spec.lower_case,
            device: Device::Cpu,
            num_layers: Some(spec.layer),
            max_length: 512,
            batch_size: 64,
        }
    }
}

impl Default for BERTScorerConfig {
    fn default() -> Self {
        Self::for_language("en")
    }
}

/// BERTScorer handles the full BERTScore pipeline.
pub struct BERTScorer {
    tokenizer: Tokenizer,
    model: Model,
    config: BERTScorerConfig,
    special_token_ids: Vec<i64>,
}

impl BERTScorer {
    /// Get the configuration.
    pub fn config(&self) -> &BERTScorerConfig {
        &self.config
    }

    /// Loads the tokenizer and encoder described by `config`.
    pub fn new(config: BERTScorerConfig) -> Result<Self> {
        let (vocab_path, merges_path) = if config.vocab_path.as_os_str().is_empty() {
            fetch_vocab_files(&config.model_name)?
        } else {
            (config.vocab_path.clone(), config.merges_path.clone())
        };

        let tokenizer = Tokenizer::new(TokenizerArgs {
            model: config.model_type,
            vocab_path,
            merges_path,
            lower_case: config.lower_case,
            max_len: config.max_length,
        })?;

        let model = Model::new(config.model_type, config.device)?;

        let mut special_token_ids = Vec::new();
        for id in [
            tokenizer.tokenizer.get_bos_id(),
            tokenizer.tokenizer.get_sep_id(),
            tokenizer.tokenizer.get_pad_id(),
        ]
        .into_iter()
        .flatten()
        {
            if !special_token_ids.contains(&id) {
                special_token_ids.push(id);
            }
        }

        info!(
            model = %config.model_name,
            language = %config.language,
            device = ?config.device,
            "loaded BERTScore encoder"
        );

        Ok(Self {
            tokenizer,
            model,
            config,
            special_token_ids,
        })
    }

    /// Scores candidate-reference pairs, `candidates[i]` against `references[i]`.
    ///
    /// Pairs are processed in mini-batches of `batch_size`; results keep input order.
    pub fn score<S: AsRef<str> + Send + Sync>(
        &self,
        candidates: &[S],
        references: &[S],
    ) -> Result<Vec<BERTScoreResult>> {
        if candidates.len() != references.len() {
            return Err(anyhow::anyhow!(
                "Number of candidates ({}) must equal number of references ({})",
                candidates.len(),
                references.len()
            ));
        }

        let batch_size = self.config.batch_size.max(1);
        let mut all_results = Vec::with_capacity(candidates.len());

        for batch_start in (0..candidates.len()).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(candidates.len());
            debug!(batch_start, batch_end, total = candidates.len(), "scoring batch");
            let batch_results = self.score_batch(
                &candidates[batch_start..batch_end],
                &references[batch_start..batch_end],
            )?;
            all_results.extend(batch_results);
        }

        Ok(all_results)
    }

    fn score_batch<S: AsRef<str> + Send + Sync>(
        &self,
        candidates: &[S],
        references: &[S],
    ) -> Result<Vec<BERTScoreResult>> {
        let device = self.config.device;
        let cand_encoding = self.tokenizer.encode(candidates, device);
        let ref_encoding = self.tokenizer.encode(references, device);

        let cand_hidden_states = self.model.forward(
            &cand_encoding.input_ids,
            &cand_encoding.attention_mask,
            Some(&cand_encoding.token_type_ids),
        )?;
        let ref_hidden_states = self.model.forward(
            &ref_encoding.input_ids,
            &ref_encoding.attention_mask,
            Some(&ref_encoding.token_type_ids),
        )?;

        let layer_idx = layer_index(self.config.num_layers, cand_hidden_states.len())?;
        let cand_embeddings = &cand_hidden_states[layer_idx];
        let ref_embeddings = &ref_hidden_states[layer_idx];

        let mut results = Vec::with_capacity(candidates.len());
        for i in 0..candidates.len() {
            let cand_len = cand_encoding.lengths[i];
            let ref_len = ref_encoding.lengths[i];

            let cand_mask = create_scoring_mask(
                &cand_encoding.token_ids[i],
                &self.special_token_ids,
                cand_len,
            )
            .to_device(device);
            let ref_mask =
                create_scoring_mask(&ref_encoding.token_ids[i], &self.special_token_ids, ref_len)
                    .to_device(device);

            // An empty text has only special tokens left and scores zero.
            if !has_tokens(&cand_mask) || !has_tokens(&ref_mask) {
                results.push(BERTScoreResult::ZERO);
                continue;
            }

            let cand_emb = cand_embeddings.get(i as i64).slice(0, 0, cand_len as i64, 1);
            let ref_emb = ref_embeddings.get(i as i64).slice(0, 0, ref_len as i64, 1);

            results.push(compute_bertscore(&cand_emb, &ref_emb, &cand_mask, &ref_mask));
        }

        Ok(results)
    }
}

fn has_tokens(mask: &Tensor) -> bool {
    mask.sum(tch::Kind::Float).double_value(&[]) > 0.0
}

/// Resolves the configured layer to an index into `num_states` hidden states.
fn layer_index(layer: Option<i32>, num_states: usize) -> Result<usize> {
    if num_states == 0 {
        return Err(anyhow::anyhow!("encoder produced no hidden states"));
    }
    match layer {
        Some(n) if n >= 0 => {
            let idx = n as usize;
            if idx >= num_states {
                Err(anyhow::anyhow!(
                    "Requested layer {} but model only has {} layers",
                    idx,
                    num_states
                ))
            } else {
                Ok(idx)
            }
        }
        Some(n) => {
            let idx = num_states as i64 + n as i64;
            if idx < 0 {
                Err(anyhow::anyhow!("Invalid layer index {}", n))
            } else {
                Ok(idx as usize)
            }
        }
        None => Ok(num_states - 1),
    }
}

/// Builder for creating BERTScorer with custom configuration.
pub struct BERTScorerBuilder {
    pub config: BERTScorerConfig,
}

impl BERTScorerBuilder {
    /// Creates a new builder with the English defaults.
    pub fn new() -> Self {
        Self {
            config: BERTScorerConfig::default(),
        }
    }

    /// Selects the language, resetting the encoder to that language's default.
    pub fn language(mut self, lang: &str) -> Self {
        let device = self.config.device;
        let batch_size = self.config.batch_size;
        self.config = BERTScorerConfig {
            device,
            batch_size,
            ..BERTScorerConfig::for_language(lang)
        };
        self
    }

    /// Overrides the encoder type and hub name.
    pub fn model(mut self, model_type: ModelType, model_name: &str) -> Self {
        self.config.model_type = model_type;
        self.config.model_name = model_name.to_string();
        self
    }

    /// Uses local vocabulary and merges files instead of fetching them.
    pub fn vocab_paths(mut self, vocab: PathBuf, merges: Option<PathBuf>) -> Self {
        self.config.vocab_path = vocab;
        self.config.merges_path = merges;
        self
    }

    /// Sets the device.
    pub fn device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    /// Sets the hidden-state index to extract embeddings from.
    pub fn num_layers(mut self, layers: i32) -> Self {
        self.config.num_layers = Some(layers);
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Builds the BERTScorer.
    pub fn build(self) -> Result<BERTScorer> {
        BERTScorer::new(self.config)
    }
}

impl Default for BERTScorerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
