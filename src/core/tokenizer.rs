//! Subword tokenization and batch padding for the encoder.

use std::path::PathBuf;

use anyhow::Error;
use rust_bert::pipelines::common::{ModelType, TokenizerOption};
use rust_tokenizers::tokenizer::TruncationStrategy;
use tch::{Device, Tensor};

use crate::Result;

/// Wrapper around a BERT-family tokenizer producing padded model inputs.
pub struct Tokenizer {
    pub(crate) tokenizer: TokenizerOption,
    max_len: usize,
}

/// Padded batch inputs plus the unpadded token ids of every sequence.
pub struct EncodingResult {
    /// Input ids, shape (batch_size, seq_len).
    pub input_ids: Tensor,
    /// 1 for real tokens, 0 for padding, shape (batch_size, seq_len).
    pub attention_mask: Tensor,
    /// Segment ids, shape (batch_size, seq_len).
    pub token_type_ids: Tensor,
    /// Token ids per sequence before padding, special tokens included.
    pub token_ids: Vec<Vec<i64>>,
    /// Number of tokens of each sequence before padding.
    pub lengths: Vec<usize>,
}

pub struct TokenizerArgs {
    pub model: ModelType,
    pub vocab_path: PathBuf,
    pub merges_path: Option<PathBuf>,
    pub lower_case: bool,
    pub max_len: usize,
}

fn padded<T: Copy>(values: &[T], pad: T, len: usize) -> Vec<T> {
    let mut out = values.to_vec();
    out.resize(len.max(values.len()), pad);
    out
}

fn stack_rows<T: Copy + tch::kind::Element>(rows: &[Vec<T>], device: Device) -> Tensor {
    let rows: Vec<Tensor> = rows.iter().map(|row| Tensor::from_slice(row)).collect();
    Tensor::stack(&rows, 0).to_device(device)
}

impl Tokenizer {
    /// Loads the tokenizer for `args.model` from local vocabulary files.
    ///
    /// BPE tokenizers (RoBERTa, GPT-2) are created with a prefix space so the
    /// first word is encoded like every other word.
    pub fn new(args: TokenizerArgs) -> Result<Self> {
        let add_prefix_space = match args.model {
            ModelType::Roberta | ModelType::GPT2 => Some(true),
            _ => None,
        };
        let vocab = args
            .vocab_path
            .to_str()
            .ok_or(Error::msg("Invalid vocab path"))?;
        let merges = args
            .merges_path
            .as_ref()
            .map(|p| p.to_str().ok_or(Error::msg("Invalid merges path")))
            .transpose()?;

        let tokenizer = TokenizerOption::from_file(
            args.model,
            vocab,
            merges,
            args.lower_case,
            None,
            add_prefix_space,
        )?;
        Ok(Tokenizer {
            tokenizer,
            max_len: args.max_len,
        })
    }

    /// Encodes a batch of texts, truncating to the maximum length and padding
    /// every sequence to the longest one in the batch.
    pub fn encode<S: AsRef<str> + Send + Sync>(&self, texts: &[S], device: Device) -> EncodingResult {
        let inputs = self.tokenizer.encode_list(
            texts,
            self.max_len,
            &TruncationStrategy::LongestFirst,
            0,
        );
        let pad_id = self.tokenizer.get_pad_id().unwrap_or(0);
        let batch_len = inputs.iter().map(|i| i.token_ids.len()).max().unwrap_or(0);

        let mut token_ids = Vec::with_capacity(inputs.len());
        let mut lengths = Vec::with_capacity(inputs.len());
        let mut id_rows = Vec::with_capacity(inputs.len());
        let mut mask_rows = Vec::with_capacity(inputs.len());
        let mut type_rows = Vec::with_capacity(inputs.len());

        for input in inputs {
            let len = input.token_ids.len();
            let segments: Vec<i64> = input.segment_ids.iter().map(|&s| s as i64).collect();

            id_rows.push(padded(&input.token_ids, pad_id, batch_len));
            mask_rows.push(padded(&vec![1i64; len], 0, batch_len));
            type_rows.push(padded(&segments, 0, batch_len));
            lengths.push(len);
            token_ids.push(input.token_ids);
        }

        EncodingResult {
            input_ids: stack_rows(&id_rows, device),
            attention_mask: stack_rows(&mask_rows, device),
            token_type_ids: stack_rows(&type_rows, device),
            token_ids,
            lengths,
        }
    }
}
