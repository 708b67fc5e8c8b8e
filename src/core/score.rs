//! Greedy cosine matching between token embeddings.

use tch::{Kind, Tensor};

/// Precision, recall and F1 for one candidate-reference pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BERTScoreResult {
    /// Mean best-match similarity of candidate tokens
    pub precision: f32,
    /// Mean best-match similarity of reference tokens
    pub recall: f32,
    /// Harmonic mean of precision and recall
    pub f1: f32,
}

impl BERTScoreResult {
    pub const ZERO: BERTScoreResult = BERTScoreResult {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
    };
}

/// Computes BERTScore between candidate and reference token embeddings.
///
/// # Arguments
/// * `candidate_embeddings` - (seq_len_c × hidden) embeddings of the candidate
/// * `reference_embeddings` - (seq_len_r × hidden) embeddings of the reference
/// * `candidate_mask` - 1.0 for tokens that take part in matching, 0.0 otherwise
/// * `reference_mask` - same for the reference
///
/// Each token is matched to its most similar token on the other side and the
/// matches are averaged uniformly over the unmasked tokens.
pub fn compute_bertscore(
    candidate_embeddings: &Tensor,
    reference_embeddings: &Tensor,
    candidate_mask: &Tensor,
    reference_mask: &Tensor,
) -> BERTScoreResult {
    let candidate_norm = normalize_embeddings(candidate_embeddings);
    let reference_norm = normalize_embeddings(reference_embeddings);

    // (seq_len_c × seq_len_r)
    let similarity = candidate_norm.matmul(&reference_norm.transpose(0, 1));
    let similarity = apply_masks(&similarity, candidate_mask, reference_mask);

    let precision = greedy_match(&similarity, candidate_mask, 1);
    let recall = greedy_match(&similarity, reference_mask, 0);

    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    BERTScoreResult {
        precision,
        recall,
        f1,
    }
}

/// L2-normalizes every row, leaving all-zero rows at zero.
fn normalize_embeddings(embeddings: &Tensor) -> Tensor {
    let norms = embeddings.norm_scalaropt_dim(2.0, [1], true).clamp_min(1e-12);
    embeddings / norms
}

/// Sets similarities involving a masked token to -inf so max never selects them.
fn apply_masks(similarity: &Tensor, candidate_mask: &Tensor, reference_mask: &Tensor) -> Tensor {
    let pair_mask = (candidate_mask.unsqueeze(1) * reference_mask.unsqueeze(0)).gt(0.5);
    let floor = Tensor::full_like(similarity, f64::NEG_INFINITY).to_device(pair_mask.device());
    similarity.where_self(&pair_mask, &floor)
}

/// Averages, over the unmasked tokens of one side, the best similarity found
/// along `dim` (1 matches candidate tokens, 0 matches reference tokens).
fn greedy_match(similarity: &Tensor, mask: &Tensor, dim: i64) -> f32 {
    let count = mask.sum(Kind::Float).double_value(&[]);
    if count <= 0.0 {
        return 0.0;
    }
    let best = similarity.max_dim(dim, false).0;
    let best = best.where_self(&mask.gt(0.5), &Tensor::zeros_like(&best));
    ((best * mask).sum(Kind::Float).double_value(&[]) / count) as f32
}

/// Mask that keeps real tokens and drops special tokens and padding.
///
/// # Arguments
/// * `token_ids` - token ids of one sequence
/// * `special_token_ids` - ids to exclude (CLS/BOS, SEP, PAD)
/// * `length` - sequence length before padding
pub fn create_scoring_mask(token_ids: &[i64], special_token_ids: &[i64], length: usize) -> Tensor {
    let mask: Vec<f32> = token_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            if i >= length || special_token_ids.contains(id) {
                0.0
            } else {
                1.0
            }
        })
        .collect();
    Tensor::from_slice(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_embeddings() {
        let embeddings = Tensor::from_slice2(&[&[3.0f32, 4.0], &[0.0, 0.0]]);
        let normalized = normalize_embeddings(&embeddings);
        let expected = Tensor::from_slice2(&[&[0.6f32, 0.8], &[0.0, 0.0]]);
        assert!((normalized - expected).abs().max().double_value(&[]) < 1e-6);
    }

    #[test]
    fn test_exact_match_scores_one() {
        let emb = Tensor::from_slice2(&[&[1.0f32, 0.0], &[0.0, 1.0]]);
        let mask = Tensor::from_slice(&[1.0f32, 1.0]);
        let result = compute_bertscore(&emb, &emb, &mask, &mask);
        assert!((result.precision - 1.0).abs() < 1e-5);
        assert!((result.recall - 1.0).abs() < 1e-5);
        assert!((result.f1 - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_greedy_matching_precision_and_recall() {
        let cand = Tensor::from_slice2(&[&[1.0f32, 0.0], &[0.0, 1.0]]);
        let reference = Tensor::from_slice2(&[&[1.0f32, 0.0], &[0.5, 0.866], &[0.0, 1.0]]);
        let cand_mask = Tensor::from_slice(&[1.0f32, 1.0]);
        let ref_mask = Tensor::from_slice(&[1.0f32, 1.0, 1.0]);

        let result = compute_bertscore(&cand, &reference, &cand_mask, &ref_mask);

        // Recall: (1.0 + 0.866 + 1.0) / 3
        assert!((result.precision - 1.0).abs() < 0.01);
        assert!((result.recall - 0.955).abs() < 0.01);
        assert!(result.f1 > 0.9 && result.f1 < 1.0);
    }

    #[test]
    fn test_masked_tokens_are_ignored() {
        // The second candidate token is orthogonal to everything but masked out.
        let cand = Tensor::from_slice2(&[&[1.0f32, 0.0, 0.0], &[0.0, 0.0, 1.0]]);
        let reference = Tensor::from_slice2(&[&[1.0f32, 0.0, 0.0]]);
        let cand_mask = Tensor::from_slice(&[1.0f32, 0.0]);
        let ref_mask = Tensor::from_slice(&[1.0f32]);

        let result = compute_bertscore(&cand, &reference, &cand_mask, &ref_mask);
        assert!((result.f1 - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_scoring_mask_excludes_special_and_padding() {
        let mask = create_scoring_mask(&[0, 11, 12, 2, 1, 1], &[0, 1, 2], 4);
        let values: Vec<f32> = (0..6).map(|i| mask.double_value(&[i]) as f32).collect();
        assert_eq!(values, vec![0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }
}
