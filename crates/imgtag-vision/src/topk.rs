//! Top-k decoding of classifier scores.

use imgtag_models::{LabelScore, Prediction};

use crate::error::{VisionError, VisionResult};
use crate::vocabulary::Vocabulary;

/// Rank `scores` and keep the best `k` as labelled pairs.
///
/// Sorted by descending score; equal scores keep vocabulary index order.
/// The result has `min(k, scores.len())` entries.
pub fn decode_top_k(scores: &[f32], vocabulary: &Vocabulary, k: usize) -> VisionResult<Prediction> {
    if k == 0 {
        return Err(VisionError::InvalidTopK(k));
    }
    if scores.len() != vocabulary.len() {
        return Err(VisionError::OutputShape {
            expected: vocabulary.len(),
            actual: scores.len(),
        });
    }

    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    // sort_by is stable, so ties stay in index order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let entries = ranked
        .into_iter()
        .take(k)
        .map(|(index, score)| {
            let label = vocabulary
                .label(index)
                .ok_or(VisionError::OutputShape {
                    expected: vocabulary.len(),
                    actual: scores.len(),
                })?;
            Ok(LabelScore::new(label, score))
        })
        .collect::<VisionResult<Vec<_>>>()?;

    Ok(Prediction::from_ranked(entries))
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
