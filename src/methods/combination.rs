//! Combination Weighting
//!
//! Additive aggregation with final weights (AHP × entropy):
//! - dimension score = Σ(normalized × final) / Σ final over the dimension's indicators
//! - total score = Σ dimension score × AHP weight

use super::{BatchScore, ScoringInputs};
use crate::weights::FinalWeights;

pub fn score(inputs: &ScoringInputs) -> Vec<BatchScore> {
    let final_weights = FinalWeights::compose(inputs.ahp_weights, inputs.entropy);
    let n_dims = inputs.ahp_weights.len();

    (0..inputs.normalized.n_samples())
        .map(|sample| {
            let indicator_scores: Vec<Vec<f64>> = (0..n_dims)
                .map(|d| {
                    inputs
                        .normalized
                        .dimension(d)
                        .iter()
                        .map(|column| column[sample])
                        .collect()
                })
                .collect();

            let dimension_scores: Vec<f64> = indicator_scores
                .iter()
                .enumerate()
                .map(|(d, values)| weighted_mean(values, final_weights.dimension(d)))
                .collect();

            let total_score = dimension_scores
                .iter()
                .zip(inputs.ahp_weights)
                .map(|(s, w)| s * w)
                .sum();

            BatchScore {
                total_score,
                dimension_scores,
                indicator_scores,
                membership: None,
            }
        })
        .collect()
}

/// Σ(v × w) / Σw; plain mean if the weights vanish
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum > 0.0 {
        values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / weight_sum
    } else if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
