//! Weight Composition
//!
//! Final indicator weight = AHP weight of its dimension × entropy weight of
//! the indicator within that dimension. Both sets are partitions of unity, so
//! the final weights over all indicators sum to 1.

use super::entropy::EntropyWeights;
use serde::Serialize;

/// Final per-indicator weights, dimension → indicator, schema order
#[derive(Debug, Clone, Serialize)]
pub struct FinalWeights {
    per_dimension: Vec<Vec<f64>>,
}

impl FinalWeights {
    pub fn compose(ahp_weights: &[f64], entropy: &EntropyWeights) -> Self {
        let per_dimension = ahp_weights
            .iter()
            .zip(entropy.iter())
            .map(|(&dim_weight, indicator_weights)| {
                indicator_weights.iter().map(|w| dim_weight * w).collect()
            })
            .collect();

        Self { per_dimension }
    }

    pub fn dimension(&self, dim_idx: usize) -> &[f64] {
        &self.per_dimension[dim_idx]
    }

    pub fn get(&self, dim_idx: usize, ind_idx: usize) -> f64 {
        self.per_dimension[dim_idx][ind_idx]
    }

    pub fn total(&self) -> f64 {
        self.per_dimension.iter().flatten().sum()
    }
}
