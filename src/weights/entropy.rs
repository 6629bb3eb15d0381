//! Entropy Weighting
//!
//! Objective intra-dimension weights from the Shannon entropy of each
//! indicator's normalized distribution across batches. Indicators that vary
//! more carry more information and receive more weight.
//!
//! Algorithm:
//! 1. p_ij = x_ij / Σ_i x_ij (an all-zero column divides by 1)
//! 2. e_j = -k Σ_i p_ij ln p_ij over p_ij > 0, k = 1 / ln(n)
//! 3. d_j = 1 - e_j, w_j = d_j / Σ d_j

use crate::schema::IndicatorSchema;
use crate::utils::normalization::NormalizedTable;
use serde::Serialize;
use tracing::debug;

/// Divergence sums below this are treated as "every indicator uniform"
const DIVERGENCE_FLOOR: f64 = 1e-12;

/// Entropy weights for the indicators of one dimension
///
/// `columns` holds one normalized column (0-100) per indicator.
///
/// Degenerate inputs fall back to equal weights: a single-sample cohort
/// (ln(1) = 0) or a dimension where no indicator diverges from uniform.
pub fn entropy_weights(columns: &[Vec<f64>]) -> Vec<f64> {
    let m = columns.len();
    match m {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }

    let equal = vec![1.0 / m as f64; m];
    let n = columns[0].len();
    if n <= 1 {
        return equal;
    }

    let k = 1.0 / (n as f64).ln();

    let divergence: Vec<f64> = columns
        .iter()
        .map(|column| {
            let sum: f64 = column.iter().map(|x| x / 100.0).sum();
            let sum = if sum == 0.0 { 1.0 } else { sum };

            let entropy: f64 = -k * column
                .iter()
                .map(|x| (x / 100.0) / sum)
                .filter(|&p| p > 0.0)
                .map(|p| p * p.ln())
                .sum::<f64>();

            // Rounding can push e_j a hair above 1
            (1.0 - entropy).max(0.0)
        })
        .collect();

    let total: f64 = divergence.iter().sum();
    if total < DIVERGENCE_FLOOR {
        return equal;
    }

    divergence.iter().map(|d| d / total).collect()
}

/// Entropy weights of every dimension, in schema order
#[derive(Debug, Clone, Serialize)]
pub struct EntropyWeights {
    per_dimension: Vec<Vec<f64>>,
}

impl EntropyWeights {
    pub fn compute(normalized: &NormalizedTable, schema: &IndicatorSchema) -> Self {
        let per_dimension = schema
            .dimensions()
            .iter()
            .enumerate()
            .map(|(d, dim)| {
                let weights = entropy_weights(normalized.dimension(d));
                debug!("{} entropy weights: {:?}", dim.code, weights);
                weights
            })
            .collect();

        Self { per_dimension }
    }

    pub fn from_vecs(per_dimension: Vec<Vec<f64>>) -> Self {
        Self { per_dimension }
    }

    pub fn dimension(&self, dim_idx: usize) -> &[f64] {
        &self.per_dimension[dim_idx]
    }

    pub fn get(&self, dim_idx: usize, ind_idx: usize) -> f64 {
        self.per_dimension[dim_idx][ind_idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<f64>> {
        self.per_dimension.iter()
    }
}
