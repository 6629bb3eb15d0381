//! Analytic Hierarchy Process
//!
//! Inter-dimension weights from a positive reciprocal pairwise comparison
//! matrix. The principal eigenvector is found by power iteration; λmax is
//! the mean of (A·w)_i / w_i.
//!
//! CI = (λmax - n) / (n - 1), CR = CI / RI(n). Inconsistency (CR ≥ 0.10) is
//! reported, never fatal.

use crate::error::{EvaluationError, Result};
use crate::schema::{IndicatorSchema, PriorityMap};
use serde::{Deserialize, Serialize};

const MAX_ITERATIONS: usize = 1000;
const TOLERANCE: f64 = 1e-12;

/// Allowed deviation of a_ij · a_ji from 1
const RECIPROCAL_TOLERANCE: f64 = 1e-6;

/// Conventional acceptability threshold for the consistency ratio
pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.10;

/// Random consistency index for matrix orders 1..=10
const RANDOM_INDEX: [f64; 10] = [0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// Random consistency index RI(n); orders above 10 use 1.41
pub fn random_index(n: usize) -> f64 {
    match n {
        1..=10 => RANDOM_INDEX[n - 1],
        _ => 1.41,
    }
}

/// Source of the dimension comparison matrix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum AhpInput {
    /// The schema's own priority ranking
    #[default]
    Default,
    /// Caller-supplied ranking, dimension code → 1..N
    Priorities(PriorityMap),
    /// Explicit matrix, rows and columns in schema dimension order
    Matrix(Vec<Vec<f64>>),
}

impl AhpInput {
    pub fn resolve(&self, schema: &IndicatorSchema) -> Result<PairwiseMatrix> {
        match self {
            AhpInput::Default => PairwiseMatrix::from_priorities(schema, &schema.default_priorities()),
            AhpInput::Priorities(priorities) => PairwiseMatrix::from_priorities(schema, priorities),
            AhpInput::Matrix(rows) => {
                let matrix = PairwiseMatrix::new(rows.clone())?;
                if matrix.order() != schema.dimension_count() {
                    return Err(EvaluationError::DimensionMismatch {
                        expected: schema.dimension_count(),
                        actual: matrix.order(),
                    });
                }
                Ok(matrix)
            }
        }
    }
}

/// Square matrix of positive finite comparison ratios
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseMatrix {
    rows: Vec<Vec<f64>>,
}

impl PairwiseMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(EvaluationError::NotSquare { rows: 0, cols: 0 });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(EvaluationError::NotSquare { rows: n, cols: row.len() });
            }
            for (j, &value) in row.iter().enumerate() {
                if !(value.is_finite() && value > 0.0) {
                    return Err(EvaluationError::NonPositiveEntry { row: i, col: j, value });
                }
            }
        }
        for i in 0..n {
            for j in i..n {
                let product = rows[i][j] * rows[j][i];
                if (product - 1.0).abs() > RECIPROCAL_TOLERANCE {
                    return Err(EvaluationError::NotReciprocal {
                        row: i,
                        col: j,
                        value: rows[i][j],
                        mirror: rows[j][i],
                    });
                }
            }
        }
        Ok(Self { rows })
    }

    /// Build from a priority ranking (lower = more important)
    ///
    /// For p_i < p_j: a_ij = (p_j - p_i) + 1 and a_ji = 1 / a_ij. Rows follow
    /// the schema's dimension order.
    pub fn from_priorities(schema: &IndicatorSchema, priorities: &PriorityMap) -> Result<Self> {
        validate_priorities(schema, priorities)?;

        let ranks: Vec<i64> = schema
            .dimensions()
            .iter()
            .map(|dim| priorities.get(&dim.code).copied().unwrap_or_default())
            .collect();

        let rows = ranks
            .iter()
            .map(|&p_i| {
                ranks
                    .iter()
                    .map(|&p_j| match p_i.cmp(&p_j) {
                        std::cmp::Ordering::Less => (p_j - p_i + 1) as f64,
                        std::cmp::Ordering::Greater => 1.0 / (p_i - p_j + 1) as f64,
                        std::cmp::Ordering::Equal => 1.0,
                    })
                    .collect()
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn order(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    fn multiply(&self, v: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
            .collect()
    }
}

/// Priorities must cover exactly the schema's dimensions with ranks 1..N, each once
fn validate_priorities(schema: &IndicatorSchema, priorities: &PriorityMap) -> Result<()> {
    let n = schema.dimension_count();

    let missing: Vec<&str> = schema
        .dimension_codes()
        .into_iter()
        .filter(|code| !priorities.contains_key(*code))
        .collect();
    if !missing.is_empty() {
        return Err(EvaluationError::InvalidPriorities(format!(
            "missing dimensions {:?}",
            missing
        )));
    }

    let unknown: Vec<&String> = priorities
        .keys()
        .filter(|code| schema.dimension(code).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(EvaluationError::InvalidPriorities(format!(
            "unknown dimensions {:?}",
            unknown
        )));
    }

    let mut ranks: Vec<i64> = priorities.values().copied().collect();
    ranks.sort_unstable();
    if ranks != (1..=n as i64).collect::<Vec<_>>() {
        return Err(EvaluationError::InvalidPriorities(format!(
            "ranks must be a permutation of 1..{}, got {:?}",
            n, ranks
        )));
    }

    Ok(())
}

/// Principal eigenvector weights and consistency diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AhpWeights {
    /// Normalized to sum to 1, in matrix row order
    pub weights: Vec<f64>,
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub random_index: f64,
    pub consistency_ratio: f64,
}

impl AhpWeights {
    pub fn is_consistent(&self, threshold: f64) -> bool {
        self.consistency_ratio < threshold
    }
}

/// Dominant eigenvector by power iteration, plus CI/CR
pub fn compute_weights(matrix: &PairwiseMatrix) -> AhpWeights {
    let n = matrix.order();
    let mut w = vec![1.0 / n as f64; n];

    for _ in 0..MAX_ITERATIONS {
        let mut next = matrix.multiply(&w);
        let sum: f64 = next.iter().sum();
        next.iter_mut().for_each(|x| *x /= sum);

        let delta = next
            .iter()
            .zip(&w)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        w = next;
        if delta < TOLERANCE {
            break;
        }
    }

    let aw = matrix.multiply(&w);
    let lambda_max = aw.iter().zip(&w).map(|(a, b)| a / b).sum::<f64>() / n as f64;

    let consistency_index = if n > 1 {
        (lambda_max - n as f64) / (n as f64 - 1.0)
    } else {
        0.0
    };
    let ri = random_index(n);
    let consistency_ratio = if ri > 0.0 { consistency_index / ri } else { 0.0 };

    AhpWeights {
        weights: w,
        lambda_max,
        consistency_index,
        random_index: ri,
        consistency_ratio,
    }
}
