//! Grey Whitening Evaluation
//!
//! Five grey classes on a 0-10 scale, defined by the control points
//! a = [-2, 0, 2, 4, 6, 8, 10, 12]. Class k (1 = very poor .. 5 = excellent)
//! peaks at λ_k = (a_k + a_{k+1}) / 2 with support [a_{k-1}, a_{k+2}].
//!
//! Indicator vectors are whitening values normalized to sum to 1. Dimension
//! vectors are entropy-weighted sums; the target vector is the AHP-weighted
//! sum. Score = vector · λ × 10.

use super::{compose, dot, normalize_class_vector, BatchScore, ClassVector, MembershipProfile, ScoringInputs, CLASS_COUNT};
use crate::utils::grading::Grade;
use serde::{Deserialize, Serialize};

const CONTROL_POINTS: [f64; 8] = [-2.0, 0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0];

/// 0-100 scores map onto the 0-10 whitening scale
const SCALE: f64 = 10.0;

/// Vector order: best class first
pub const GREY_GRADES: [Grade; CLASS_COUNT] = [
    Grade::Excellent,
    Grade::Good,
    Grade::Medium,
    Grade::Poor,
    Grade::VeryPoor,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhiteningShape {
    #[default]
    Triangular,
    /// Plateau on [c_k, d_k], c_k = (a_k + λ_k)/2, d_k = (λ_k + a_{k+1})/2
    Trapezoidal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GreyConfig {
    pub whitening: WhiteningShape,
}

/// Parameters of grey class k (1-based, ascending quality)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreyClass {
    pub lower: f64,
    pub peak: f64,
    pub plateau_start: f64,
    pub plateau_end: f64,
    pub upper: f64,
}

impl GreyClass {
    pub fn new(k: usize) -> Self {
        let a = CONTROL_POINTS;
        let peak = (a[k] + a[k + 1]) / 2.0;
        Self {
            lower: a[k - 1],
            peak,
            plateau_start: (a[k] + peak) / 2.0,
            plateau_end: (peak + a[k + 1]) / 2.0,
            upper: a[k + 2],
        }
    }

    pub fn whiten(&self, x: f64, shape: WhiteningShape) -> f64 {
        if x < self.lower || x > self.upper {
            return 0.0;
        }
        let (rise_end, fall_start) = match shape {
            WhiteningShape::Triangular => (self.peak, self.peak),
            WhiteningShape::Trapezoidal => (self.plateau_start, self.plateau_end),
        };
        if x < rise_end {
            (x - self.lower) / (rise_end - self.lower)
        } else if x <= fall_start {
            1.0
        } else {
            (self.upper - x) / (self.upper - fall_start)
        }
    }
}

/// Classes in vector order (excellent first)
pub fn grey_classes() -> [GreyClass; CLASS_COUNT] {
    [5, 4, 3, 2, 1].map(GreyClass::new)
}

/// Class representative values λ in vector order: [9, 7, 5, 3, 1]
pub fn class_values() -> ClassVector {
    grey_classes().map(|c| c.peak)
}

/// Normalized whitening vector of one 0-100 score
///
/// A value outside every support yields the uniform vector.
pub fn grey_vector(score_100: f64, shape: WhiteningShape) -> ClassVector {
    let x = score_100 / SCALE;
    normalize_class_vector(grey_classes().map(|c| c.whiten(x, shape)))
}

pub fn score(inputs: &ScoringInputs, config: &GreyConfig) -> Vec<BatchScore> {
    let lambdas = class_values();
    let n_dims = inputs.ahp_weights.len();

    (0..inputs.normalized.n_samples())
        .map(|sample| {
            let mut dimension_vectors = Vec::with_capacity(n_dims);
            let mut dimension_scores = Vec::with_capacity(n_dims);
            let mut indicator_scores = Vec::with_capacity(n_dims);

            for d in 0..n_dims {
                let rows: Vec<ClassVector> = inputs
                    .normalized
                    .dimension(d)
                    .iter()
                    .map(|column| grey_vector(column[sample], config.whitening))
                    .collect();

                let vector = compose(inputs.entropy.dimension(d), &rows);
                dimension_scores.push(dot(&vector, &lambdas) * SCALE);
                dimension_vectors.push(vector);
                indicator_scores.push(rows.iter().map(|r| dot(r, &lambdas) * SCALE).collect());
            }

            let total = compose(inputs.ahp_weights, &dimension_vectors);
            let total_score = dot(&total, &lambdas) * SCALE;

            BatchScore {
                total_score,
                dimension_scores,
                indicator_scores,
                membership: Some(MembershipProfile::new(GREY_GRADES, total, dimension_vectors)),
            }
        })
        .collect()
}
