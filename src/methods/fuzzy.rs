//! Fuzzy Comprehensive Evaluation
//!
//! Five linguistic grades with trapezoidal membership functions over the
//! 0-100 normalized domain.
//!
//! Level 1 (per dimension): R = indicator × grade memberships, A = entropy
//! weights renormalized within the dimension, B = A · R.
//! Level 2 (target): R_total = stacked dimension vectors, A_total = AHP
//! weights, B_total = A_total · R_total.
//!
//! Defuzzification dots a vector with the grade representative values
//! [95, 85, 75, 65, 50]; max-membership picks the dominant grade label.

use super::{
    compose, dot, normalize_class_vector, renormalize, BatchScore, ClassVector, MembershipProfile,
    ScoringInputs, CLASS_COUNT,
};
use crate::utils::grading::Grade;
use serde::{Deserialize, Serialize};

pub const FUZZY_GRADES: [Grade; CLASS_COUNT] = [
    Grade::Excellent,
    Grade::Good,
    Grade::Medium,
    Grade::Passing,
    Grade::Poor,
];

/// Representative score of each grade
pub const GRADE_VALUES: ClassVector = [95.0, 85.0, 75.0, 65.0, 50.0];

/// Trapezoid rising on [a, b], flat on [b, c], falling on [c, d]
///
/// Infinite bounds give an open shoulder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Trapezoid {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn membership(&self, x: f64) -> f64 {
        if x < self.a || x > self.d {
            0.0
        } else if x < self.b {
            (x - self.a) / (self.b - self.a)
        } else if x <= self.c {
            1.0
        } else {
            (self.d - x) / (self.d - self.c)
        }
    }
}

/// Membership functions, same order as `FUZZY_GRADES`
pub const MEMBERSHIP_FUNCTIONS: [Trapezoid; CLASS_COUNT] = [
    Trapezoid::new(80.0, 90.0, f64::INFINITY, f64::INFINITY),
    Trapezoid::new(70.0, 80.0, 90.0, 95.0),
    Trapezoid::new(60.0, 70.0, 80.0, 85.0),
    Trapezoid::new(50.0, 60.0, 70.0, 75.0),
    Trapezoid::new(f64::NEG_INFINITY, f64::NEG_INFINITY, 50.0, 60.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzification {
    #[default]
    WeightedAverage,
    MaxMembership,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    pub defuzzification: Defuzzification,
    /// Rescale each indicator's memberships to sum to 1
    pub normalize_memberships: bool,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            defuzzification: Defuzzification::WeightedAverage,
            normalize_memberships: true,
        }
    }
}

/// Membership row of one normalized score
pub fn membership_vector(x: f64, normalize: bool) -> ClassVector {
    let row = MEMBERSHIP_FUNCTIONS.map(|f| f.membership(x));
    if normalize {
        normalize_class_vector(row)
    } else {
        row
    }
}

pub fn score(inputs: &ScoringInputs, config: &FuzzyConfig) -> Vec<BatchScore> {
    let n_dims = inputs.ahp_weights.len();
    let level_one_weights: Vec<Vec<f64>> = (0..n_dims)
        .map(|d| renormalize(inputs.entropy.dimension(d)))
        .collect();

    (0..inputs.normalized.n_samples())
        .map(|sample| {
            let mut dimension_vectors = Vec::with_capacity(n_dims);
            let mut dimension_scores = Vec::with_capacity(n_dims);
            let mut indicator_scores = Vec::with_capacity(n_dims);

            for (d, weights) in level_one_weights.iter().enumerate() {
                let rows: Vec<ClassVector> = inputs
                    .normalized
                    .dimension(d)
                    .iter()
                    .map(|column| membership_vector(column[sample], config.normalize_memberships))
                    .collect();

                let b = compose(weights, &rows);
                dimension_scores.push(dot(&b, &GRADE_VALUES));
                dimension_vectors.push(b);

                // Defuzzified per indicator; their weighted mean equals B · V
                indicator_scores.push(rows.iter().map(|r| dot(r, &GRADE_VALUES)).collect());
            }

            let total = compose(inputs.ahp_weights, &dimension_vectors);
            let total_score = dot(&total, &GRADE_VALUES);

            BatchScore {
                total_score,
                dimension_scores,
                indicator_scores,
                membership: Some(MembershipProfile::new(FUZZY_GRADES, total, dimension_vectors)),
            }
        })
        .collect()
}
