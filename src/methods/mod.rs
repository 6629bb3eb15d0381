//! Scoring methods
//!
//! Each method turns normalized indicator values plus entropy and AHP weights
//! into per-batch dimension and total scores:
//! - `combination`: additive weighted aggregation
//! - `fuzzy`: two-level fuzzy comprehensive evaluation
//! - `grey`: two-level grey whitening evaluation
//!
//! All three share normalization and weighting; only the aggregation differs.

pub mod combination;
pub mod fuzzy;
pub mod grey;

pub use fuzzy::{Defuzzification, FuzzyConfig, Trapezoid};
pub use grey::{GreyConfig, WhiteningShape};

use crate::utils::grading::{Grade, GradeScale};
use crate::utils::normalization::NormalizedTable;
use crate::weights::EntropyWeights;
use serde::{Deserialize, Serialize};

/// Number of ordinal classes in fuzzy and grey membership vectors
pub const CLASS_COUNT: usize = 5;

/// Membership distribution over the classes, best class first
pub type ClassVector = [f64; CLASS_COUNT];

/// Shared inputs of every scoring method
pub struct ScoringInputs<'a> {
    pub normalized: &'a NormalizedTable,
    pub entropy: &'a EntropyWeights,
    /// AHP dimension weights, schema order
    pub ahp_weights: &'a [f64],
}

/// One batch's scores, schema order throughout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScore {
    pub total_score: f64,
    pub dimension_scores: Vec<f64>,
    /// Each indicator's value on the 0-100 score scale, as it enters its
    /// dimension's entropy-weighted average
    pub indicator_scores: Vec<Vec<f64>>,
    pub membership: Option<MembershipProfile>,
}

/// Class memberships of a fuzzy or grey evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipProfile {
    /// Grade of each vector component
    pub classes: [Grade; CLASS_COUNT],
    pub total: ClassVector,
    pub dimensions: Vec<ClassVector>,
    /// Class with the largest total membership
    pub dominant: Grade,
    pub dominant_share: f64,
}

impl MembershipProfile {
    pub fn new(classes: [Grade; CLASS_COUNT], total: ClassVector, dimensions: Vec<ClassVector>) -> Self {
        let (idx, share) = argmax(&total);
        Self {
            classes,
            total,
            dimensions,
            dominant: classes[idx],
            dominant_share: share,
        }
    }
}

/// Index and value of the largest component; the first wins ties
pub fn argmax(vector: &ClassVector) -> (usize, f64) {
    vector
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best })
}

/// `v / Σv`, or the uniform vector when the sum is zero
pub fn normalize_class_vector(vector: ClassVector) -> ClassVector {
    let sum: f64 = vector.iter().sum();
    if sum > 0.0 {
        vector.map(|v| v / sum)
    } else {
        [1.0 / CLASS_COUNT as f64; CLASS_COUNT]
    }
}

/// Weighted sum of class vectors
pub fn compose(weights: &[f64], rows: &[ClassVector]) -> ClassVector {
    let mut out = [0.0; CLASS_COUNT];
    for (w, row) in weights.iter().zip(rows) {
        for (o, r) in out.iter_mut().zip(row) {
            *o += w * r;
        }
    }
    out
}

pub fn dot(vector: &ClassVector, values: &ClassVector) -> f64 {
    vector.iter().zip(values).map(|(a, b)| a * b).sum()
}

/// Weights rescaled to sum to 1; equal weights if they sum to zero
pub fn renormalize(weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        weights.iter().map(|w| w / sum).collect()
    } else {
        vec![1.0 / weights.len() as f64; weights.len()]
    }
}

/// Method selector as it appears in configuration and requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Combination,
    Fuzzy,
    Grey,
}

/// Scoring strategy with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringMethod {
    Combination,
    Fuzzy(FuzzyConfig),
    Grey(GreyConfig),
}

impl ScoringMethod {
    pub fn from_kind(kind: MethodKind, fuzzy: &FuzzyConfig, grey: &GreyConfig) -> Self {
        match kind {
            MethodKind::Combination => ScoringMethod::Combination,
            MethodKind::Fuzzy => ScoringMethod::Fuzzy(fuzzy.clone()),
            MethodKind::Grey => ScoringMethod::Grey(grey.clone()),
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            ScoringMethod::Combination => MethodKind::Combination,
            ScoringMethod::Fuzzy(_) => MethodKind::Fuzzy,
            ScoringMethod::Grey(_) => MethodKind::Grey,
        }
    }

    pub fn default_grade_scale(&self) -> GradeScale {
        match self {
            ScoringMethod::Grey(_) => GradeScale::grey(),
            _ => GradeScale::standard(),
        }
    }

    /// Score every batch
    pub fn score(&self, inputs: &ScoringInputs) -> Vec<BatchScore> {
        match self {
            ScoringMethod::Combination => combination::score(inputs),
            ScoringMethod::Fuzzy(config) => fuzzy::score(inputs, config),
            ScoringMethod::Grey(config) => grey::score(inputs, config),
        }
    }

    /// Grade label for a scored batch
    ///
    /// Max-membership fuzzy evaluation takes the dominant class instead of
    /// applying the score breakpoints.
    pub fn grade(&self, score: &BatchScore, scale: &GradeScale) -> Grade {
        match (self, &score.membership) {
            (ScoringMethod::Fuzzy(config), Some(profile))
                if config.defuzzification == Defuzzification::MaxMembership =>
            {
                profile.dominant
            }
            _ => scale.grade(score.total_score),
        }
    }
}
