//! Grade and Rank Utilities
//!
//! Converts total scores to ordinal grade labels using configurable
//! breakpoints, and ranks batches by score.
//!
//! # Default Scales
//! - Standard (combination and fuzzy): ≥90 Excellent, ≥80 Good, ≥70 Medium, ≥60 Passing, else Poor
//! - Grey: ≥90 Excellent, ≥70 Good, ≥50 Medium, ≥30 Poor, else Very Poor

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Medium,
    Passing,
    Poor,
    VeryPoor,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::Medium => "Medium",
            Grade::Passing => "Passing",
            Grade::Poor => "Poor",
            Grade::VeryPoor => "Very Poor",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bound (inclusive) of one grade band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub min: f64,
    pub grade: Grade,
}

/// Ordered grade breakpoints
///
/// Deserialized scales go through `new`, so bands may be listed in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGradeScale")]
pub struct GradeScale {
    /// Checked in descending order of `min`
    bands: Vec<GradeBand>,
    /// Grade for scores below every band
    floor: Grade,
}

#[derive(Deserialize)]
struct RawGradeScale {
    bands: Vec<GradeBand>,
    floor: Grade,
}

impl From<RawGradeScale> for GradeScale {
    fn from(raw: RawGradeScale) -> Self {
        Self::new(raw.bands, raw.floor)
    }
}

impl GradeScale {
    pub fn new(mut bands: Vec<GradeBand>, floor: Grade) -> Self {
        bands.sort_by(|a, b| b.min.total_cmp(&a.min));
        Self { bands, floor }
    }

    pub fn standard() -> Self {
        Self::new(
            vec![
                GradeBand { min: 90.0, grade: Grade::Excellent },
                GradeBand { min: 80.0, grade: Grade::Good },
                GradeBand { min: 70.0, grade: Grade::Medium },
                GradeBand { min: 60.0, grade: Grade::Passing },
            ],
            Grade::Poor,
        )
    }

    pub fn grey() -> Self {
        Self::new(
            vec![
                GradeBand { min: 90.0, grade: Grade::Excellent },
                GradeBand { min: 70.0, grade: Grade::Good },
                GradeBand { min: 50.0, grade: Grade::Medium },
                GradeBand { min: 30.0, grade: Grade::Poor },
            ],
            Grade::VeryPoor,
        )
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn floor(&self) -> Grade {
        self.floor
    }

    /// Grade a score; band lower bounds are inclusive
    pub fn grade(&self, score: f64) -> Grade {
        self.bands
            .iter()
            .find(|band| score >= band.min)
            .map_or(self.floor, |band| band.grade)
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rank scores descending; ties share the minimum rank
///
/// rank = 1 + number of strictly higher scores, so [95, 90, 90, 80] → [1, 2, 2, 4].
pub fn rank_descending(scores: &[f64]) -> Vec<usize> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    scores
        .iter()
        .map(|&score| sorted.partition_point(|&s| s > score) + 1)
        .collect()
}
