//! Evaluation configuration
//!
//! Loaded from JSON; every field has a default, so `{}` is a valid config.

use crate::error::Result as EvalResult;
use crate::methods::{FuzzyConfig, GreyConfig, MethodKind, ScoringMethod};
use crate::utils::grading::GradeScale;
use crate::utils::normalization::NormalizationMode;
use crate::weights::DEFAULT_CONSISTENCY_THRESHOLD;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub normalization: NormalizationMode,
    pub method: MethodKind,
    /// Overrides the method's default breakpoints
    pub grade_scale: Option<GradeScale>,
    /// CR below this passes the consistency check
    pub consistency_threshold: f64,
    pub fuzzy: FuzzyConfig,
    pub grey: GreyConfig,
    /// Fill null availability / recovery / crash cells the way extraction does
    pub apply_extraction_defaults: bool,
    /// Attach a calculation trace to every batch
    pub include_trace: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationMode::LogMinMax,
            method: MethodKind::Combination,
            grade_scale: None,
            consistency_threshold: DEFAULT_CONSISTENCY_THRESHOLD,
            fuzzy: FuzzyConfig::default(),
            grey: GreyConfig::default(),
            apply_extraction_defaults: true,
            include_trace: true,
        }
    }
}

impl EvaluationConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))
    }

    pub fn from_json(json: &str) -> EvalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn scoring_method(&self) -> ScoringMethod {
        ScoringMethod::from_kind(self.method, &self.fuzzy, &self.grey)
    }

    /// Configured scale, or the method's default
    pub fn grade_scale(&self) -> GradeScale {
        self.grade_scale
            .clone()
            .unwrap_or_else(|| self.scoring_method().default_grade_scale())
    }
}
