//! Effectiveness Scorer - Main coordinator for scoring test batches
//!
//! Runs the full pipeline for one raw table and one AHP input:
//! normalize → entropy weights → AHP weights → compose → score → grade → rank.
//! Includes a parallel (Rayon) variant that evaluates several AHP inputs
//! against the same table, each with its own intermediates.

use crate::config::EvaluationConfig;
use crate::data::RawBatchTable;
use crate::error::{EvaluationError, Result};
use crate::explanation::{CalculationTrace, TraceGenerator};
use crate::methods::{MembershipProfile, MethodKind, ScoringInputs, ScoringMethod};
use crate::schema::IndicatorSchema;
use crate::utils::grading::{rank_descending, Grade, GradeScale};
use crate::utils::normalization::{NormalizationMode, Normalizer};
use crate::weights::{compute_weights, AhpInput, EntropyWeights, FinalWeights};
use rayon::prelude::*;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Main effectiveness scorer
///
/// Holds only immutable configuration; every call computes fresh
/// intermediates, so one scorer can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct EffectivenessScorer {
    schema: IndicatorSchema,
    config: EvaluationConfig,
    normalizer: Normalizer,
    method: ScoringMethod,
    grade_scale: GradeScale,
}

/// Complete result of one evaluation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub method: MethodKind,
    pub normalization: NormalizationMode,
    pub consistency_ratio: f64,
    pub consistency_passed: bool,
    pub lambda_max: f64,
    pub consistency_index: f64,
    /// Comparison matrix used, rows in `dimension_codes` order
    pub ahp_matrix: Vec<Vec<f64>>,
    pub dimension_codes: Vec<String>,
    pub dimension_weights: Vec<DimensionWeight>,
    pub indicator_weights: Vec<DimensionIndicatorWeights>,
    /// Indicator columns absent from the raw table (scored neutral)
    pub missing_indicators: Vec<String>,
    /// Sorted by rank
    pub evaluation_results: Vec<BatchEvaluation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionWeight {
    pub code: String,
    pub name: String,
    pub weight: f64,
    /// Caller or schema priority; None for an explicit matrix
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionIndicatorWeights {
    pub dimension_code: String,
    pub dimension_name: String,
    pub indicators: Vec<IndicatorWeight>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorWeight {
    pub code: String,
    pub name: String,
    pub entropy_weight: f64,
    pub final_weight: f64,
}

/// Score record of one test batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEvaluation {
    pub test_id: String,
    pub scenario_id: Option<String>,
    pub total_score: f64,
    pub grade: Grade,
    /// 1-based; ties share the minimum rank
    pub rank: usize,
    pub dimension_scores: BTreeMap<String, f64>,
    /// Normalized value per indicator code
    pub indicator_scores: BTreeMap<String, f64>,
    /// Raw value per indicator code (None for missing cells)
    pub indicator_raw_values: BTreeMap<String, Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_communications: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lifecycles: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership: Option<MembershipProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<CalculationTrace>,
}

impl EvaluationResult {
    pub fn batch(&self, test_id: &str) -> Option<&BatchEvaluation> {
        self.evaluation_results.iter().find(|b| b.test_id == test_id)
    }

    pub fn dimension_weight(&self, code: &str) -> Option<f64> {
        self.dimension_weights
            .iter()
            .find(|w| w.code == code)
            .map(|w| w.weight)
    }
}

impl EffectivenessScorer {
    pub fn new(schema: IndicatorSchema, config: EvaluationConfig) -> Self {
        let normalizer = Normalizer::new(config.normalization);
        let method = config.scoring_method();
        let grade_scale = config.grade_scale();

        Self {
            schema,
            config,
            normalizer,
            method,
            grade_scale,
        }
    }

    pub fn schema(&self) -> &IndicatorSchema {
        &self.schema
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Same schema and config with a different scoring method
    pub fn with_method(&self, kind: MethodKind) -> Self {
        let mut config = self.config.clone();
        config.method = kind;
        Self::new(self.schema.clone(), config)
    }

    /// Evaluate every batch of a raw table
    pub fn evaluate(&self, table: &RawBatchTable, input: &AhpInput) -> Result<EvaluationResult> {
        if table.is_empty() {
            return Err(EvaluationError::EmptyTable);
        }

        let matrix = input.resolve(&self.schema)?;
        let ahp = compute_weights(&matrix);
        let consistency_passed = ahp.is_consistent(self.config.consistency_threshold);
        if !consistency_passed {
            warn!(
                "AHP matrix inconsistent: CR = {:.4} (threshold {})",
                ahp.consistency_ratio, self.config.consistency_threshold
            );
        }

        info!(
            "Evaluating {} batches ({:?}, {:?}), CR = {:.4}",
            table.len(),
            self.method.kind(),
            self.config.normalization,
            ahp.consistency_ratio
        );

        let table: Cow<RawBatchTable> = if self.config.apply_extraction_defaults {
            let mut owned = table.clone();
            owned.apply_extraction_defaults();
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(table)
        };

        let normalized = self.normalizer.normalize_table(&table, &self.schema);
        let entropy = EntropyWeights::compute(&normalized, &self.schema);
        let final_weights = FinalWeights::compose(&ahp.weights, &entropy);

        for (dim, weight) in self.schema.dimensions().iter().zip(&ahp.weights) {
            debug!("{} AHP weight {:.4}", dim.code, weight);
        }

        let scores = self.method.score(&ScoringInputs {
            normalized: &normalized,
            entropy: &entropy,
            ahp_weights: &ahp.weights,
        });

        let totals: Vec<f64> = scores.iter().map(|s| s.total_score).collect();
        let ranks = rank_descending(&totals);

        let tracer = TraceGenerator {
            schema: &self.schema,
            normalized: &normalized,
            entropy: &entropy,
            final_weights: &final_weights,
            ahp_weights: &ahp.weights,
        };

        let mut evaluations: Vec<BatchEvaluation> = table
            .records()
            .iter()
            .zip(scores)
            .zip(ranks)
            .enumerate()
            .map(|(sample, ((record, score), rank))| {
                let mut dimension_scores = BTreeMap::new();
                let mut indicator_scores = BTreeMap::new();
                let mut indicator_raw_values = BTreeMap::new();

                for (d, dim) in self.schema.dimensions().iter().enumerate() {
                    dimension_scores.insert(dim.code.clone(), score.dimension_scores[d]);
                    for (i, ind) in dim.indicators.iter().enumerate() {
                        indicator_scores.insert(ind.code.clone(), normalized.value(d, i, sample));
                        indicator_raw_values.insert(ind.code.clone(), record.value(&ind.code));
                    }
                }

                let calculation = self
                    .config
                    .include_trace
                    .then(|| tracer.generate(record, sample, &score));

                BatchEvaluation {
                    test_id: record.test_id.clone(),
                    scenario_id: record.scenario_id.clone(),
                    total_score: score.total_score,
                    grade: self.method.grade(&score, &self.grade_scale),
                    rank,
                    dimension_scores,
                    indicator_scores,
                    indicator_raw_values,
                    total_communications: record.total_communications,
                    total_lifecycles: record.total_lifecycles,
                    membership: score.membership,
                    calculation,
                }
            })
            .collect();

        // Stable: ties keep extraction order
        evaluations.sort_by_key(|e| e.rank);

        let priorities = match input {
            AhpInput::Default => Some(self.schema.default_priorities()),
            AhpInput::Priorities(p) => Some(p.clone()),
            AhpInput::Matrix(_) => None,
        };

        let dimension_weights = self
            .schema
            .dimensions()
            .iter()
            .zip(&ahp.weights)
            .map(|(dim, &weight)| DimensionWeight {
                code: dim.code.clone(),
                name: dim.display_name.clone(),
                weight,
                priority: priorities.as_ref().and_then(|p| p.get(&dim.code).copied()),
            })
            .collect();

        let indicator_weights = self
            .schema
            .dimensions()
            .iter()
            .enumerate()
            .map(|(d, dim)| DimensionIndicatorWeights {
                dimension_code: dim.code.clone(),
                dimension_name: dim.display_name.clone(),
                indicators: dim
                    .indicators
                    .iter()
                    .enumerate()
                    .map(|(i, ind)| IndicatorWeight {
                        code: ind.code.clone(),
                        name: ind.display_name.clone(),
                        entropy_weight: entropy.get(d, i),
                        final_weight: final_weights.get(d, i),
                    })
                    .collect(),
            })
            .collect();

        info!("Evaluation complete: {} batches ranked", evaluations.len());

        Ok(EvaluationResult {
            method: self.method.kind(),
            normalization: self.config.normalization,
            consistency_ratio: ahp.consistency_ratio,
            consistency_passed,
            lambda_max: ahp.lambda_max,
            consistency_index: ahp.consistency_index,
            ahp_matrix: matrix.rows().to_vec(),
            dimension_codes: self.schema.dimension_codes().into_iter().map(String::from).collect(),
            dimension_weights,
            indicator_weights,
            missing_indicators: normalized.missing_indicators().to_vec(),
            evaluation_results: evaluations,
        })
    }

    /// Evaluate several AHP inputs against one table in parallel
    ///
    /// Results come back in input order; one failing input does not affect
    /// the others.
    pub fn evaluate_many(&self, table: &RawBatchTable, inputs: &[AhpInput]) -> Vec<Result<EvaluationResult>> {
        inputs
            .par_iter()
            .map(|input| self.evaluate(table, input))
            .collect()
    }
}

impl Default for EffectivenessScorer {
    fn default() -> Self {
        Self::new(IndicatorSchema::default(), EvaluationConfig::default())
    }
}
