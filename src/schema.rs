//! Indicator Schema
//!
//! Static definition of the evaluation hierarchy: 8 dimensions, 21 indicators,
//! each with an optimization direction and normalization flags.
//!
//! The schema is built once and passed by reference into every component, so
//! several evaluation configurations can coexist in one process.

use crate::error::{EvaluationError, Result};
use crate::utils::normalization::StandardCurve;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Whether larger raw values are better (`Max`) or worse (`Min`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Max,
    Min,
}

/// Pre-transform applied before population-relative scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTransform {
    #[default]
    Linear,
    /// `-log10(v + 1e-10)`, for values spanning several orders of magnitude
    Logarithmic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDefinition {
    pub code: String,
    pub display_name: String,
    pub direction: Direction,
    #[serde(default)]
    pub transform: ValueTransform,
    /// Raw value is a probability in [0, 1]
    #[serde(default)]
    pub probability: bool,
    /// Absolute rating curve used by the standards-based normalization mode
    #[serde(default)]
    pub standard_curve: Option<StandardCurve>,
}

impl IndicatorDefinition {
    pub fn new(code: &str, display_name: &str, direction: Direction) -> Self {
        Self {
            code: code.to_string(),
            display_name: display_name.to_string(),
            direction,
            transform: ValueTransform::Linear,
            probability: false,
            standard_curve: None,
        }
    }

    fn logarithmic(mut self) -> Self {
        self.transform = ValueTransform::Logarithmic;
        self
    }

    fn probability(mut self) -> Self {
        self.probability = true;
        self
    }

    fn with_curve(mut self, curve: StandardCurve) -> Self {
        self.standard_curve = Some(curve);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionDefinition {
    pub code: String,
    pub display_name: String,
    /// Default AHP dominance rank (1 = most important)
    pub priority: u32,
    pub indicators: SmallVec<[IndicatorDefinition; 4]>,
}

/// Caller-supplied priority ranking, dimension code → rank
pub type PriorityMap = BTreeMap<String, i64>;

/// Immutable evaluation hierarchy
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSchema {
    dimensions: Vec<DimensionDefinition>,
    #[serde(skip)]
    index: FxHashMap<String, (usize, usize)>,
}

impl IndicatorSchema {
    /// Build a schema, validating codes and priorities
    pub fn new(dimensions: Vec<DimensionDefinition>) -> Result<Self> {
        Self::validate(&dimensions)?;
        Ok(Self::indexed(dimensions))
    }

    fn validate(dimensions: &[DimensionDefinition]) -> Result<()> {
        if dimensions.is_empty() {
            return Err(EvaluationError::InvalidSchema("no dimensions".into()));
        }

        let mut dim_codes = FxHashSet::default();
        let mut ind_codes = FxHashSet::default();
        for dim in dimensions {
            if !dim_codes.insert(dim.code.as_str()) {
                return Err(EvaluationError::InvalidSchema(format!(
                    "duplicate dimension code '{}'",
                    dim.code
                )));
            }
            if dim.indicators.is_empty() {
                return Err(EvaluationError::InvalidSchema(format!(
                    "dimension '{}' has no indicators",
                    dim.code
                )));
            }
            for ind in &dim.indicators {
                if !ind_codes.insert(ind.code.as_str()) {
                    return Err(EvaluationError::InvalidSchema(format!(
                        "duplicate indicator code '{}'",
                        ind.code
                    )));
                }
            }
        }

        let mut priorities: Vec<u32> = dimensions.iter().map(|d| d.priority).collect();
        priorities.sort_unstable();
        let expected: Vec<u32> = (1..=dimensions.len() as u32).collect();
        if priorities != expected {
            return Err(EvaluationError::InvalidSchema(format!(
                "dimension priorities must be a permutation of 1..{}",
                dimensions.len()
            )));
        }

        Ok(())
    }

    /// Code → (dimension, indicator) index over validated dimensions
    fn indexed(dimensions: Vec<DimensionDefinition>) -> Self {
        let index = dimensions
            .iter()
            .enumerate()
            .flat_map(|(d, dim)| {
                dim.indicators
                    .iter()
                    .enumerate()
                    .map(move |(i, ind)| (ind.code.clone(), (d, i)))
            })
            .collect();
        Self { dimensions, index }
    }

    /// Load a custom schema from a JSON array of dimensions
    pub fn from_json(json: &str) -> Result<Self> {
        let dimensions: Vec<DimensionDefinition> = serde_json::from_str(json)?;
        Self::new(dimensions)
    }

    /// The military communication hierarchy (8 dimensions, 21 indicators)
    ///
    /// Dimension order here is the fixed row/column order of every AHP matrix.
    pub fn military_communication() -> Self {
        use Direction::{Max, Min};
        let ind = IndicatorDefinition::new;

        let dimensions = vec![
            dimension("RL", "Reliability", 1, vec![
                ind("RL_communication_availability_rate", "Communication availability", Max).probability(),
                ind("RL_communication_success_rate", "Communication success rate", Max).probability(),
                ind("RL_recovery_duration_ms", "Recovery duration", Min),
                ind("RL_crash_rate", "Crash rate", Min).probability(),
            ]),
            dimension("SC", "Security", 2, vec![
                ind("SC_key_compromise_frequency", "Key compromise frequency", Min).probability(),
                ind("SC_detection_probability", "Detection probability", Min).probability(),
                ind("SC_interception_resistance", "Interception resistance", Max).probability(),
            ]),
            dimension("AJ", "Anti-jamming", 3, vec![
                ind("AJ_avg_sinr", "Average SINR", Max),
                ind("AJ_avg_jamming_margin", "Average jamming margin", Max),
            ]),
            dimension("EF", "Effectiveness", 4, vec![
                ind("EF_avg_communication_distance", "Average communication distance", Max),
                ind("EF_avg_ber", "Average bit error rate", Min)
                    .logarithmic()
                    .with_curve(StandardCurve::BitErrorRate),
                ind("EF_avg_plr", "Average packet loss rate", Min)
                    .logarithmic()
                    .with_curve(StandardCurve::PacketLoss),
                ind("EF_task_success_rate", "Task success rate", Max).probability(),
            ]),
            dimension("PO", "Processing", 5, vec![
                ind("PO_effective_throughput", "Effective throughput", Max),
                ind("PO_spectral_efficiency", "Spectral efficiency", Max),
            ]),
            dimension("NC", "Networking", 6, vec![
                ind("NC_avg_network_setup_duration_ms", "Average network setup duration", Min),
                ind("NC_avg_connectivity_rate", "Average connectivity rate", Max).probability(),
            ]),
            dimension("HO", "Human operation", 7, vec![
                ind("HO_avg_operator_reaction_time_ms", "Average operator reaction time", Min),
                ind("HO_operation_success_rate", "Operation success rate", Max).probability(),
            ]),
            dimension("RS", "Responsiveness", 8, vec![
                ind("RS_avg_call_setup_duration_ms", "Average call setup duration", Min),
                ind("RS_avg_transmission_delay_ms", "Average transmission delay", Min)
                    .with_curve(StandardCurve::TransmissionDelay),
            ]),
        ];

        debug_assert!(Self::validate(&dimensions).is_ok());
        Self::indexed(dimensions)
    }

    pub fn dimensions(&self) -> &[DimensionDefinition] {
        &self.dimensions
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    pub fn indicator_count(&self) -> usize {
        self.index.len()
    }

    pub fn dimension_codes(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.code.as_str()).collect()
    }

    pub fn dimension(&self, code: &str) -> Option<&DimensionDefinition> {
        self.dimensions.iter().find(|d| d.code == code)
    }

    pub fn indicator(&self, code: &str) -> Option<&IndicatorDefinition> {
        self.index
            .get(code)
            .map(|&(d, i)| &self.dimensions[d].indicators[i])
    }

    /// Dimension owning an indicator code
    pub fn dimension_of(&self, indicator_code: &str) -> Option<&DimensionDefinition> {
        self.index.get(indicator_code).map(|&(d, _)| &self.dimensions[d])
    }

    /// All indicators in schema order
    pub fn indicators(&self) -> impl Iterator<Item = &IndicatorDefinition> {
        self.dimensions.iter().flat_map(|d| d.indicators.iter())
    }

    /// The schema's own ranking as a priority map
    pub fn default_priorities(&self) -> PriorityMap {
        self.dimensions
            .iter()
            .map(|d| (d.code.clone(), d.priority as i64))
            .collect()
    }
}

impl Default for IndicatorSchema {
    fn default() -> Self {
        Self::military_communication()
    }
}

fn dimension(
    code: &str,
    display_name: &str,
    priority: u32,
    indicators: Vec<IndicatorDefinition>,
) -> DimensionDefinition {
    DimensionDefinition {
        code: code.to_string(),
        display_name: display_name.to_string(),
        priority,
        indicators: SmallVec::from_vec(indicators),
    }
}
