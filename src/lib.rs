//! Communication Effectiveness Scoring
//!
//! Scores military communication test batches against an eight-dimension
//! indicator hierarchy and ranks them.
//!
//! Module structure:
//! - `schema`: dimension and indicator definitions
//! - `data`: raw batch table loading with Polars
//! - `utils/`: normalization, grading and column helpers
//! - `weights/`: entropy (objective) and AHP (subjective) weights
//! - `methods/`: combination, fuzzy and grey scoring strategies
//! - `scorer`: the evaluation pipeline
//! - `explanation/`: calculation traces
//! - `sink`, `service`: persistence hook and JSON request envelope

pub mod config;
pub mod data;
pub mod error;
pub mod explanation;
pub mod methods;
pub mod schema;
pub mod scorer;
pub mod service;
pub mod sink;
pub mod utils;
pub mod weights;

// Re-export commonly used types
pub use config::EvaluationConfig;
pub use data::{RawBatchRecord, RawBatchTable};
pub use error::{EvaluationError, Result};
pub use explanation::{CalculationTrace, JsonFormatter};
pub use methods::{MethodKind, ScoringMethod};
pub use schema::{Direction, IndicatorSchema, PriorityMap};
pub use scorer::{BatchEvaluation, EffectivenessScorer, EvaluationResult};
pub use service::{handle_request, EvaluationRequest, ServiceResponse};
pub use sink::{evaluate_and_store, JsonFileSink, MemorySink, ResultSink, StoredEvaluation};
pub use utils::{Grade, GradeScale, NormalizationMode, Normalizer};
pub use weights::{AhpInput, AhpWeights, PairwiseMatrix};
