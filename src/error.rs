//! Error types for the evaluation core
//!
//! Only precondition violations become errors. Degenerate data (zero variance,
//! missing columns, single-sample cohorts) is recovered locally and logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Priority mapping is not a permutation of 1..N over the schema's dimensions
    #[error("invalid priorities: {0}")]
    InvalidPriorities(String),

    #[error("comparison matrix must be square, got {rows} rows with a row of length {cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("comparison matrix entry [{row}][{col}] = {value} is not a positive finite number")]
    NonPositiveEntry { row: usize, col: usize, value: f64 },

    #[error("comparison matrix is not reciprocal: [{row}][{col}] = {value} but [{col}][{row}] = {mirror}")]
    NotReciprocal { row: usize, col: usize, value: f64, mirror: f64 },

    #[error("expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no evaluation data: the raw batch table is empty")]
    EmptyTable,

    #[error("invalid indicator schema: {0}")]
    InvalidSchema(String),

    #[error("malformed request: {0}")]
    MalformedRequest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
