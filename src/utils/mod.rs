//! Utility modules for effectiveness scoring
//!
//! Contains shared functionality used across the scoring methods:
//! - Normalization: raw value → 0-100 score
//! - Grading: grade breakpoints and ranking
//! - LazyFrame helpers: materialization that reports missing columns

pub mod grading;
pub mod lazy_helpers;
pub mod normalization;

// Re-export commonly used types
pub use grading::{rank_descending, Grade, GradeBand, GradeScale};
pub use lazy_helpers::materialize_available_columns;
pub use normalization::{NormalizationMode, NormalizedTable, Normalizer, StandardCurve, NEUTRAL_SCORE};
