//! LazyFrame materialization helpers with column validation
//!
//! The extraction layer may omit indicator columns. Required identity columns
//! are validated up front; optional value columns are projected only when
//! present and the absent ones are reported back to the caller.

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;

/// Materialize identity and value columns from a LazyFrame
///
/// # Arguments
/// * `lazy` - LazyFrame to materialize
/// * `required` - Identity columns, cast to String; missing ones are an error
/// * `optional` - Numeric columns, cast to Float64; missing ones are skipped
/// * `context` - Context for error messages (e.g., "raw batch table")
///
/// # Returns
/// The materialized DataFrame and the names of the optional columns that were absent
pub fn materialize_available_columns(
    lazy: LazyFrame,
    required: &[&str],
    optional: &[&str],
    context: &str,
) -> Result<(DataFrame, Vec<String>)> {
    let mut lazy = lazy;
    let schema = lazy
        .collect_schema()
        .with_context(|| format!("{}: Failed to resolve schema", context))?;

    for &name in required {
        if schema.get(name).is_none() {
            let available: Vec<String> = schema.iter_names().map(|s| s.to_string()).collect();
            return Err(anyhow!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context,
                name,
                available
            ));
        }
    }

    let mut missing = Vec::new();
    let mut exprs: Vec<Expr> = required
        .iter()
        .map(|&name| col(name).cast(DataType::String))
        .collect();

    for &name in optional {
        if schema.get(name).is_some() {
            exprs.push(col(name).cast(DataType::Float64));
        } else {
            missing.push(name.to_string());
        }
    }

    let df = lazy
        .select(&exprs)
        .collect()
        .with_context(|| format!("{}: Failed to materialize columns", context))?;

    Ok((df, missing))
}
