//! Result sinks
//!
//! Persistence is opaque to the scorer: a sink receives the finished
//! evaluation and stores it somewhere. A failing sink never discards the
//! computed result.

use crate::data::RawBatchTable;
use crate::explanation::JsonFormatter;
use crate::scorer::{EffectivenessScorer, EvaluationResult};
use crate::weights::AhpInput;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Destination for finished evaluations
pub trait ResultSink: Send + Sync {
    fn store(&self, result: &EvaluationResult) -> Result<()>;
}

/// Writes each evaluation as pretty-printed JSON to one file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonFileSink {
    fn store(&self, result: &EvaluationResult) -> Result<()> {
        let json = JsonFormatter::format(result).context("Failed to serialize evaluation result")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write evaluation result: {:?}", self.path))?;

        info!(
            "Stored {} batch scores to {:?}",
            result.evaluation_results.len(),
            self.path
        );
        Ok(())
    }
}

/// Keeps evaluations in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    stored: Mutex<Vec<EvaluationResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stored.lock().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored evaluations, oldest first
    pub fn results(&self) -> Vec<EvaluationResult> {
        self.stored.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ResultSink for MemorySink {
    fn store(&self, result: &EvaluationResult) -> Result<()> {
        let mut stored = self
            .stored
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory sink lock poisoned"))?;
        stored.push(result.clone());
        Ok(())
    }
}

/// Evaluation result plus the outcome of storing it
#[derive(Debug)]
pub struct StoredEvaluation {
    pub result: EvaluationResult,
    /// Set when the sink rejected the result
    pub store_error: Option<anyhow::Error>,
}

impl StoredEvaluation {
    pub fn is_stored(&self) -> bool {
        self.store_error.is_none()
    }
}

/// Evaluate, then hand the result to a sink
///
/// Scoring errors propagate. A sink error is logged and reported in
/// `store_error`; the result is returned either way.
pub fn evaluate_and_store(
    scorer: &EffectivenessScorer,
    table: &RawBatchTable,
    input: &AhpInput,
    sink: &dyn ResultSink,
) -> crate::error::Result<StoredEvaluation> {
    let result = scorer.evaluate(table, input)?;

    let store_error = sink.store(&result).err();
    if let Some(e) = &store_error {
        warn!("Failed to store evaluation result: {:#}", e);
    }

    Ok(StoredEvaluation { result, store_error })
}
