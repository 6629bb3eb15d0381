//! Request/response envelope for callers that drive the scorer with JSON
//!
//! Request: `{"priorities": {"RL": 1, ...}, "matrix": [[..]], "method": "fuzzy"}`,
//! every field optional; empty input evaluates with the default priorities.
//! Response: the evaluation result flattened next to `success` and a
//! timestamp, or `{success: false, message, error}`.

use crate::data::RawBatchTable;
use crate::error::{EvaluationError, Result};
use crate::methods::MethodKind;
use crate::schema::PriorityMap;
use crate::scorer::{EffectivenessScorer, EvaluationResult};
use crate::weights::AhpInput;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{error, warn};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const NO_DATA_MESSAGE: &str = "no evaluation data";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub priorities: Option<PriorityMap>,
    /// Explicit comparison matrix; takes precedence over `priorities`
    pub matrix: Option<Vec<Vec<f64>>>,
    /// Overrides the configured scoring method
    pub method: Option<MethodKind>,
}

impl EvaluationRequest {
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(input).map_err(EvaluationError::MalformedRequest)
    }

    pub fn ahp_input(&self) -> AhpInput {
        match (&self.matrix, &self.priorities) {
            (Some(matrix), priorities) => {
                if priorities.is_some() {
                    warn!("Request carries both matrix and priorities; using the matrix");
                }
                AhpInput::Matrix(matrix.clone())
            }
            (None, Some(priorities)) => AhpInput::Priorities(priorities.clone()),
            (None, None) => AhpInput::Default,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServiceResponse {
    Success(SuccessResponse),
    Failure(FailureResponse),
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub timestamp: String,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceResponse {
    pub fn success(result: EvaluationResult) -> Self {
        ServiceResponse::Success(SuccessResponse {
            success: true,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            result,
        })
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        ServiceResponse::Failure(FailureResponse {
            success: false,
            message: message.into(),
            error,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResponse::Success(_))
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        match self {
            ServiceResponse::Success(s) => Some(&s.result),
            ServiceResponse::Failure(_) => None,
        }
    }
}

/// Parse a JSON request, evaluate the table and wrap the outcome
///
/// Never fails: every error becomes a failure envelope.
pub fn handle_request(scorer: &EffectivenessScorer, table: &RawBatchTable, input: &str) -> ServiceResponse {
    let request = match EvaluationRequest::parse(input) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected request: {}", e);
            return ServiceResponse::failure("invalid request", Some(e.to_string()));
        }
    };

    if table.is_empty() {
        return ServiceResponse::failure(NO_DATA_MESSAGE, None);
    }

    let scorer: Cow<EffectivenessScorer> = match request.method {
        Some(kind) if kind != scorer.config().method => Cow::Owned(scorer.with_method(kind)),
        _ => Cow::Borrowed(scorer),
    };

    match scorer.evaluate(table, &request.ahp_input()) {
        Ok(result) => ServiceResponse::success(result),
        Err(e) => {
            error!("Evaluation failed: {}", e);
            ServiceResponse::failure(format!("evaluation failed: {}", e), Some(e.to_string()))
        }
    }
}
