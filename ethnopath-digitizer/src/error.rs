//! Error types for ethnopath-digitizer
//!
//! Per-submission errors (`Validation`, `PolicyViolation`, `Timeout`) are
//! isolated by the orchestrator and recorded as rejections. Only
//! `PreconditionViolation` halts a run: it signals an orchestration bug,
//! not bad input data. Empty modality payloads are not errors at all; the
//! extractors degrade to zero-confidence records instead.

use crate::compliance::ComplianceVerdict;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for digitizer operations
pub type Result<T> = std::result::Result<T, DigitizeError>;

/// Structural problems with a submission, detected before the compliance gate
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Plant common name absent or blank
    #[error("Submission is missing the plant common name")]
    MissingPlantIdentity,

    /// No modality carries any content
    #[error("Submission for '{0}' carries no non-empty modality payload")]
    NoModalityPayload(String),
}

impl ValidationError {
    /// Stable reason code used in rejection logs
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingPlantIdentity => "missing_plant_identity",
            ValidationError::NoModalityPayload(_) => "no_modality_payload",
        }
    }
}

/// Digitization error
#[derive(Debug, Error)]
pub enum DigitizeError {
    /// Submission failed structural validation (fatal to that submission only)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// One or more compliance rules failed (fatal to that submission only)
    #[error("Policy violation for '{plant}': {}", violated_names(.verdict))]
    PolicyViolation {
        plant: String,
        verdict: ComplianceVerdict,
    },

    /// Submission exceeded its wall-clock budget (fatal to that submission only)
    #[error("Processing timeout for '{plant}' after {budget_ms}ms")]
    Timeout { plant: String, budget_ms: u64 },

    /// Internal invariant breach; halts the run
    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (corpus loading, export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// ethnopath-common error
    #[error("Common error: {0}")]
    Common(#[from] ethnopath_common::Error),
}

impl DigitizeError {
    /// Whether this error must stop the whole run rather than one submission
    pub fn is_fatal_to_run(&self) -> bool {
        !matches!(
            self,
            DigitizeError::Validation(_)
                | DigitizeError::PolicyViolation { .. }
                | DigitizeError::Timeout { .. }
        )
    }
}

fn violated_names(verdict: &ComplianceVerdict) -> String {
    verdict
        .violated()
        .iter()
        .map(|rule| rule.name())
        .collect::<Vec<_>>()
        .join(", ")
}
