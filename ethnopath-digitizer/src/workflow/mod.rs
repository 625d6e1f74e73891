//! Digitization workflow
//!
//! Runs every submission of a corpus through the 3-tier pipeline:
//! - **Gate**: compliance verdict (rejected submissions stop here)
//! - **Tier 1**: audio, visual and text extraction
//! - **Tier 2**: cultural context preservation
//! - **Tier 3**: knowledge graph construction
//!
//! Each submission walks a one-way state machine:
//! `Received → Rejected` or
//! `Received → Extracting → ContextMerged → GraphBuilt → Done`.

pub mod pipeline;
pub mod statistics;

pub use pipeline::{Pipeline, PipelineConfig};
pub use statistics::CorpusMetrics;

use crate::compliance::ComplianceVerdict;
use crate::error::{DigitizeError, Result};
use crate::fusion::CulturalContextRecord;
use crate::graph::KnowledgeGraphRecord;
use crate::types::{ModalityRecords, PlantIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reason code for a submission that exceeded its wall-clock budget
pub const TIMEOUT_REASON: &str = "processing_timeout";

/// Per-submission processing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionState {
    Received,
    Rejected,
    Extracting,
    ContextMerged,
    GraphBuilt,
    Done,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Rejected | SubmissionState::Done)
    }

    /// Whether `next` directly follows this state
    pub fn can_transition_to(&self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Received, Rejected)
                | (Received, Extracting)
                | (Extracting, ContextMerged)
                | (ContextMerged, GraphBuilt)
                | (GraphBuilt, Done)
        )
    }

    /// Move to `next`, refusing any backwards or skipping transition
    pub fn advance(&mut self, next: SubmissionState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(DigitizeError::PreconditionViolation(format!(
                "illegal submission state transition {} -> {}",
                self, next
            )));
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Received => "RECEIVED",
            SubmissionState::Rejected => "REJECTED",
            SubmissionState::Extracting => "EXTRACTING",
            SubmissionState::ContextMerged => "CONTEXT_MERGED",
            SubmissionState::GraphBuilt => "GRAPH_BUILT",
            SubmissionState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Complete output for one admitted submission
#[derive(Debug, Clone, Serialize)]
pub struct DigitizationResult {
    pub result_id: Uuid,
    /// Position of the submission in the input corpus
    pub submission_index: usize,
    pub plant: PlantIdentity,
    pub verdict: ComplianceVerdict,
    pub modalities: ModalityRecords,
    pub context: CulturalContextRecord,
    pub graph: KnowledgeGraphRecord,
    pub created_at: DateTime<Utc>,
}

/// Rejection log entry
#[derive(Debug, Clone, Serialize)]
pub struct RejectionRecord {
    pub submission_index: usize,
    pub plant_name: String,
    /// Violated policy names or validation/timeout reason codes
    pub reasons: Vec<String>,
    /// Present when the compliance gate produced the rejection
    pub verdict: Option<ComplianceVerdict>,
    pub message: String,
}

impl RejectionRecord {
    /// Convert a per-submission error into a rejection record
    ///
    /// # Errors
    /// Returns the error unchanged when it must halt the run instead.
    pub fn from_error(
        submission_index: usize,
        plant_name: &str,
        err: DigitizeError,
    ) -> Result<Self> {
        let message = err.to_string();
        let (reasons, verdict) = match err {
            DigitizeError::Validation(validation) => (vec![validation.code().to_string()], None),
            DigitizeError::PolicyViolation { verdict, .. } => (
                verdict
                    .violated()
                    .iter()
                    .map(|rule| rule.name().to_string())
                    .collect(),
                Some(verdict),
            ),
            DigitizeError::Timeout { .. } => (vec![TIMEOUT_REASON.to_string()], None),
            fatal => return Err(fatal),
        };

        Ok(Self {
            submission_index,
            plant_name: plant_name.to_string(),
            reasons,
            verdict,
            message,
        })
    }
}

/// Output of one orchestrator run
#[derive(Debug, Clone, Serialize)]
pub struct DigitizationRun {
    /// Admitted submissions, in corpus order
    pub results: Vec<DigitizationResult>,
    /// Rejected submissions, in corpus order
    pub rejections: Vec<RejectionRecord>,
    pub metrics: CorpusMetrics,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Progress events emitted by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DigitizationEvent {
    /// Run started
    RunStarted {
        /// Number of submissions in the corpus
        total_submissions: usize,
        /// Unix timestamp (seconds since epoch)
        timestamp: i64,
    },

    /// Submission entered a new state
    StageChanged {
        submission_index: usize,
        plant: String,
        state: SubmissionState,
    },

    /// Submission rejected
    SubmissionRejected {
        submission_index: usize,
        plant: String,
        reasons: Vec<String>,
    },

    /// Knowledge graph built and submission complete
    SubmissionCompleted {
        submission_index: usize,
        plant: String,
        /// Integrity score (0.0-1.0)
        integrity_score: f64,
        /// Modality records marked incomplete
        incomplete_modalities: usize,
    },

    /// Run finished
    RunCompleted {
        admitted: usize,
        rejected: usize,
        /// Unix timestamp (seconds since epoch)
        timestamp: i64,
    },
}
