//! Pipeline Orchestrator
//!
//! Runs a corpus through the compliance gate and the 3-tier pipeline.
//!
//! # Architecture
//! - **Gate**: compliance verdict, rejected submissions stop here
//! - **Tier 1**: modality extractors (audio, visual, text)
//! - **Tier 2**: cultural context preserver (join point after extraction)
//! - **Tier 3**: knowledge graph builder
//!
//! # Error Handling
//! - Per-submission error isolation: a rejected or timed-out submission never
//!   affects any other submission
//! - Empty modality payloads degrade integrity instead of failing
//! - `PreconditionViolation` halts the run
//!
//! # Ordering
//! Submissions run concurrently on the blocking pool, bounded by a semaphore.
//! Results and rejections are collected in corpus order regardless of
//! completion order.
//!
//! # Example
//! ```rust,ignore
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let run = pipeline.run(SampleCorpus.load()?).await?;
//! ```

use super::{
    CorpusMetrics, DigitizationEvent, DigitizationResult, DigitizationRun, RejectionRecord,
    SubmissionState,
};
use crate::compliance::ComplianceGate;
use crate::error::{DigitizeError, Result};
use crate::extractors::{AudioExtractor, ModalityExtractor, TextExtractor, VisualExtractor};
use crate::fusion::{collect_contributions, ContextPreserver};
use crate::graph::{GraphInput, IntegrityWeights, KnowledgeGraphBuilder};
use crate::types::{KnowledgeSubmission, ModalityRecords};
use ethnopath_common::time;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Default upper bound on submissions processed at once
pub const DEFAULT_MAX_CONCURRENT_SUBMISSIONS: usize = 4;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Wall-clock budget per submission (`None` = unbounded)
    pub submission_timeout: Option<Duration>,
    /// Submissions processed concurrently (at least 1)
    pub max_concurrent_submissions: usize,
    /// Integrity score weighting
    pub integrity_weights: IntegrityWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            submission_timeout: None,
            max_concurrent_submissions: DEFAULT_MAX_CONCURRENT_SUBMISSIONS,
            integrity_weights: IntegrityWeights::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_submissions == 0 {
            return Err(DigitizeError::Config(
                "max_concurrent_submissions must be at least 1".to_string(),
            ));
        }
        self.integrity_weights.validate()
    }
}

/// The stateless per-submission stages, shared by all tasks of a run
#[derive(Debug, Default)]
struct Stages {
    gate: ComplianceGate,
    audio: AudioExtractor,
    visual: VisualExtractor,
    text: TextExtractor,
    preserver: ContextPreserver,
    graph_builder: KnowledgeGraphBuilder,
}

impl Stages {
    /// Process one submission from `Received` to a terminal state
    ///
    /// Stops at the next state change once `progress` is abandoned.
    fn process(
        &self,
        index: usize,
        submission: KnowledgeSubmission,
        progress: &SubmissionProgress,
    ) -> Result<DigitizationResult> {
        let plant = submission.plant.clone();
        let mut state = SubmissionState::Received;
        let mut enter = |next: SubmissionState| -> Result<()> {
            if progress.is_abandoned() {
                return Err(progress.timeout_error(&plant.common_name));
            }
            state.advance(next)?;
            debug!(submission_index = index, plant = %plant.common_name, state = %next, "Submission state changed");
            progress.emit(DigitizationEvent::StageChanged {
                submission_index: index,
                plant: plant.common_name.clone(),
                state: next,
            });
            Ok(())
        };

        if let Err(validation) = submission.validate() {
            enter(SubmissionState::Rejected)?;
            return Err(validation.into());
        }

        let verdict = self.gate.evaluate(&submission);
        if !verdict.admitted() {
            enter(SubmissionState::Rejected)?;
            return Err(DigitizeError::PolicyViolation {
                plant: plant.common_name.clone(),
                verdict,
            });
        }

        // Tier 1: extractors are independent of each other
        enter(SubmissionState::Extracting)?;
        let modalities = ModalityRecords {
            audio: self.audio.extract(&plant, submission.audio.as_ref()),
            visual: self.visual.extract(&plant, submission.visual.as_ref()),
            text: self.text.extract(&plant, submission.text.as_ref()),
        };
        for record in modalities.iter().filter(|r| !r.complete) {
            warn!(
                submission_index = index,
                plant = %plant.common_name,
                modality = %record.kind,
                "Modality payload empty, continuing with degraded integrity"
            );
        }

        // Tier 2: join point, all three records exist
        let context = self.preserver.preserve(&collect_contributions(&submission));
        enter(SubmissionState::ContextMerged)?;

        // Tier 3
        let historical_references = modalities
            .text
            .as_text()
            .map(|t| t.historical_references.as_slice())
            .unwrap_or(&[]);
        let graph = self.graph_builder.build(GraphInput {
            plant: &plant,
            uses: modalities.documented_uses(),
            preparation: context.preparation.as_deref(),
            context: &context,
            modalities: &modalities,
            verdict: &verdict,
            historical_references,
        })?;
        enter(SubmissionState::GraphBuilt)?;

        let result = DigitizationResult {
            result_id: Uuid::new_v4(),
            submission_index: index,
            plant: plant.clone(),
            verdict,
            modalities,
            context,
            graph,
            created_at: time::now(),
        };
        enter(SubmissionState::Done)?;

        progress.emit(DigitizationEvent::SubmissionCompleted {
            submission_index: index,
            plant: plant.common_name.clone(),
            integrity_score: result.graph.integrity_score,
            incomplete_modalities: result.modalities.incomplete_count(),
        });

        Ok(result)
    }
}

/// Best-effort event delivery; a full or closed channel never fails a run
fn emit(events: Option<&mpsc::Sender<DigitizationEvent>>, event: DigitizationEvent) {
    if let Some(tx) = events {
        if let Err(e) = tx.try_send(event) {
            debug!("Dropped digitization event: {}", e);
        }
    }
}

/// Event sender and cancellation flag of one submission task
///
/// Abandoning drops the sender, so a task left running on the blocking pool
/// after its budget expired can no longer report progress.
#[derive(Debug, Clone)]
struct SubmissionProgress {
    shared: Arc<ProgressShared>,
    budget: Option<Duration>,
}

#[derive(Debug)]
struct ProgressShared {
    events: Mutex<Option<mpsc::Sender<DigitizationEvent>>>,
    abandoned: AtomicBool,
}

impl SubmissionProgress {
    fn new(events: Option<mpsc::Sender<DigitizationEvent>>, budget: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(ProgressShared {
                events: Mutex::new(events),
                abandoned: AtomicBool::new(false),
            }),
            budget,
        }
    }

    fn emit(&self, event: DigitizationEvent) {
        let events = self
            .shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        emit(events.as_ref(), event);
    }

    fn abandon(&self) {
        self.shared.abandoned.store(true, Ordering::SeqCst);
        self.shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn is_abandoned(&self) -> bool {
        self.shared.abandoned.load(Ordering::SeqCst)
    }

    fn timeout_error(&self, plant: &str) -> DigitizeError {
        let budget_ms = self.budget.map(time::duration_to_millis).unwrap_or(0);
        DigitizeError::Timeout {
            plant: plant.to_string(),
            budget_ms,
        }
    }
}

/// Pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    stages: Arc<Stages>,
    event_tx: Option<mpsc::Sender<DigitizationEvent>>,
}

impl Pipeline {
    /// Create new pipeline with configuration
    ///
    /// # Errors
    /// `Config` when the configuration is invalid
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let stages = Stages {
            graph_builder: KnowledgeGraphBuilder::new(config.integrity_weights),
            ..Default::default()
        };
        Ok(Self {
            config,
            stages: Arc::new(stages),
            event_tx: None,
        })
    }

    /// Create pipeline with event channel for progress reporting
    pub fn with_events(
        config: PipelineConfig,
        event_tx: mpsc::Sender<DigitizationEvent>,
    ) -> Result<Self> {
        let mut pipeline = Self::new(config)?;
        pipeline.event_tx = Some(event_tx);
        Ok(pipeline)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every submission of a corpus through the pipeline
    ///
    /// # Returns
    /// * Results and rejections, each in corpus order, plus corpus metrics
    ///
    /// # Errors
    /// Only run-halting errors (`PreconditionViolation`); per-submission
    /// failures are recorded as rejections.
    pub async fn run(&self, corpus: Vec<KnowledgeSubmission>) -> Result<DigitizationRun> {
        let started_at = time::now();
        let total_submissions = corpus.len();

        info!(
            total_submissions,
            max_concurrent = self.config.max_concurrent_submissions,
            "Digitization run started"
        );
        self.emit_event(DigitizationEvent::RunStarted {
            total_submissions,
            timestamp: started_at.timestamp(),
        });

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_submissions));
        let tasks = corpus.into_iter().enumerate().map(|(index, submission)| {
            let stages = Arc::clone(&self.stages);
            let semaphore = Arc::clone(&semaphore);
            let progress = SubmissionProgress::new(
                self.event_tx.clone(),
                self.config.submission_timeout,
            );

            async move {
                let plant = submission.plant.common_name.clone();
                let outcome = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        let task_progress = progress.clone();
                        let handle = tokio::task::spawn_blocking(move || {
                            let _permit = permit;
                            stages.process(index, submission, &task_progress)
                        });
                        await_submission(handle, &progress, &plant).await
                    }
                    Err(e) => Err(DigitizeError::PreconditionViolation(format!(
                        "submission semaphore closed: {}",
                        e
                    ))),
                };
                (index, plant, outcome)
            }
        });

        // join_all yields outputs in input order
        let outcomes = join_all(tasks).await;

        let mut results = Vec::new();
        let mut rejections = Vec::new();
        for (index, plant, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) if e.is_fatal_to_run() => {
                    error!(submission_index = index, plant = %plant, "Digitization run halted: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    let rejection = RejectionRecord::from_error(index, &plant, e)?;
                    warn!(
                        submission_index = index,
                        plant = %plant,
                        reasons = ?rejection.reasons,
                        "Submission rejected"
                    );
                    self.emit_event(DigitizationEvent::SubmissionRejected {
                        submission_index: index,
                        plant: plant.clone(),
                        reasons: rejection.reasons.clone(),
                    });
                    rejections.push(rejection);
                }
            }
        }

        let metrics = CorpusMetrics::compute(&results, &rejections);
        let completed_at = time::now();

        info!(
            admitted = metrics.admitted,
            rejected = metrics.rejected,
            mean_integrity = metrics.mean_integrity,
            "Digitization run complete: {}",
            metrics.display_string()
        );
        self.emit_event(DigitizationEvent::RunCompleted {
            admitted: metrics.admitted,
            rejected: metrics.rejected,
            timestamp: completed_at.timestamp(),
        });

        Ok(DigitizationRun {
            results,
            rejections,
            metrics,
            started_at,
            completed_at,
        })
    }

    fn emit_event(&self, event: DigitizationEvent) {
        emit(self.event_tx.as_ref(), event);
    }
}

/// Wait for a submission task, enforcing the optional wall-clock budget
///
/// A timed-out task keeps running on the blocking pool until its next state
/// change; the progress handle is abandoned so it emits nothing further and
/// its output is discarded.
async fn await_submission(
    handle: JoinHandle<Result<DigitizationResult>>,
    progress: &SubmissionProgress,
    plant: &str,
) -> Result<DigitizationResult> {
    let joined = match progress.budget {
        Some(budget) => match tokio::time::timeout(budget, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                progress.abandon();
                return Err(progress.timeout_error(plant));
            }
        },
        None => handle.await,
    };

    joined.map_err(|e| {
        DigitizeError::PreconditionViolation(format!(
            "submission task for '{}' failed: {}",
            plant, e
        ))
    })?
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AudioPayload, TextPayload, VisualPayload};
    use crate::workflow::TIMEOUT_REASON;

    fn submission(name: &str) -> KnowledgeSubmission {
        KnowledgeSubmission::builder(name)
            .audio(AudioPayload {
                description: format!("Elders describe {}", name),
                significance: None,
            })
            .visual(VisualPayload {
                identification: vec![format!("{} leaves", name)],
                ..Default::default()
            })
            .text(TextPayload {
                documented_uses: vec!["tea".into()],
                ..Default::default()
            })
            .attribution("Ethnobotanical literature")
            .build()
            .unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(PipelineConfig::default().validate().is_ok());

        let zero_concurrency = PipelineConfig {
            max_concurrent_submissions: 0,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(zero_concurrency),
            Err(DigitizeError::Config(_))
        ));
    }

    #[test]
    fn test_stages_walk_every_state() {
        let (tx, mut rx) = mpsc::channel(32);
        let stages = Stages::default();

        let progress = SubmissionProgress::new(Some(tx), None);
        let result = stages.process(0, submission("Mint"), &progress).unwrap();
        assert_eq!(result.plant.common_name, "Mint");

        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let DigitizationEvent::StageChanged { state, .. } = event {
                states.push(state);
            }
        }
        assert_eq!(
            states,
            vec![
                SubmissionState::Extracting,
                SubmissionState::ContextMerged,
                SubmissionState::GraphBuilt,
                SubmissionState::Done,
            ]
        );
    }

    #[test]
    fn test_closed_event_channel_does_not_fail() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let stages = Stages::default();
        let progress = SubmissionProgress::new(Some(tx), None);
        assert!(stages.process(0, submission("Mint"), &progress).is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_submission_stops_without_events() {
        let (tx, mut rx) = mpsc::channel(32);
        let progress = SubmissionProgress::new(Some(tx), Some(Duration::from_millis(50)));
        progress.abandon();

        let result = Stages::default().process(0, submission("Mint"), &progress);
        assert!(matches!(
            result,
            Err(DigitizeError::Timeout { ref plant, budget_ms: 50 }) if plant == "Mint"
        ));
        // The only sender was dropped on abandon
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_slow_submission_times_out_and_goes_quiet() {
        let (tx, mut rx) = mpsc::channel(32);
        let progress = SubmissionProgress::new(Some(tx), Some(Duration::from_millis(10)));

        let task_progress = progress.clone();
        let handle = tokio::task::spawn_blocking(move || {
            std::thread::sleep(Duration::from_millis(200));
            task_progress.emit(DigitizationEvent::StageChanged {
                submission_index: 0,
                plant: "Mint".to_string(),
                state: SubmissionState::Extracting,
            });
            Err(task_progress.timeout_error("Mint"))
        });

        let error = await_submission(handle, &progress, "Mint")
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            DigitizeError::Timeout { budget_ms: 10, .. }
        ));
        assert!(!error.is_fatal_to_run());
        assert!(progress.is_abandoned());

        // Channel closes once the late task finishes; nothing is delivered
        assert!(rx.recv().await.is_none());

        let rejection = RejectionRecord::from_error(0, "Mint", error).unwrap();
        assert_eq!(rejection.reasons, vec![TIMEOUT_REASON]);
    }

    #[tokio::test]
    async fn test_task_within_budget_is_not_abandoned() {
        let progress = SubmissionProgress::new(None, Some(Duration::from_secs(5)));
        let task_progress = progress.clone();
        let handle = tokio::task::spawn_blocking(move || {
            Stages::default().process(0, submission("Sage"), &task_progress)
        });

        let result = await_submission(handle, &progress, "Sage").await.unwrap();
        assert_eq!(result.plant.common_name, "Sage");
        assert!(!progress.is_abandoned());
    }

    #[tokio::test]
    async fn test_concurrency_limit_of_one_preserves_order() {
        let config = PipelineConfig {
            max_concurrent_submissions: 1,
            ..Default::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        let run = pipeline
            .run(vec![submission("Mint"), submission("Sage"), submission("Thyme")])
            .await
            .unwrap();

        let names: Vec<_> = run
            .results
            .iter()
            .map(|r| r.plant.common_name.as_str())
            .collect();
        assert_eq!(names, vec!["Mint", "Sage", "Thyme"]);
    }
}
