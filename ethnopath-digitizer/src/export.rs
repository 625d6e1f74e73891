//! Result export and run summaries
//!
//! The pipeline emits plain records; formatting lives here. The JSON
//! export is the only persisted artifact of a run.

use crate::error::Result;
use crate::types::ModalityKind;
use crate::workflow::{CorpusMetrics, DigitizationResult, DigitizationRun, RejectionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default export file name
pub const DEFAULT_EXPORT_PATH: &str = "demo_results.json";

/// Consumer of a finished run
pub trait ResultSink {
    fn export(&self, run: &DigitizationRun) -> Result<()>;
}

/// Serialized form of a run
#[derive(Debug, Serialize)]
pub struct DigitizationReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub run_started_at: DateTime<Utc>,
    pub run_completed_at: DateTime<Utc>,
    pub metrics: &'a CorpusMetrics,
    pub results: &'a [DigitizationResult],
    pub rejections: &'a [RejectionRecord],
}

impl<'a> DigitizationReport<'a> {
    pub fn new(run: &'a DigitizationRun) -> Self {
        Self {
            generated_at: ethnopath_common::time::now(),
            run_started_at: run.started_at,
            run_completed_at: run.completed_at,
            metrics: &run.metrics,
            results: &run.results,
            rejections: &run.rejections,
        }
    }
}

/// Writes the run report as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonExporter {
    path: PathBuf,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_PATH)
    }
}

impl JsonExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonExporter {
    fn export(&self, run: &DigitizationRun) -> Result<()> {
        let json = serde_json::to_string_pretty(&DigitizationReport::new(run))?;

        // Write to temp file first, then rename (atomic on POSIX)
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;

        info!(
            results = run.results.len(),
            rejections = run.rejections.len(),
            "Results saved to {}",
            self.path.display()
        );
        Ok(())
    }
}

/// Human-readable run summary
#[derive(Debug, Clone)]
pub struct SummaryReport<'a> {
    run: &'a DigitizationRun,
}

impl<'a> SummaryReport<'a> {
    pub fn new(run: &'a DigitizationRun) -> Self {
        Self { run }
    }
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metrics = &self.run.metrics;

        writeln!(f, "DIGITIZATION SUMMARY")?;
        writeln!(f, "{}", "=".repeat(50))?;

        for result in &self.run.results {
            writeln!(f, "Plant: {}", result.plant.display_name())?;
            writeln!(
                f,
                "  Traditional uses: {}",
                result.graph.traditional_uses.join(", ")
            )?;
            writeln!(f, "  Preparation: {}", result.graph.preparation_summary)?;
            for record in result.modalities.iter() {
                let status = if record.complete { "" } else { " (incomplete)" };
                writeln!(
                    f,
                    "  {} confidence: {:.1}%{}",
                    record.kind,
                    record.confidence * 100.0,
                    status
                )?;
            }
            writeln!(
                f,
                "  Integrity: {:.1}%  Context retention: {:.1}%",
                result.graph.integrity_score * 100.0,
                result.context.retention_score * 100.0
            )?;
        }

        if !self.run.rejections.is_empty() {
            writeln!(f)?;
            writeln!(f, "Rejected submissions:")?;
            for rejection in &self.run.rejections {
                let name = if rejection.plant_name.trim().is_empty() {
                    "<unnamed>"
                } else {
                    rejection.plant_name.as_str()
                };
                writeln!(
                    f,
                    "  #{} {}: {}",
                    rejection.submission_index,
                    name,
                    rejection.reasons.join(", ")
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Plants processed: {} of {}", metrics.admitted, metrics.total)?;
        writeln!(
            f,
            "Compliance rate: {:.1}%",
            metrics.compliance_rate * 100.0
        )?;
        writeln!(f, "Mean integrity: {:.1}%", metrics.mean_integrity * 100.0)?;
        writeln!(
            f,
            "Cultural context retention: {:.1}%",
            metrics.mean_retention * 100.0
        )?;
        for kind in ModalityKind::ALL {
            writeln!(
                f,
                "Mean {} confidence: {:.1}%",
                kind,
                metrics.mean_confidence.get(kind) * 100.0
            )?;
        }
        write!(f, "Incomplete modality records: {}", metrics.incomplete_records)
    }
}
