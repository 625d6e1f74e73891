//! Corpus-level statistics for a digitization run
//!
//! Aggregates are computed once, after every submission has finished.
//! An empty corpus (or one with no admitted submissions) yields zeros,
//! never NaN.

use super::{DigitizationResult, RejectionRecord};
use crate::types::ModalityKind;
use serde::{Deserialize, Serialize};

/// Mean confidence of each modality across admitted submissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalityConfidence {
    pub audio: f64,
    pub visual: f64,
    pub text: f64,
}

impl ModalityConfidence {
    pub fn get(&self, kind: ModalityKind) -> f64 {
        match kind {
            ModalityKind::Audio => self.audio,
            ModalityKind::Visual => self.visual,
            ModalityKind::Text => self.text,
        }
    }
}

/// Run aggregates
///
/// Display: "N of M admitted, mean integrity X"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetrics {
    pub total: usize,
    pub admitted: usize,
    pub rejected: usize,
    /// admitted / total (0.0 for an empty corpus)
    pub compliance_rate: f64,
    pub mean_integrity: f64,
    pub mean_confidence: ModalityConfidence,
    pub mean_retention: f64,
    /// Modality records marked incomplete across admitted submissions
    pub incomplete_records: usize,
}

impl CorpusMetrics {
    pub fn compute(results: &[DigitizationResult], rejections: &[RejectionRecord]) -> Self {
        let admitted = results.len();
        let rejected = rejections.len();
        let total = admitted + rejected;

        let mean_of = |value: &dyn Fn(&DigitizationResult) -> f64| -> f64 {
            if results.is_empty() {
                0.0
            } else {
                results.iter().map(value).sum::<f64>() / admitted as f64
            }
        };

        Self {
            total,
            admitted,
            rejected,
            compliance_rate: if total == 0 {
                0.0
            } else {
                admitted as f64 / total as f64
            },
            mean_integrity: mean_of(&|r| r.graph.integrity_score),
            mean_confidence: ModalityConfidence {
                audio: mean_of(&|r| r.modalities.audio.confidence),
                visual: mean_of(&|r| r.modalities.visual.confidence),
                text: mean_of(&|r| r.modalities.text.confidence),
            },
            mean_retention: mean_of(&|r| r.context.retention_score),
            incomplete_records: results
                .iter()
                .map(|r| r.modalities.incomplete_count())
                .sum(),
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} of {} admitted, mean integrity {:.2}",
            self.admitted, self.total, self.mean_integrity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus_yields_zeros() {
        let metrics = CorpusMetrics::compute(&[], &[]);
        assert_eq!(metrics.total, 0);
        assert_eq!(metrics.compliance_rate, 0.0);
        assert_eq!(metrics.mean_integrity, 0.0);
        assert_eq!(metrics.mean_confidence, ModalityConfidence::default());
    }

    #[test]
    fn test_all_rejected_rate_zero() {
        let rejection = RejectionRecord {
            submission_index: 0,
            plant_name: "Sage".into(),
            reasons: vec!["sacred_knowledge_excluded".into()],
            verdict: None,
            message: "rejected".into(),
        };
        let metrics = CorpusMetrics::compute(&[], &[rejection]);
        assert_eq!(metrics.total, 1);
        assert_eq!(metrics.rejected, 1);
        assert_eq!(metrics.compliance_rate, 0.0);
        assert_eq!(metrics.display_string(), "0 of 1 admitted, mean integrity 0.00");
    }
}
