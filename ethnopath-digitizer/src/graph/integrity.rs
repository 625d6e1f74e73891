// Integrity Scorer - Weighted Combination of Quality Components
//
// integrity = (w_c * compliance + w_f * mean_confidence + w_r * retention)
//             / (w_c + w_f + w_r)
//
// Weights are non-negative and each component is clamped to [0, 1], so the
// score stays in [0, 1] and never decreases when any single component rises.

use crate::error::{DigitizeError, Result};
use serde::{Deserialize, Serialize};

/// Relative weights of the integrity score components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrityWeights {
    pub compliance: f64,
    pub confidence: f64,
    pub retention: f64,
}

impl Default for IntegrityWeights {
    fn default() -> Self {
        Self {
            compliance: 0.2,
            confidence: 0.5,
            retention: 0.3,
        }
    }
}

impl IntegrityWeights {
    /// Reject negative, non-finite, or all-zero weights
    pub fn validate(&self) -> Result<()> {
        let weights = [self.compliance, self.confidence, self.retention];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(DigitizeError::Config(format!(
                "Integrity weights must be finite and non-negative: {:?}",
                self
            )));
        }
        if self.total() <= 0.0 {
            return Err(DigitizeError::Config(
                "At least one integrity weight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn total(&self) -> f64 {
        self.compliance + self.confidence + self.retention
    }
}

/// Inputs to the integrity score, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrityComponents {
    /// 1.0 for an admitted submission
    pub compliance: f64,
    /// Average confidence across the three modality records
    pub mean_confidence: f64,
    pub retention: f64,
}

/// Calculate integrity score from its components
///
/// # Returns
/// * Score in [0, 1]
pub fn calculate_integrity(weights: &IntegrityWeights, components: &IntegrityComponents) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }

    let weighted = weights.compliance * components.compliance.clamp(0.0, 1.0)
        + weights.confidence * components.mean_confidence.clamp(0.0, 1.0)
        + weights.retention * components.retention.clamp(0.0, 1.0);

    (weighted / total).clamp(0.0, 1.0)
}
