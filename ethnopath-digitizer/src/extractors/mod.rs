// Tier 1 Extractors - Per-Modality Feature Extraction
//
// Three independent extractors (audio, visual, text). Each is pure: identical
// input yields an identical record. An empty or missing payload never fails;
// it yields a zero-confidence record marked incomplete.

use crate::types::{Confidence, ModalityFeatureRecord, ModalityKind, PlantIdentity};

pub mod audio_extractor;
pub mod text_extractor;
pub mod visual_extractor;

pub use audio_extractor::AudioExtractor;
pub use text_extractor::TextExtractor;
pub use visual_extractor::VisualExtractor;

/// Extractor trait - all Tier 1 extractors implement this
pub trait ModalityExtractor: Send + Sync {
    /// Raw payload type consumed by this extractor
    type Payload;

    /// Modality handled by this extractor
    fn kind(&self) -> ModalityKind;

    /// Confidence assigned to a non-empty payload
    fn base_confidence(&self) -> Confidence;

    /// Extract a feature record for one plant
    ///
    /// # Arguments
    /// * `plant` - Plant identity used to template captions
    /// * `payload` - Raw modality payload (`None` when the submission omitted it)
    ///
    /// # Returns
    /// Always a record; `complete == false` and confidence 0 for empty input
    fn extract(&self, plant: &PlantIdentity, payload: Option<&Self::Payload>)
        -> ModalityFeatureRecord;
}
