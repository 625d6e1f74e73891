// Text Extractor - Written Ethnobotanical Documentation

use super::ModalityExtractor;
use crate::types::{
    Confidence, ModalityFeatureRecord, ModalityFeatures, ModalityKind, PlantIdentity,
    TextFeatures, TextPayload,
};
use tracing::debug;

/// Baseline confidence for non-empty written documentation
pub const TEXT_BASE_CONFIDENCE: Confidence = 0.96;

/// Literature provenance caption
pub const KNOWLEDGE_SOURCE: &str = "Ethnobotanical literature (public domain)";

/// Text modality extractor
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn caption(plant: &PlantIdentity) -> String {
        format!(
            "Publicly documented traditional applications of {}",
            plant.common_name
        )
    }
}

impl ModalityExtractor for TextExtractor {
    type Payload = TextPayload;

    fn kind(&self) -> ModalityKind {
        ModalityKind::Text
    }

    fn base_confidence(&self) -> Confidence {
        TEXT_BASE_CONFIDENCE
    }

    fn extract(&self, plant: &PlantIdentity, payload: Option<&TextPayload>) -> ModalityFeatureRecord {
        let Some(payload) = payload.filter(|p| !p.is_empty()) else {
            debug!(plant = %plant.common_name, "Text payload empty, record incomplete");
            return ModalityFeatureRecord::incomplete(ModalityFeatures::Text(TextFeatures {
                documented_uses: Vec::new(),
                historical_references: Vec::new(),
                cultural_context: Self::caption(plant),
                knowledge_source: KNOWLEDGE_SOURCE.to_string(),
            }));
        };

        // Uses are kept exactly as documented, order included
        let features = TextFeatures {
            documented_uses: payload.documented_uses.clone(),
            historical_references: payload.historical_references.clone(),
            cultural_context: Self::caption(plant),
            knowledge_source: KNOWLEDGE_SOURCE.to_string(),
        };

        debug!(
            plant = %plant.common_name,
            uses = features.documented_uses.len(),
            references = features.historical_references.len(),
            "Text features extracted"
        );

        ModalityFeatureRecord::new(ModalityFeatures::Text(features), self.base_confidence())
    }
}
