// Visual Extractor - Plant Identification & Preparation Documentation

use super::ModalityExtractor;
use crate::types::{
    Confidence, ModalityFeatureRecord, ModalityFeatures, ModalityKind, PlantIdentity,
    VisualFeatures, VisualPayload,
};
use tracing::debug;

/// Baseline confidence for non-empty visual documentation
pub const VISUAL_BASE_CONFIDENCE: Confidence = 0.91;

/// Visual modality extractor
#[derive(Debug, Clone, Default)]
pub struct VisualExtractor;

impl VisualExtractor {
    pub fn new() -> Self {
        Self
    }

    fn features(plant: &PlantIdentity, payload: Option<&VisualPayload>) -> VisualFeatures {
        VisualFeatures {
            plant_identification: payload.map(|p| p.identification.clone()).unwrap_or_default(),
            identification_caption: format!(
                "{} visual characteristics documented",
                plant.common_name
            ),
            preparation_images: payload
                .map(|p| p.preparation_images.clone())
                .unwrap_or_default(),
            tools: payload.map(|p| p.tools.clone()).unwrap_or_default(),
            cultural_significance: format!(
                "Traditional preparation techniques for {}",
                plant.common_name
            ),
        }
    }
}

impl ModalityExtractor for VisualExtractor {
    type Payload = VisualPayload;

    fn kind(&self) -> ModalityKind {
        ModalityKind::Visual
    }

    fn base_confidence(&self) -> Confidence {
        VISUAL_BASE_CONFIDENCE
    }

    fn extract(&self, plant: &PlantIdentity, payload: Option<&VisualPayload>) -> ModalityFeatureRecord {
        let payload = payload.filter(|p| !p.is_empty());
        let features = Self::features(plant, payload);

        if payload.is_none() {
            debug!(plant = %plant.common_name, "Visual payload empty, record incomplete");
            return ModalityFeatureRecord::incomplete(ModalityFeatures::Visual(features));
        }

        debug!(
            plant = %plant.common_name,
            attributes = features.plant_identification.len(),
            images = features.preparation_images.len(),
            tools = features.tools.len(),
            "Visual features extracted"
        );

        ModalityFeatureRecord::new(ModalityFeatures::Visual(features), self.base_confidence())
    }
}
