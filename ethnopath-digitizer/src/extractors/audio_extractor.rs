// Audio Extractor - Spoken Traditional Knowledge
//
// Inputs are pre-transcribed descriptions of oral knowledge, not raw audio.

use super::ModalityExtractor;
use crate::types::{
    AudioFeatures, AudioPayload, Confidence, ModalityFeatureRecord, ModalityFeatures,
    ModalityKind, PlantIdentity,
};
use tracing::debug;

/// Baseline confidence for a non-empty spoken description
pub const AUDIO_BASE_CONFIDENCE: Confidence = 0.94;

/// Capture descriptor of the source recordings
pub const AUDIO_CLARITY: &str = "22kHz recording quality";

/// Audio modality extractor
#[derive(Debug, Clone, Default)]
pub struct AudioExtractor;

impl AudioExtractor {
    pub fn new() -> Self {
        Self
    }

    fn caption(plant: &PlantIdentity) -> String {
        format!("Traditional oral knowledge about {}", plant.common_name)
    }
}

impl ModalityExtractor for AudioExtractor {
    type Payload = AudioPayload;

    fn kind(&self) -> ModalityKind {
        ModalityKind::Audio
    }

    fn base_confidence(&self) -> Confidence {
        AUDIO_BASE_CONFIDENCE
    }

    fn extract(&self, plant: &PlantIdentity, payload: Option<&AudioPayload>) -> ModalityFeatureRecord {
        let Some(payload) = payload.filter(|p| !p.is_empty()) else {
            debug!(plant = %plant.common_name, "Audio payload empty, record incomplete");
            return ModalityFeatureRecord::incomplete(ModalityFeatures::Audio(AudioFeatures {
                spoken_content: String::new(),
                cultural_context: Self::caption(plant),
                significance: None,
                audio_clarity: AUDIO_CLARITY.to_string(),
            }));
        };

        let features = AudioFeatures {
            spoken_content: payload.description.clone(),
            cultural_context: Self::caption(plant),
            significance: payload
                .significance
                .clone()
                .filter(|s| !s.trim().is_empty()),
            audio_clarity: AUDIO_CLARITY.to_string(),
        };

        debug!(
            plant = %plant.common_name,
            chars = features.spoken_content.len(),
            "Audio features extracted"
        );

        ModalityFeatureRecord::new(ModalityFeatures::Audio(features), self.base_confidence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant() -> PlantIdentity {
        PlantIdentity::new("Test Plant", None)
    }

    #[test]
    fn test_spoken_content_copied_verbatim() {
        let payload = AudioPayload {
            description: "Traditional healing plant used for wellness".into(),
            significance: Some("Shared at harvest gatherings".into()),
        };

        let record = AudioExtractor::new().extract(&plant(), Some(&payload));
        let features = record.as_audio().unwrap();

        assert_eq!(features.spoken_content, payload.description);
        assert_eq!(features.cultural_context, "Traditional oral knowledge about Test Plant");
        assert_eq!(features.significance.as_deref(), Some("Shared at harvest gatherings"));
        assert!(record.confidence > 0.9);
        assert!(record.complete);
    }

    #[test]
    fn test_empty_description_is_incomplete() {
        let payload = AudioPayload {
            description: "   ".into(),
            significance: Some("ignored".into()),
        };

        let record = AudioExtractor::new().extract(&plant(), Some(&payload));
        assert_eq!(record.confidence, 0.0);
        assert!(!record.complete);
        assert_eq!(record.kind, ModalityKind::Audio);
    }

    #[test]
    fn test_missing_payload_is_incomplete() {
        let record = AudioExtractor::new().extract(&plant(), None);
        assert!(!record.complete);
        assert_eq!(record.confidence, 0.0);
    }

    #[test]
    fn test_idempotent() {
        let payload = AudioPayload {
            description: "Aloe is the burn plant".into(),
            significance: None,
        };
        let extractor = AudioExtractor::new();
        assert_eq!(
            extractor.extract(&plant(), Some(&payload)),
            extractor.extract(&plant(), Some(&payload))
        );
    }
}
