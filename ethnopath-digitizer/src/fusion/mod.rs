// Fusion Module - Cultural Context Preservation
//
// Tier 2: merges the cultural-context contributions of the three modalities
// into one attributed context record.

pub mod context_preserver;

pub use context_preserver::ContextPreserver;

use crate::types::{
    is_blank, CulturalContextPayload, KnowledgeSubmission, ModalityContexts, ModalityKind,
    RegionMap,
};
use serde::{Deserialize, Serialize};

/// Merged cultural context for one plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalContextRecord {
    /// First non-empty preparation statement (text > visual > audio)
    pub preparation: Option<String>,
    pub preparation_source: Option<ModalityKind>,

    /// First non-empty significance statement (text > visual > audio)
    pub significance: Option<String>,
    pub significance_source: Option<ModalityKind>,

    /// Region → practice map, first-seen region order
    pub regional_practices: RegionMap,

    /// Share of cultural detail that survived merging (0.0-1.0)
    pub retention_score: f64,

    /// Modalities that supplied any context
    pub contributing_modalities: Vec<ModalityKind>,

    /// Regions whose statements were concatenated across modalities
    pub merge_notes: Vec<MergeNote>,
}

/// Record of a region attested by more than one modality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeNote {
    pub region: String,
    pub appended_from: ModalityKind,
    pub statement: String,
}

/// Gather each modality's context contribution from a submission
///
/// A modality contributes its explicitly attached context payload plus the
/// context it carries natively: the audio significance note and the text
/// regional-variation map.
pub fn collect_contributions(submission: &KnowledgeSubmission) -> ModalityContexts {
    let mut contexts = submission.cultural_context.clone();

    if let Some(audio) = submission.audio.as_ref() {
        if !is_blank(audio.significance.as_deref()) {
            let entry = contexts
                .get_mut(ModalityKind::Audio)
                .get_or_insert_with(CulturalContextPayload::default);
            if is_blank(entry.significance.as_deref()) {
                entry.significance = audio.significance.clone();
            }
        }
    }

    if let Some(text) = submission.text.as_ref() {
        if !text.regional_variations.is_empty() {
            let entry = contexts
                .get_mut(ModalityKind::Text)
                .get_or_insert_with(CulturalContextPayload::default);
            for practice in text.regional_variations.iter() {
                entry
                    .regional_practices
                    .merge(practice.region.clone(), practice.practice.clone());
            }
        }
    }

    for kind in ModalityKind::ALL {
        let slot = contexts.get_mut(kind);
        if slot.as_ref().is_some_and(|c| c.is_empty()) {
            *slot = None;
        }
    }

    contexts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AudioPayload, TextPayload};

    #[test]
    fn test_native_context_is_collected() {
        let submission = KnowledgeSubmission::builder("Aloe Vera")
            .audio(AudioPayload {
                description: "The burn plant".into(),
                significance: Some("Household first aid".into()),
            })
            .text(TextPayload {
                documented_uses: vec!["wound healing".into()],
                regional_variations: RegionMap::from_pairs([("Egypt", "topical use")]),
                ..Default::default()
            })
            .build()
            .unwrap();

        let contexts = collect_contributions(&submission);
        assert_eq!(
            contexts.audio.as_ref().and_then(|c| c.significance.as_deref()),
            Some("Household first aid")
        );
        assert_eq!(
            contexts
                .text
                .as_ref()
                .and_then(|c| c.regional_practices.get("Egypt")),
            Some("topical use")
        );
        assert!(contexts.visual.is_none());
    }

    #[test]
    fn test_blank_context_payload_dropped() {
        let submission = KnowledgeSubmission::builder("Sage")
            .audio(AudioPayload {
                description: "Burned as a smudge".into(),
                significance: None,
            })
            .context(ModalityKind::Visual, CulturalContextPayload::default())
            .build()
            .unwrap();

        let contexts = collect_contributions(&submission);
        assert!(contexts.visual.is_none());
        assert!(contexts.audio.is_none());
    }
}
