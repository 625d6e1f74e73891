// Context Preserver - Cross-Modality Cultural Context Merge
//
// Merge rules:
// - Preparation and significance: first non-empty wins, precedence
//   text > visual > audio.
// - Region map: modalities processed in acquisition order (audio, visual,
//   text); a repeated region gets the later statement appended, so no
//   attested practice is lost. Region keys keep first-seen order.
// - Retention: fixed baseline scaled by the share of modalities that
//   supplied any context.

use super::{CulturalContextRecord, MergeNote};
use crate::types::{ModalityContexts, ModalityKind, RegionMap, RegionMerge};
use tracing::{debug, info};

/// Retention score when every modality supplied context
pub const RETENTION_BASELINE: f64 = 0.95;

/// Precedence for free-text fields
const TEXT_FIELD_PRECEDENCE: [ModalityKind; 3] =
    [ModalityKind::Text, ModalityKind::Visual, ModalityKind::Audio];

/// Cultural context preserver
#[derive(Debug, Clone)]
pub struct ContextPreserver {
    retention_baseline: f64,
}

impl Default for ContextPreserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextPreserver {
    pub fn new() -> Self {
        Self {
            retention_baseline: RETENTION_BASELINE,
        }
    }

    /// Merge per-modality context payloads into one record
    pub fn preserve(&self, contexts: &ModalityContexts) -> CulturalContextRecord {
        let (preparation, preparation_source) =
            first_non_empty(contexts, |c| c.preparation.as_deref());
        let (significance, significance_source) =
            first_non_empty(contexts, |c| c.significance.as_deref());

        let mut regional_practices = RegionMap::new();
        let mut merge_notes = Vec::new();
        for kind in ModalityKind::ALL {
            let Some(context) = contexts.get(kind) else {
                continue;
            };
            for practice in context.regional_practices.iter() {
                let outcome =
                    regional_practices.merge(practice.region.clone(), practice.practice.clone());
                if outcome == RegionMerge::Appended {
                    debug!(
                        region = %practice.region,
                        modality = %kind,
                        "Regional practice appended to existing region"
                    );
                    merge_notes.push(MergeNote {
                        region: practice.region.clone(),
                        appended_from: kind,
                        statement: practice.practice.clone(),
                    });
                }
            }
        }

        let contributing_modalities: Vec<ModalityKind> = ModalityKind::ALL
            .into_iter()
            .filter(|kind| contexts.get(*kind).is_some_and(|c| !c.is_empty()))
            .collect();

        let coverage = contributing_modalities.len() as f64 / ModalityKind::ALL.len() as f64;
        let retention_score = self.retention_baseline * coverage;

        info!(
            regions = regional_practices.len(),
            merged_regions = merge_notes.len(),
            contributing = contributing_modalities.len(),
            retention = retention_score,
            "Cultural context preserved"
        );

        CulturalContextRecord {
            preparation,
            preparation_source,
            significance,
            significance_source,
            regional_practices,
            retention_score,
            contributing_modalities,
            merge_notes,
        }
    }
}

fn first_non_empty<F>(
    contexts: &ModalityContexts,
    field_accessor: F,
) -> (Option<String>, Option<ModalityKind>)
where
    F: Fn(&crate::types::CulturalContextPayload) -> Option<&str>,
{
    TEXT_FIELD_PRECEDENCE
        .into_iter()
        .find_map(|kind| {
            let value = field_accessor(contexts.get(kind)?)?.trim();
            (!value.is_empty()).then(|| (value.to_string(), kind))
        })
        .map_or((None, None), |(value, kind)| (Some(value), Some(kind)))
}
