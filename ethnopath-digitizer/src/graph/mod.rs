//! Knowledge Graph Builder
//!
//! Tier 3: assembles extractor output and the preserved cultural context
//! into a relationship record for one plant, with an integrity score.
//!
//! The cultural-respect edge is derived from the compliance verdict. A
//! non-admitted verdict reaching the builder is an orchestration bug and
//! fails with `PreconditionViolation` instead of scoring low.

pub mod integrity;

pub use integrity::{calculate_integrity, IntegrityComponents, IntegrityWeights};

use crate::compliance::ComplianceVerdict;
use crate::error::{DigitizeError, Result};
use crate::fusion::CulturalContextRecord;
use crate::types::{ModalityRecords, PlantIdentity};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed relationship edges of a knowledge graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalRelationships {
    pub historical_use: String,
    pub cultural_respect: String,
    pub modern_validation: String,
}

/// Relationship graph for one plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraphRecord {
    pub plant: PlantIdentity,
    /// Traditional uses, in documented order
    pub traditional_uses: Vec<String>,
    pub preparation_summary: String,
    pub relationships: CulturalRelationships,
    /// Integrity score (0.0-1.0)
    pub integrity_score: f64,
    pub integrity_components: IntegrityComponents,
}

/// Everything the builder reads for one plant
#[derive(Debug, Clone, Copy)]
pub struct GraphInput<'a> {
    pub plant: &'a PlantIdentity,
    pub uses: &'a [String],
    pub preparation: Option<&'a str>,
    pub context: &'a CulturalContextRecord,
    pub modalities: &'a ModalityRecords,
    pub verdict: &'a ComplianceVerdict,
    /// Historical references from written sources
    pub historical_references: &'a [String],
}

/// Preparation summary when no modality documented one
pub const UNDOCUMENTED_PREPARATION: &str = "Preparation method not documented";

/// Knowledge graph builder
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraphBuilder {
    weights: IntegrityWeights,
}

impl KnowledgeGraphBuilder {
    pub fn new(weights: IntegrityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &IntegrityWeights {
        &self.weights
    }

    /// Build the knowledge graph record
    ///
    /// # Errors
    /// `PreconditionViolation` when the verdict is not admitted or the plant
    /// identity is blank.
    pub fn build(&self, input: GraphInput<'_>) -> Result<KnowledgeGraphRecord> {
        if !input.verdict.admitted() {
            return Err(DigitizeError::PreconditionViolation(format!(
                "knowledge graph requested for non-admitted submission '{}'",
                input.plant.common_name
            )));
        }
        if input.plant.common_name.trim().is_empty() {
            return Err(DigitizeError::PreconditionViolation(
                "knowledge graph requested without plant identity".to_string(),
            ));
        }

        let relationships = CulturalRelationships {
            historical_use: historical_use_edge(input.plant, input.historical_references),
            cultural_respect: cultural_respect_edge(input.plant, input.verdict),
            modern_validation: modern_validation_edge(input.plant),
        };

        let components = IntegrityComponents {
            compliance: 1.0,
            mean_confidence: input.modalities.mean_confidence(),
            retention: input.context.retention_score,
        };
        let integrity_score = calculate_integrity(&self.weights, &components);

        debug!(
            plant = %input.plant.common_name,
            integrity = integrity_score,
            mean_confidence = components.mean_confidence,
            retention = components.retention,
            "Knowledge graph built"
        );

        Ok(KnowledgeGraphRecord {
            plant: input.plant.clone(),
            traditional_uses: input.uses.to_vec(),
            preparation_summary: input
                .preparation
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(UNDOCUMENTED_PREPARATION)
                .to_string(),
            relationships,
            integrity_score,
            integrity_components: components,
        })
    }
}

fn historical_use_edge(plant: &PlantIdentity, references: &[String]) -> String {
    let references: Vec<&str> = references
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();

    if references.is_empty() {
        format!("{}: documented in ethnobotanical literature", plant.common_name)
    } else {
        format!(
            "{}: documented in ethnobotanical literature ({})",
            plant.common_name,
            references.join("; ")
        )
    }
}

fn cultural_respect_edge(plant: &PlantIdentity, verdict: &ComplianceVerdict) -> String {
    let satisfied: Vec<&str> = verdict.satisfied().map(|r| r.name()).collect();
    let source = verdict.attribution().unwrap_or("unattributed");

    format!(
        "{}: public knowledge only, no sacred content (policies satisfied: {}; source: {})",
        plant.common_name,
        satisfied.join(", "),
        source
    )
}

fn modern_validation_edge(plant: &PlantIdentity) -> String {
    match plant.scientific_name.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(scientific) => format!(
            "{} ({}): cross-referenced with scientific literature",
            plant.common_name, scientific
        ),
        None => format!(
            "{}: pending cross-reference with scientific literature (no scientific name)",
            plant.common_name
        ),
    }
}
