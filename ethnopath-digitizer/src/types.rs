//! Core Types for the Digitization Pipeline
//!
//! Submission-side data model: plant identity, per-modality raw payloads,
//! cultural-context payloads, provenance attestations, and the
//! per-modality feature records produced by Tier 1 extraction.
//!
//! # Architecture
//! - **Tier 1:** Modality extractors (audio, visual, text) → `ModalityFeatureRecord`
//! - **Tier 2:** Cultural context preserver → `CulturalContextRecord`
//! - **Tier 3:** Knowledge graph builder → `KnowledgeGraphRecord`

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Confidence score (0.0-1.0)
pub type Confidence = f64;

// ============================================================================
// Submission
// ============================================================================

/// Plant identity (common name required, scientific name optional)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantIdentity {
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
}

impl PlantIdentity {
    pub fn new(common_name: impl Into<String>, scientific_name: Option<String>) -> Self {
        Self {
            common_name: common_name.into(),
            scientific_name,
        }
    }

    /// "Chamomile (Matricaria chamomilla)" or just "Chamomile"
    pub fn display_name(&self) -> String {
        match self.scientific_name.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(scientific) => format!("{} ({})", self.common_name, scientific),
            None => self.common_name.clone(),
        }
    }
}

/// Spoken-knowledge payload (pre-transcribed description)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioPayload {
    pub description: String,
    #[serde(default)]
    pub significance: Option<String>,
}

impl AudioPayload {
    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty()
    }
}

/// Visual documentation payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualPayload {
    /// Plant identification attributes ("thick succulent leaves", ...)
    #[serde(default)]
    pub identification: Vec<String>,
    /// References to preparation images
    #[serde(default)]
    pub preparation_images: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl VisualPayload {
    pub fn is_empty(&self) -> bool {
        all_blank(&self.identification)
            && all_blank(&self.preparation_images)
            && all_blank(&self.tools)
    }
}

/// Written-documentation payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    /// Documented uses, in documented order
    #[serde(default)]
    pub documented_uses: Vec<String>,
    #[serde(default)]
    pub historical_references: Vec<String>,
    #[serde(default)]
    pub regional_variations: RegionMap,
}

impl TextPayload {
    pub fn is_empty(&self) -> bool {
        all_blank(&self.documented_uses)
            && all_blank(&self.historical_references)
            && self.regional_variations.is_empty()
    }
}

fn all_blank(values: &[String]) -> bool {
    values.iter().all(|v| v.trim().is_empty())
}

/// Cultural-context payload supplied alongside one modality
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CulturalContextPayload {
    #[serde(default)]
    pub preparation: Option<String>,
    #[serde(default)]
    pub significance: Option<String>,
    #[serde(default)]
    pub regional_practices: RegionMap,
}

impl CulturalContextPayload {
    pub fn is_empty(&self) -> bool {
        is_blank(self.preparation.as_deref())
            && is_blank(self.significance.as_deref())
            && self.regional_practices.is_empty()
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Cultural-context payloads keyed by the modality that attested them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalityContexts {
    #[serde(default)]
    pub audio: Option<CulturalContextPayload>,
    #[serde(default)]
    pub visual: Option<CulturalContextPayload>,
    #[serde(default)]
    pub text: Option<CulturalContextPayload>,
}

impl ModalityContexts {
    pub fn get(&self, kind: ModalityKind) -> Option<&CulturalContextPayload> {
        match kind {
            ModalityKind::Audio => self.audio.as_ref(),
            ModalityKind::Visual => self.visual.as_ref(),
            ModalityKind::Text => self.text.as_ref(),
        }
    }

    pub fn get_mut(&mut self, kind: ModalityKind) -> &mut Option<CulturalContextPayload> {
        match kind {
            ModalityKind::Audio => &mut self.audio,
            ModalityKind::Visual => &mut self.visual,
            ModalityKind::Text => &mut self.text,
        }
    }
}

/// Provenance attestations populated by upstream curation
///
/// The compliance gate trusts these flags as given; it does not classify
/// free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Knowledge source / provenance string
    #[serde(default)]
    pub attribution: Option<String>,
    /// Explicit public-documentation attestation (`None` = unspecified)
    #[serde(default)]
    pub public_knowledge: Option<bool>,
    /// Flagged as sacred or restricted by the source
    #[serde(default)]
    pub sacred: bool,
}

/// One plant's bundled raw knowledge across modalities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSubmission {
    pub plant: PlantIdentity,
    #[serde(default)]
    pub audio: Option<AudioPayload>,
    #[serde(default)]
    pub visual: Option<VisualPayload>,
    #[serde(default)]
    pub text: Option<TextPayload>,
    #[serde(default)]
    pub cultural_context: ModalityContexts,
    #[serde(default)]
    pub provenance: SourceMetadata,
}

impl KnowledgeSubmission {
    /// Start building a submission for the given plant
    pub fn builder(common_name: impl Into<String>) -> SubmissionBuilder {
        SubmissionBuilder::new(common_name)
    }

    /// Whether at least one modality carries content
    pub fn has_modality_payload(&self) -> bool {
        self.audio.as_ref().is_some_and(|p| !p.is_empty())
            || self.visual.as_ref().is_some_and(|p| !p.is_empty())
            || self.text.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Check structural invariants
    ///
    /// Deserialized submissions bypass the builder, so the orchestrator
    /// re-checks every submission on receipt.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.plant.common_name.trim().is_empty() {
            return Err(ValidationError::MissingPlantIdentity);
        }
        if !self.has_modality_payload() {
            return Err(ValidationError::NoModalityPayload(
                self.plant.common_name.clone(),
            ));
        }
        Ok(())
    }
}

/// Validated construction of `KnowledgeSubmission`
#[derive(Debug, Clone)]
pub struct SubmissionBuilder {
    submission: KnowledgeSubmission,
}

impl SubmissionBuilder {
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            submission: KnowledgeSubmission {
                plant: PlantIdentity::new(common_name, None),
                audio: None,
                visual: None,
                text: None,
                cultural_context: ModalityContexts::default(),
                provenance: SourceMetadata::default(),
            },
        }
    }

    pub fn scientific_name(mut self, name: impl Into<String>) -> Self {
        self.submission.plant.scientific_name = Some(name.into());
        self
    }

    pub fn audio(mut self, payload: AudioPayload) -> Self {
        self.submission.audio = Some(payload);
        self
    }

    pub fn visual(mut self, payload: VisualPayload) -> Self {
        self.submission.visual = Some(payload);
        self
    }

    pub fn text(mut self, payload: TextPayload) -> Self {
        self.submission.text = Some(payload);
        self
    }

    /// Attach a cultural-context payload attested by one modality
    pub fn context(mut self, kind: ModalityKind, payload: CulturalContextPayload) -> Self {
        *self.submission.cultural_context.get_mut(kind) = Some(payload);
        self
    }

    pub fn attribution(mut self, source: impl Into<String>) -> Self {
        self.submission.provenance.attribution = Some(source.into());
        self
    }

    pub fn public_knowledge(mut self, attested: bool) -> Self {
        self.submission.provenance.public_knowledge = Some(attested);
        self
    }

    pub fn sacred(mut self, sacred: bool) -> Self {
        self.submission.provenance.sacred = sacred;
        self
    }

    /// Finish, enforcing the submission invariants
    pub fn build(self) -> Result<KnowledgeSubmission, ValidationError> {
        self.submission.validate()?;
        Ok(self.submission)
    }
}

// ============================================================================
// Region → practice map
// ============================================================================

/// A regional practice statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalPractice {
    pub region: String,
    pub practice: String,
}

/// Outcome of adding a statement to a `RegionMap`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionMerge {
    /// New region key
    Inserted,
    /// Statement concatenated onto an existing region
    Appended,
    /// Same statement already recorded for that region
    AlreadyPresent,
    /// Blank region or practice, nothing recorded
    Ignored,
}

/// Ordered region → practice mapping with unique region keys
///
/// Keys keep first-seen order. A second statement for an existing region is
/// concatenated, never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RegionalPractice>", into = "Vec<RegionalPractice>")]
pub struct RegionMap {
    entries: Vec<RegionalPractice>,
    /// Lowercased region key → position in `entries`
    index: HashMap<String, usize>,
}

/// Separator between concatenated practice statements
pub const PRACTICE_SEPARATOR: &str = "; ";

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs, merging repeated regions
    pub fn from_pairs<I, R, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, P)>,
        R: Into<String>,
        P: Into<String>,
    {
        let mut map = Self::new();
        for (region, practice) in pairs {
            map.merge(region, practice);
        }
        map
    }

    /// Add a statement, concatenating onto an existing region's value
    ///
    /// Region keys match case-insensitively; the first-seen spelling is kept.
    pub fn merge(&mut self, region: impl Into<String>, practice: impl Into<String>) -> RegionMerge {
        let region = region.into();
        let practice = practice.into();
        let (region, practice) = (region.trim(), practice.trim());
        if region.is_empty() || practice.is_empty() {
            return RegionMerge::Ignored;
        }

        let key = region.to_ascii_lowercase();
        match self.index.get(&key).and_then(|&i| self.entries.get_mut(i)) {
            Some(existing) => {
                let duplicate = existing
                    .practice
                    .split(PRACTICE_SEPARATOR)
                    .any(|s| s.trim().eq_ignore_ascii_case(practice));
                if duplicate {
                    RegionMerge::AlreadyPresent
                } else {
                    existing.practice.push_str(PRACTICE_SEPARATOR);
                    existing.practice.push_str(practice);
                    RegionMerge::Appended
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(RegionalPractice {
                    region: region.to_string(),
                    practice: practice.to_string(),
                });
                RegionMerge::Inserted
            }
        }
    }

    pub fn get(&self, region: &str) -> Option<&str> {
        self.index
            .get(&region.trim().to_ascii_lowercase())
            .and_then(|&i| self.entries.get(i))
            .map(|e| e.practice.as_str())
    }

    /// Region keys in first-seen order
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.region.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionalPractice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<RegionalPractice>> for RegionMap {
    fn from(entries: Vec<RegionalPractice>) -> Self {
        Self::from_pairs(entries.into_iter().map(|e| (e.region, e.practice)))
    }
}

impl From<RegionMap> for Vec<RegionalPractice> {
    fn from(map: RegionMap) -> Self {
        map.entries
    }
}

// ============================================================================
// Tier 1 output: modality feature records
// ============================================================================

/// Input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModalityKind {
    Audio,
    Visual,
    Text,
}

impl ModalityKind {
    /// Acquisition order (also the order regional statements are merged in)
    pub const ALL: [ModalityKind; 3] = [ModalityKind::Audio, ModalityKind::Visual, ModalityKind::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModalityKind::Audio => "audio",
            ModalityKind::Visual => "visual",
            ModalityKind::Text => "text",
        }
    }
}

impl fmt::Display for ModalityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features extracted from spoken descriptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Spoken content, verbatim
    pub spoken_content: String,
    /// Templated cultural-context caption
    pub cultural_context: String,
    pub significance: Option<String>,
    /// Capture descriptor of the source recordings
    pub audio_clarity: String,
}

/// Features extracted from visual documentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualFeatures {
    pub plant_identification: Vec<String>,
    pub identification_caption: String,
    pub preparation_images: Vec<String>,
    pub tools: Vec<String>,
    /// Templated cultural-significance caption
    pub cultural_significance: String,
}

/// Features extracted from written documentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    /// Documented uses, order preserved
    pub documented_uses: Vec<String>,
    pub historical_references: Vec<String>,
    pub cultural_context: String,
    /// Literature provenance caption
    pub knowledge_source: String,
}

/// Modality-specific extracted fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalityFeatures {
    Audio(AudioFeatures),
    Visual(VisualFeatures),
    Text(TextFeatures),
}

impl ModalityFeatures {
    pub fn kind(&self) -> ModalityKind {
        match self {
            ModalityFeatures::Audio(_) => ModalityKind::Audio,
            ModalityFeatures::Visual(_) => ModalityKind::Visual,
            ModalityFeatures::Text(_) => ModalityKind::Text,
        }
    }
}

/// Normalized per-modality feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityFeatureRecord {
    pub kind: ModalityKind,
    pub features: ModalityFeatures,
    /// Confidence (0.0-1.0)
    pub confidence: Confidence,
    /// False when the payload was empty or missing
    pub complete: bool,
}

impl ModalityFeatureRecord {
    /// Complete record with clamped confidence
    pub fn new(features: ModalityFeatures, confidence: Confidence) -> Self {
        Self {
            kind: features.kind(),
            features,
            confidence: confidence.clamp(0.0, 1.0),
            complete: true,
        }
    }

    /// Zero-confidence record for an empty or missing payload
    pub fn incomplete(features: ModalityFeatures) -> Self {
        Self {
            kind: features.kind(),
            features,
            confidence: 0.0,
            complete: false,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioFeatures> {
        match &self.features {
            ModalityFeatures::Audio(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_visual(&self) -> Option<&VisualFeatures> {
        match &self.features {
            ModalityFeatures::Visual(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextFeatures> {
        match &self.features {
            ModalityFeatures::Text(f) => Some(f),
            _ => None,
        }
    }
}

/// The three feature records of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityRecords {
    pub audio: ModalityFeatureRecord,
    pub visual: ModalityFeatureRecord,
    pub text: ModalityFeatureRecord,
}

impl ModalityRecords {
    pub fn get(&self, kind: ModalityKind) -> &ModalityFeatureRecord {
        match kind {
            ModalityKind::Audio => &self.audio,
            ModalityKind::Visual => &self.visual,
            ModalityKind::Text => &self.text,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModalityFeatureRecord> {
        [&self.audio, &self.visual, &self.text].into_iter()
    }

    /// Average confidence across all three records (incomplete count as 0)
    pub fn mean_confidence(&self) -> Confidence {
        self.iter().map(|r| r.confidence).sum::<f64>() / 3.0
    }

    pub fn incomplete_count(&self) -> usize {
        self.iter().filter(|r| !r.complete).count()
    }

    /// Documented uses from the text record (empty when text was missing)
    pub fn documented_uses(&self) -> &[String] {
        self.text
            .as_text()
            .map(|t| t.documented_uses.as_slice())
            .unwrap_or(&[])
    }
}
