//! Corpus sources
//!
//! A corpus source supplies the ordered sequence of submissions for a run.
//! Sources perform no media parsing: payloads arrive as already-described
//! text.

use crate::error::Result;
use crate::types::{
    AudioPayload, CulturalContextPayload, KnowledgeSubmission, ModalityKind, TextPayload,
    VisualPayload,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Attribution carried by every bundled sample plant
pub const SAMPLE_ATTRIBUTION: &str = "Ethnobotanical literature (public domain)";

/// Supplier of knowledge submissions
pub trait CorpusSource {
    /// Human-readable source name for logs
    fn name(&self) -> String;

    /// Load the corpus in submission order
    fn load(&self) -> Result<Vec<KnowledgeSubmission>>;
}

/// Bundled public-domain sample corpus
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCorpus;

struct SamplePlant {
    name: &'static str,
    scientific_name: &'static str,
    uses: [&'static str; 3],
    preparation: &'static str,
    audio_description: &'static str,
    audio_significance: &'static str,
    visual_description: &'static str,
}

const SAMPLE_PLANTS: [SamplePlant; 3] = [
    SamplePlant {
        name: "Aloe Vera",
        scientific_name: "Aloe barbadensis",
        uses: [
            "Traditional wound healing",
            "Skin burn treatment",
            "Digestive support",
        ],
        preparation: "Fresh gel extraction from leaves",
        audio_description: "Traditional healers describe aloe as the burn plant - fresh gel applied directly to minor burns and cuts",
        audio_significance: "Known in household tradition as the burn plant",
        visual_description: "Thick succulent leaves split lengthwise to reveal clear healing gel",
    },
    SamplePlant {
        name: "Chamomile",
        scientific_name: "Matricaria chamomilla",
        uses: ["Traditional calming tea", "Sleep aid", "Digestive comfort"],
        preparation: "Dried flowers steeped in hot water for 5-10 minutes",
        audio_description: "Chamomile tea brewing creates apple-like fragrance, traditionally used for evening relaxation",
        audio_significance: "Evening relaxation ritual",
        visual_description: "Small white daisy-like flowers with yellow centers, dried and stored in airtight containers",
    },
    SamplePlant {
        name: "Lavender",
        scientific_name: "Lavandula angustifolia",
        uses: [
            "Traditional relaxation",
            "Sleep enhancement",
            "Stress relief",
        ],
        preparation: "Essential oil extraction or dried flower sachets",
        audio_description: "Lavender essential oil traditionally used in aromatherapy for calming effects",
        audio_significance: "Calming aromatic tradition",
        visual_description: "Purple flower spikes harvested and dried, or steam-distilled for essential oil extraction",
    },
];

impl SamplePlant {
    fn to_submission(&self) -> Result<KnowledgeSubmission> {
        let submission = KnowledgeSubmission::builder(self.name)
            .scientific_name(self.scientific_name)
            .audio(AudioPayload {
                description: self.audio_description.to_string(),
                significance: Some(self.audio_significance.to_string()),
            })
            .visual(VisualPayload {
                identification: vec![self.visual_description.to_string()],
                preparation_images: Vec::new(),
                tools: Vec::new(),
            })
            .text(TextPayload {
                documented_uses: self.uses.iter().map(|u| u.to_string()).collect(),
                historical_references: Vec::new(),
                ..Default::default()
            })
            .context(
                ModalityKind::Visual,
                CulturalContextPayload {
                    preparation: Some(self.visual_description.to_string()),
                    ..Default::default()
                },
            )
            .context(
                ModalityKind::Text,
                CulturalContextPayload {
                    preparation: Some(self.preparation.to_string()),
                    ..Default::default()
                },
            )
            .attribution(SAMPLE_ATTRIBUTION)
            .public_knowledge(true)
            .build()?;
        Ok(submission)
    }
}

impl CorpusSource for SampleCorpus {
    fn name(&self) -> String {
        "bundled sample corpus".to_string()
    }

    fn load(&self) -> Result<Vec<KnowledgeSubmission>> {
        SAMPLE_PLANTS.iter().map(SamplePlant::to_submission).collect()
    }
}

/// Corpus read from a JSON array of submissions
///
/// Submissions are not validated on load; the orchestrator rejects
/// malformed ones individually.
#[derive(Debug, Clone)]
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for JsonFileCorpus {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<KnowledgeSubmission>> {
        let contents = std::fs::read_to_string(&self.path)?;
        let submissions: Vec<KnowledgeSubmission> = serde_json::from_str(&contents)?;
        info!(
            "Loaded {} submissions from {}",
            submissions.len(),
            self.path.display()
        );
        Ok(submissions)
    }
}
