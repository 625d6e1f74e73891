//! Integration tests for the digitization pipeline
//!
//! **Test Coverage:**
//! - End-to-end admission of a fully documented plant
//! - Rejection isolation and corpus-order preservation
//! - Degraded integrity for empty modality payloads
//! - Validation of deserialized submissions
//! - Per-submission timeout accounting
//! - Progress event stream

use ethnopath_digitizer::corpus::{CorpusSource, SampleCorpus};
use ethnopath_digitizer::types::{
    AudioPayload, CulturalContextPayload, KnowledgeSubmission, ModalityKind, RegionMap,
    TextPayload, VisualPayload,
};
use ethnopath_digitizer::workflow::DigitizationEvent;
use ethnopath_digitizer::{Pipeline, PipelineConfig};
use std::time::Duration;
use tokio::sync::mpsc;

/// Helper: fully documented Chamomile submission
fn chamomile(visual: VisualPayload) -> KnowledgeSubmission {
    KnowledgeSubmission::builder("Chamomile")
        .scientific_name("Matricaria chamomilla")
        .audio(AudioPayload {
            description: "Tea brewing creates an apple-like fragrance".into(),
            significance: Some("Evening relaxation ritual".into()),
        })
        .visual(visual)
        .text(TextPayload {
            documented_uses: vec!["calming tea".into(), "sleep aid".into()],
            ..Default::default()
        })
        .context(
            ModalityKind::Text,
            CulturalContextPayload {
                preparation: Some("Dried flowers steeped in hot water".into()),
                ..Default::default()
            },
        )
        .attribution("Ethnobotanical literature")
        .build()
        .unwrap()
}

fn daisy_flowers() -> VisualPayload {
    VisualPayload {
        identification: vec!["Small white daisy-like flowers".into()],
        ..Default::default()
    }
}

/// Helper: minimal admitted submission
fn plant(name: &str) -> KnowledgeSubmission {
    KnowledgeSubmission::builder(name)
        .text(TextPayload {
            documented_uses: vec![format!("{} infusion", name)],
            ..Default::default()
        })
        .attribution("Ethnobotanical literature")
        .build()
        .unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).unwrap()
}

#[tokio::test]
async fn test_chamomile_end_to_end() {
    let run = pipeline().run(vec![chamomile(daisy_flowers())]).await.unwrap();

    assert_eq!(run.results.len(), 1);
    assert!(run.rejections.is_empty());

    let result = &run.results[0];
    assert!(result.verdict.admitted());
    assert!(result.modalities.iter().all(|r| r.complete));
    assert_eq!(
        result.modalities.text.as_text().unwrap().documented_uses,
        vec!["calming tea", "sleep aid"]
    );
    assert_eq!(result.graph.traditional_uses, vec!["calming tea", "sleep aid"]);
    assert_eq!(
        result.graph.preparation_summary,
        "Dried flowers steeped in hot water"
    );
    assert!(result
        .graph
        .relationships
        .cultural_respect
        .contains("public knowledge only"));
    assert!(result.graph.integrity_score > 0.0);
}

#[tokio::test]
async fn test_empty_visual_payload_lowers_integrity() {
    let run = pipeline()
        .run(vec![
            chamomile(daisy_flowers()),
            chamomile(VisualPayload::default()),
        ])
        .await
        .unwrap();

    assert_eq!(run.results.len(), 2);
    let full = &run.results[0];
    let degraded = &run.results[1];

    assert!(!degraded.modalities.visual.complete);
    assert_eq!(degraded.modalities.visual.confidence, 0.0);
    assert!(full.graph.integrity_score > degraded.graph.integrity_score);
    assert_eq!(run.metrics.incomplete_records, 1);
}

#[tokio::test]
async fn test_rejected_submission_keeps_order_of_others() {
    let mut sacred = plant("B");
    sacred.provenance.sacred = true;

    let run = pipeline()
        .run(vec![plant("A"), sacred, plant("C")])
        .await
        .unwrap();

    let admitted: Vec<_> = run
        .results
        .iter()
        .map(|r| r.plant.common_name.as_str())
        .collect();
    assert_eq!(admitted, vec!["A", "C"]);

    assert_eq!(run.rejections.len(), 1);
    let rejection = &run.rejections[0];
    assert_eq!(rejection.submission_index, 1);
    assert_eq!(rejection.plant_name, "B");
    assert_eq!(rejection.reasons, vec!["sacred_knowledge_excluded"]);

    assert_eq!(run.metrics.total, 3);
    assert!((run.metrics.compliance_rate - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_missing_attribution_produces_no_graph() {
    let mut unattributed = plant("Sage");
    unattributed.provenance.attribution = None;

    let run = pipeline().run(vec![unattributed]).await.unwrap();

    assert!(run.results.is_empty());
    let rejection = &run.rejections[0];
    assert!(rejection.reasons.contains(&"attribution_required".to_string()));
    let verdict = rejection.verdict.as_ref().unwrap();
    assert!(!verdict.admitted());
}

#[tokio::test]
async fn test_public_knowledge_denial_rejected() {
    let mut restricted = plant("Sage");
    restricted.provenance.public_knowledge = Some(false);

    let run = pipeline().run(vec![restricted]).await.unwrap();
    assert_eq!(run.rejections[0].reasons, vec!["public_knowledge_only"]);
}

#[tokio::test]
async fn test_deserialized_invalid_submissions_rejected_individually() {
    let corpus: Vec<KnowledgeSubmission> = serde_json::from_str(
        r#"[
            {"plant": {"common_name": "  "}, "text": {"documented_uses": ["tea"]},
             "provenance": {"attribution": "Ethnobotanical literature"}},
            {"plant": {"common_name": "Yarrow"},
             "provenance": {"attribution": "Ethnobotanical literature"}}
        ]"#,
    )
    .unwrap();

    let mut corpus = corpus;
    corpus.push(plant("Mint"));

    let run = pipeline().run(corpus).await.unwrap();

    assert_eq!(run.results.len(), 1);
    assert_eq!(run.results[0].plant.common_name, "Mint");
    assert_eq!(run.rejections[0].reasons, vec!["missing_plant_identity"]);
    assert_eq!(run.rejections[1].reasons, vec!["no_modality_payload"]);
}

#[tokio::test]
async fn test_regional_practices_merged_across_modalities() {
    let submission = KnowledgeSubmission::builder("Aloe Vera")
        .audio(AudioPayload {
            description: "The burn plant".into(),
            significance: None,
        })
        .context(
            ModalityKind::Audio,
            CulturalContextPayload {
                regional_practices: RegionMap::from_pairs([("Egypt", "topical use")]),
                ..Default::default()
            },
        )
        .text(TextPayload {
            documented_uses: vec!["wound healing".into()],
            regional_variations: RegionMap::from_pairs([("Egypt", "plant of immortality")]),
            ..Default::default()
        })
        .attribution("Ethnobotanical literature")
        .build()
        .unwrap();

    let run = pipeline().run(vec![submission]).await.unwrap();
    let context = &run.results[0].context;

    assert_eq!(
        context.regional_practices.get("Egypt"),
        Some("topical use; plant of immortality")
    );
}

#[tokio::test]
async fn test_results_follow_corpus_order_under_concurrency() {
    let names: Vec<String> = (0..24).map(|i| format!("Plant {:02}", i)).collect();
    let corpus = names.iter().map(|n| plant(n)).collect();

    let config = PipelineConfig {
        max_concurrent_submissions: 8,
        ..Default::default()
    };
    let run = Pipeline::new(config).unwrap().run(corpus).await.unwrap();

    let indices: Vec<usize> = run.results.iter().map(|r| r.submission_index).collect();
    assert_eq!(indices, (0..24).collect::<Vec<_>>());
    let produced: Vec<&str> = run
        .results
        .iter()
        .map(|r| r.plant.common_name.as_str())
        .collect();
    assert_eq!(produced, names.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_generous_budget_rejects_nothing() {
    let config = PipelineConfig {
        submission_timeout: Some(Duration::from_secs(30)),
        ..Default::default()
    };
    let corpus = SampleCorpus.load().unwrap();
    let run = Pipeline::new(config).unwrap().run(corpus).await.unwrap();

    assert_eq!(run.results.len(), 3);
    assert!(run.rejections.is_empty());
}

#[tokio::test]
async fn test_sample_corpus_fully_admitted() {
    let run = pipeline().run(SampleCorpus.load().unwrap()).await.unwrap();

    assert_eq!(run.metrics.admitted, 3);
    assert_eq!(run.metrics.compliance_rate, 1.0);
    assert!((run.metrics.mean_retention - 0.95).abs() < 1e-9);
    assert!(run.metrics.mean_confidence.text >= 0.95);
    assert_eq!(run.metrics.incomplete_records, 0);
}

#[tokio::test]
async fn test_event_stream_brackets_run() {
    let (tx, mut rx) = mpsc::channel(128);
    let pipeline = Pipeline::with_events(PipelineConfig::default(), tx).unwrap();

    let mut sacred = plant("Restricted");
    sacred.provenance.sacred = true;
    pipeline.run(vec![plant("Mint"), sacred]).await.unwrap();
    drop(pipeline);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(
        events.first(),
        Some(DigitizationEvent::RunStarted {
            total_submissions: 2,
            ..
        })
    ));
    assert!(matches!(
        events.last(),
        Some(DigitizationEvent::RunCompleted {
            admitted: 1,
            rejected: 1,
            ..
        })
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        DigitizationEvent::SubmissionRejected { plant, .. } if plant == "Restricted"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        DigitizationEvent::SubmissionCompleted { plant, .. } if plant == "Mint"
    )));
}

#[tokio::test]
async fn test_empty_corpus() {
    let run = pipeline().run(Vec::new()).await.unwrap();
    assert!(run.results.is_empty());
    assert_eq!(run.metrics.total, 0);
    assert_eq!(run.metrics.mean_integrity, 0.0);
}
