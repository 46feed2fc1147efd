use super::*;
use crate::ai::testing::ScriptedBackend;
use crate::ai::GenerationResponse;
use crate::error::{AdaptError, BackendError, ErrorCategory};
use std::sync::Mutex;

const ADAPTED: &str = "STUDENT_WORKSHEET:\n## Adding Numbers\nDirections: Solve each problem.\n1. What is 2 + 3? The **sum** is ____.\n2. What is 4 + 1? The **sum** is ____.\n\nTEACHER_GUIDE:\n## Answer Key\n1. 5\n2. 5";

const DESCRIPTORS: &str = r#"{"title": "Adding Numbers - Emerging", "descriptors": ["Students can add two numbers with a sentence frame"], "contentSpecificSupports": ["Sentence frames"], "vocabularySupports": ["sum"], "languageObjectives": ["Say the sum aloud"], "assessmentSuggestions": [{"type": "Formative", "description": "Thumbs up check"}]}"#;

fn config() -> EngineConfig {
    let mut config = EngineConfig {
        max_retries: 1,
        ..Default::default()
    };
    config.client.retry_delay_ms = 1;
    config
}

fn params() -> AdaptationParams {
    AdaptationParams::new("Solve: 2 + 3 = ?\nSolve: 4 + 1 = ?", "Mathematics", "emerging")
}

fn is_descriptor_prompt(request: &crate::ai::GenerationRequest) -> bool {
    request.prompt_text().contains("generate specific WIDA descriptors")
}

fn engine(backend: Arc<ScriptedBackend>) -> AdaptationEngine {
    AdaptationEngine::new(config(), backend).unwrap()
}

fn drain(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_rejects_invalid_config() {
    let config = EngineConfig {
        quality_threshold: 1.5,
        ..Default::default()
    };
    let backend = Arc::new(ScriptedBackend::new(Vec::new()));
    assert!(matches!(
        AdaptationEngine::new(config, backend),
        Err(AdaptError::Config(_))
    ));
}

#[tokio::test]
async fn test_adapt_material_end_to_end() {
    let backend = Arc::new(ScriptedBackend::from_fn(|request| {
        let text = if is_descriptor_prompt(request) { DESCRIPTORS } else { ADAPTED };
        Ok(GenerationResponse::from_text(text))
    }));
    let engine = engine(backend.clone());
    let mut rx = engine.subscribe();

    let seen = Mutex::new(Vec::new());
    let on_progress = |update: AdaptationProgress| seen.lock().unwrap().push(update);

    let result = engine.adapt_material(&params(), Some(&on_progress)).await.unwrap();

    assert!(result.job_id.starts_with("adapt_"));
    assert!(result.student_worksheet.contains("## Adding Numbers"));
    assert!(result.teacher_guide.contains("Answer Key"));
    assert_eq!(result.dynamic_descriptors.title, "Adding Numbers - Emerging");
    assert_eq!(backend.calls(), 2);

    let validation = result.validation.as_ref().unwrap();
    assert_eq!(result.processing_metadata.quality_score, Some(validation.overall.score));
    assert_eq!(result.processing_metadata.engine_version, ENGINE_VERSION);
    assert!(result.processing_metadata.pipeline.tokens_used > 0);

    let phases: Vec<Phase> = {
        let seen = seen.lock().unwrap();
        let mut phases: Vec<Phase> = seen.iter().map(|p| p.phase).collect();
        phases.dedup();
        phases
    };
    assert_eq!(
        phases,
        vec![
            Phase::Analyzing,
            Phase::SelectingStrategy,
            Phase::BuildingPipeline,
            Phase::Executing,
            Phase::Validating,
            Phase::Finalizing
        ]
    );
    assert!(seen
        .lock()
        .unwrap()
        .iter()
        .any(|p| p.message.starts_with("Executing adapt (")));

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(EngineEvent::Started { .. })));
    assert!(matches!(events.last(), Some(EngineEvent::Completed { .. })));
    assert!(events.iter().all(|e| e.job_id() == result.job_id));

    let status = engine.status();
    assert!(!status.is_processing);
    assert!(status.current_job.is_none());
}

#[tokio::test]
async fn test_invalid_params_fail_before_generation() {
    let backend = Arc::new(ScriptedBackend::new(Vec::new()));
    let engine = engine(backend.clone());
    let mut rx = engine.subscribe();

    let params = AdaptationParams::new("  ", "Science", "developing");
    let failure = engine.adapt_material(&params, None).await.unwrap_err();

    assert!(matches!(failure.source, AdaptError::InvalidInput(_)));
    assert_eq!(failure.engine_version, ENGINE_VERSION);
    assert_eq!(failure.params.subject, "Science");
    assert_eq!(backend.calls(), 0);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], EngineEvent::Failed { job_id, .. } if *job_id == failure.job_id));
    assert!(!engine.status().is_processing);
}

#[tokio::test]
async fn test_malformed_descriptors_use_local_set() {
    let backend = Arc::new(ScriptedBackend::from_fn(|request| {
        let text = if is_descriptor_prompt(request) {
            "Here are some thoughts, but no JSON."
        } else {
            ADAPTED
        };
        Ok(GenerationResponse::from_text(text))
    }));
    let engine = engine(backend);

    let result = engine.adapt_material(&params(), None).await.unwrap();
    assert_eq!(result.dynamic_descriptors.title, "Mathematics - Emerging Level");
    assert!(result.dynamic_descriptors.is_usable());
}

#[tokio::test]
async fn test_incomplete_descriptors_use_local_set() {
    let backend = Arc::new(ScriptedBackend::from_fn(|request| {
        let text = if is_descriptor_prompt(request) {
            r#"{"title": "", "descriptors": []}"#
        } else {
            ADAPTED
        };
        Ok(GenerationResponse::from_text(text))
    }));
    let engine = engine(backend);

    let result = engine.adapt_material(&params(), None).await.unwrap();
    assert_eq!(result.dynamic_descriptors.title, "Mathematics - Emerging Level");
}

#[tokio::test]
async fn test_fatal_generation_error_fails_job() {
    let backend = Arc::new(ScriptedBackend::new(vec![Err(BackendError::http(401, "invalid api key"))]));
    let engine = engine(backend.clone());
    let mut rx = engine.subscribe();

    let failure = engine.adapt_material(&params(), None).await.unwrap_err();

    match &failure.source {
        AdaptError::PipelineStep { step, source } => {
            assert_eq!(step, "adapt");
            assert!(matches!(**source, AdaptError::GenerationFatal { status: Some(401), .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(failure.source.category(), Some(ErrorCategory::Authentication));
    assert_eq!(backend.calls(), 1);

    let events = drain(&mut rx);
    assert!(matches!(events.last(), Some(EngineEvent::Failed { .. })));
    assert!(!engine.status().is_processing);
}

#[tokio::test]
async fn test_validation_disabled() {
    let backend = Arc::new(ScriptedBackend::from_fn(|request| {
        let text = if is_descriptor_prompt(request) { DESCRIPTORS } else { ADAPTED };
        Ok(GenerationResponse::from_text(text))
    }));
    let config = EngineConfig {
        enable_validation: false,
        ..config()
    };
    let engine = AdaptationEngine::new(config, backend).unwrap();

    let seen = Mutex::new(Vec::new());
    let on_progress = |update: AdaptationProgress| seen.lock().unwrap().push(update.phase);
    let result = engine.adapt_material(&params(), Some(&on_progress)).await.unwrap();

    assert!(result.validation.is_none());
    assert_eq!(result.processing_metadata.quality_score, None);
    assert!(!seen.lock().unwrap().contains(&Phase::Validating));
}

#[tokio::test]
async fn test_status_reports_running_job() {
    let backend = Arc::new(
        ScriptedBackend::from_fn(|request| {
            let text = if is_descriptor_prompt(request) { DESCRIPTORS } else { ADAPTED };
            Ok(GenerationResponse::from_text(text))
        })
        .with_delay(std::time::Duration::from_millis(50)),
    );
    let engine = engine(backend);
    let params = params();

    let (result, status) = tokio::join!(engine.adapt_material(&params, None), async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        engine.status()
    });

    let result = result.unwrap();
    assert!(status.is_processing);
    assert_eq!(status.current_job.map(|j| j.id), Some(result.job_id));
    assert!(!engine.status().is_processing);
}

#[tokio::test]
async fn test_analyze_without_generation() {
    let backend = Arc::new(ScriptedBackend::new(Vec::new()));
    let engine = engine(backend.clone());

    let report = engine.analyze(&params()).await;
    assert!(report.content.metrics.word_count > 0);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_rate_limit_window_counts_generation_calls() {
    let backend = Arc::new(ScriptedBackend::from_fn(|request| {
        let text = if is_descriptor_prompt(request) { DESCRIPTORS } else { ADAPTED };
        Ok(GenerationResponse::from_text(text))
    }));
    let engine = engine(backend);
    assert_eq!(engine.rate_limit_status().await.requests_in_window, 0);

    engine.adapt_material(&params(), None).await.unwrap();

    let limits = engine.rate_limit_status().await;
    assert_eq!(limits.requests_in_window, 2);
    assert!(limits.tokens_in_window > 0);
    assert!(!limits.is_limited);
}
