//! Adaptation engine
//!
//! Orchestrates one adaptation end to end: parameter checks, concurrent
//! content and complexity analysis, strategy selection, pipeline execution,
//! output validation and descriptor post-processing. Progress goes to an
//! optional caller callback; lifecycle events go to the engine's broadcast
//! channel.

pub mod descriptors;
pub mod events;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::ai::client::generate_id;
use crate::ai::prompts::build_descriptors_prompt;
use crate::ai::{GenerationBackend, GenerationClient, GenerationOptions, RateLimitStatus};
use crate::analysis::{ComplexityAnalyzer, ComplexityReport, ContentAnalysis, ContentAnalyzer};
use crate::config::EngineConfig;
use crate::error::{AdaptationFailure, Result};
use crate::models::{AdaptationParams, DynamicDescriptors};
use crate::pipeline::{
    select_strategy, AdaptationPipeline, PipelineContext, PipelineMetadata, StepKind,
};
use crate::validation::{OutputValidator, ValidationOptions, ValidationReport};

pub use events::{AdaptationProgress, EngineEvent, EventBus, Phase};

pub const ENGINE_VERSION: &str = "2.0.0";

pub type ProgressCallback<'a> = &'a (dyn Fn(AdaptationProgress) + Send + Sync);

/// Analyzer output kept with the result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub content: ContentAnalysis,
    pub complexity: ComplexityReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetadata {
    #[serde(flatten)]
    pub pipeline: PipelineMetadata,
    pub processing_timestamp: DateTime<Utc>,
    pub engine_version: &'static str,
    pub quality_score: Option<f64>,
    pub analysis: AnalysisReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationResult {
    pub job_id: String,
    pub student_worksheet: String,
    pub teacher_guide: String,
    pub dynamic_descriptors: DynamicDescriptors,
    pub validation: Option<ValidationReport>,
    pub processing_metadata: ProcessingMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentJob {
    pub id: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub is_processing: bool,
    pub current_job: Option<CurrentJob>,
    pub uptime_ms: u64,
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned: PoisonError<RwLockReadGuard<'_, T>>| {
        warn!("[Engine] Job state lock was poisoned on read, recovering");
        poisoned.into_inner()
    })
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned: PoisonError<RwLockWriteGuard<'_, T>>| {
        warn!("[Engine] Job state lock was poisoned on write, recovering");
        poisoned.into_inner()
    })
}

/// Clears the current job when the adaptation ends, however it ends
struct JobGuard<'a> {
    slot: &'a RwLock<Option<CurrentJob>>,
    job_id: String,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        let mut slot = write_lock(self.slot);
        if slot.as_ref().map(|j| j.id == self.job_id).unwrap_or(false) {
            *slot = None;
        }
    }
}

pub struct AdaptationEngine {
    config: EngineConfig,
    client: GenerationClient,
    content_analyzer: ContentAnalyzer,
    complexity_analyzer: ComplexityAnalyzer,
    validator: OutputValidator,
    events: EventBus,
    current_job: RwLock<Option<CurrentJob>>,
    created: Instant,
}

impl AdaptationEngine {
    pub fn new(config: EngineConfig, backend: Arc<dyn GenerationBackend>) -> Result<Self> {
        config.validate()?;

        let validator = OutputValidator::new(ValidationOptions {
            check_quality: config.enable_quality_check,
            quality_threshold: config.quality_threshold,
            ..Default::default()
        });

        Ok(Self {
            client: GenerationClient::new(backend, config.effective_client()),
            content_analyzer: ContentAnalyzer::new(),
            complexity_analyzer: ComplexityAnalyzer::new(),
            validator,
            events: EventBus::default(),
            current_job: RwLock::new(None),
            created: Instant::now(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> EngineStatus {
        let current_job = read_lock(&self.current_job).clone();
        EngineStatus {
            is_processing: current_job.is_some(),
            current_job,
            uptime_ms: self.created.elapsed().as_millis() as u64,
        }
    }

    /// Usage of the generation client's current rate-limit window
    pub async fn rate_limit_status(&self) -> RateLimitStatus {
        self.client.rate_limit_status().await
    }

    /// Analyze `content` without generating anything
    pub async fn analyze(&self, params: &AdaptationParams) -> AnalysisReport {
        let (content, complexity) = tokio::join!(
            self.content_analyzer.analyze(&params.content),
            self.complexity_analyzer.analyze(
                &params.content,
                Some(params.subject.as_str()).filter(|s| !s.trim().is_empty()),
                params.grade_level.as_deref(),
            ),
        );
        AnalysisReport { content, complexity }
    }

    /// Adapt one piece of material.
    ///
    /// Failures carry the job id, a timestamp and the request so they can be
    /// correlated without the logs.
    pub async fn adapt_material(
        &self,
        params: &AdaptationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> std::result::Result<AdaptationResult, AdaptationFailure> {
        let job_id = generate_id("adapt");
        let _guard = self.begin_job(&job_id);

        self.events.emit(EngineEvent::Started { job_id: job_id.clone() });
        info!(
            job_id = %job_id,
            subject = %params.subject,
            proficiency_level = %params.proficiency_level,
            content_chars = params.content.len(),
            "[Engine] Adaptation started"
        );

        match self.run(&job_id, params, progress).await {
            Ok(result) => {
                info!(
                    job_id = %job_id,
                    strategy = %result.processing_metadata.pipeline.strategy,
                    tokens_used = result.processing_metadata.pipeline.tokens_used,
                    quality_score = ?result.processing_metadata.quality_score,
                    "[Engine] Adaptation completed"
                );
                self.events.emit(EngineEvent::Completed {
                    job_id,
                    strategy: result.processing_metadata.pipeline.strategy,
                    quality_score: result.processing_metadata.quality_score,
                });
                Ok(result)
            }
            Err(source) => {
                error!(job_id = %job_id, error = %source, "[Engine] Adaptation failed");
                self.events.emit(EngineEvent::Failed {
                    job_id: job_id.clone(),
                    message: source.to_string(),
                });
                Err(AdaptationFailure {
                    job_id,
                    timestamp: Utc::now(),
                    engine_version: ENGINE_VERSION,
                    params: Box::new(params.clone()),
                    source,
                })
            }
        }
    }

    fn begin_job(&self, job_id: &str) -> JobGuard<'_> {
        *write_lock(&self.current_job) = Some(CurrentJob {
            id: job_id.to_string(),
            started_at: Utc::now(),
        });
        JobGuard {
            slot: &self.current_job,
            job_id: job_id.to_string(),
        }
    }

    fn enter(&self, job_id: &str, phase: Phase, progress: Option<ProgressCallback<'_>>) {
        if let Some(callback) = progress {
            callback(AdaptationProgress::phase(phase));
        }
        self.events.emit(EngineEvent::PhaseChanged {
            job_id: job_id.to_string(),
            phase,
        });
    }

    async fn run(
        &self,
        job_id: &str,
        params: &AdaptationParams,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<AdaptationResult> {
        params.validate()?;

        self.enter(job_id, Phase::Analyzing, progress);
        let analysis = self.analyze(params).await;

        self.enter(job_id, Phase::SelectingStrategy, progress);
        let strategy = select_strategy(&analysis.content, &analysis.complexity);
        info!(
            job_id = %job_id,
            strategy = %strategy.kind,
            word_count = analysis.content.metrics.word_count,
            complexity_score = analysis.complexity.overall.score,
            "[Engine] Strategy selected"
        );

        self.enter(job_id, Phase::BuildingPipeline, progress);
        let pipeline = AdaptationPipeline::new(strategy)?;

        self.enter(job_id, Phase::Executing, progress);
        let on_step = |step: StepKind, percent: u32| {
            if let Some(callback) = progress {
                callback(AdaptationProgress {
                    phase: Phase::Executing,
                    message: format!("Executing {} ({}%)...", step, percent),
                });
            }
        };
        let ctx = PipelineContext {
            params,
            analysis: &analysis.content,
            complexity: &analysis.complexity,
            client: &self.client,
            on_step: Some(&on_step),
        };
        let result = pipeline.run(&ctx).await?;

        let validation = if self.config.enable_validation {
            self.enter(job_id, Phase::Validating, progress);
            Some(
                self.validator
                    .validate(&result.student_worksheet, &result.teacher_guide, params)
                    .await,
            )
        } else {
            None
        };

        self.enter(job_id, Phase::Finalizing, progress);
        let dynamic_descriptors = match result.dynamic_descriptors {
            Some(descriptors) => descriptors,
            None => self.generate_descriptors(&result.student_worksheet, params, &analysis.content).await,
        };

        Ok(AdaptationResult {
            job_id: job_id.to_string(),
            student_worksheet: result.student_worksheet,
            teacher_guide: result.teacher_guide,
            dynamic_descriptors,
            processing_metadata: ProcessingMetadata {
                pipeline: result.metadata,
                processing_timestamp: Utc::now(),
                engine_version: ENGINE_VERSION,
                quality_score: validation.as_ref().map(|v| v.overall.score),
                analysis,
            },
            validation,
        })
    }

    /// Content-specific descriptors from the backend, or the local set when
    /// generation fails or returns something unusable
    async fn generate_descriptors(
        &self,
        student_worksheet: &str,
        params: &AdaptationParams,
        analysis: &ContentAnalysis,
    ) -> DynamicDescriptors {
        let content_type = analysis.content_type.primary_type;
        let prompt = build_descriptors_prompt(student_worksheet, params, content_type.as_str());

        let generated: Result<DynamicDescriptors> =
            self.client.generate_json(&prompt, &GenerationOptions::default()).await;
        match generated {
            Ok(descriptors) if descriptors.is_usable() => descriptors,
            Ok(_) => {
                warn!("[Engine] Generated descriptors were incomplete, using local descriptors");
                descriptors::fallback_descriptors(params, content_type)
            }
            Err(e) => {
                warn!(error = %e, "[Engine] Failed to generate dynamic descriptors, using local descriptors");
                descriptors::fallback_descriptors(params, content_type)
            }
        }
    }
}
