//! Adaptation pipeline
//!
//! Runs the ordered step list of a [`ProcessingStrategy`] against a private
//! working state. The state is only turned into a [`PipelineResult`] after
//! every step succeeded; a failing step aborts the run with its name
//! attached and nothing partial escapes.

pub mod chunking;
pub mod preprocess;
pub mod steps;
pub mod strategy;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::adapters::subject::{self, SubjectAdaptations};
use crate::adapters::{bilingual, iep, wida, WidaAdaptations};
use crate::ai::client::{GenerationClient, GenerationOptions};
use crate::ai::prompts::{self, ChunkPart, PromptContext, CONTENT_PLACEHOLDER};
use crate::ai::response_parser::{fallback_teacher_guide, validate_parsed_content};
use crate::analysis::{ComplexityReport, ContentAnalysis};
use crate::error::{AdaptError, Result};
use crate::models::{AdaptationParams, DynamicDescriptors};

pub use steps::StepKind;
pub use strategy::{select_strategy, ProcessingStrategy, StrategyKind};

const PASSAGE_PLACEHOLDERS: [&str; 2] = [CONTENT_PLACEHOLDER, "{{READING_PASSAGE_PLACEHOLDER}}"];

static OPEN_GLYPHS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[□☐○◯]").unwrap());
static CHECKED_GLYPHS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[✓☑●◉]").unwrap());
static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n(?:\s*\n)+").unwrap());

/// Called before each step with the step and the run's percent complete
pub type StepObserver<'a> = &'a (dyn Fn(StepKind, u32) + Send + Sync);

/// Borrowed inputs for one run
pub struct PipelineContext<'a> {
    pub params: &'a AdaptationParams,
    pub analysis: &'a ContentAnalysis,
    pub complexity: &'a ComplexityReport,
    pub client: &'a GenerationClient,
    pub on_step: Option<StepObserver<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    pub strategy: StrategyKind,
    pub steps: Vec<StepKind>,
    pub tokens_used: u64,
    pub processing_time_ms: u64,
    pub chunk_count: usize,
    pub preprocessing_changes: Vec<String>,
    pub enhancements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub student_worksheet: String,
    pub teacher_guide: String,
    pub dynamic_descriptors: Option<DynamicDescriptors>,
    pub metadata: PipelineMetadata,
}

/// Adapter output shared by every prompt of one run
struct PromptFragments {
    wida: &'static WidaAdaptations,
    subject: SubjectAdaptations,
    bilingual: String,
    iep: String,
}

impl PromptFragments {
    fn new(params: &AdaptationParams, analysis: &ContentAnalysis) -> Self {
        Self {
            wida: wida::get_adaptations(&params.proficiency_level),
            subject: subject::get_subject_adaptations(&params.subject, analysis),
            bilingual: if params.include_bilingual_support {
                bilingual::build_instructions(params) + &bilingual::build_cognate_hint(params)
            } else {
                String::new()
            },
            iep: if params.has_iep_accommodations() {
                iep::build_instructions(params) + &iep::build_checklist_hint(analysis, params)
            } else {
                String::new()
            },
        }
    }
}

#[derive(Default)]
struct RunState {
    content: String,
    chunks: Vec<String>,
    chunk_outputs: Vec<(String, String)>,
    student_worksheet: String,
    teacher_guide: String,
    tokens_used: u64,
    preprocessing_changes: Vec<String>,
    enhancements: Vec<String>,
}

pub struct AdaptationPipeline {
    strategy: ProcessingStrategy,
}

impl AdaptationPipeline {
    /// Validate the step list up front so a bad strategy fails before any call
    pub fn new(strategy: ProcessingStrategy) -> Result<Self> {
        steps::validate_steps(&strategy.steps)?;
        Ok(Self { strategy })
    }

    pub fn strategy(&self) -> &ProcessingStrategy {
        &self.strategy
    }

    pub async fn run(&self, ctx: &PipelineContext<'_>) -> Result<PipelineResult> {
        let started = Instant::now();
        let fragments = PromptFragments::new(ctx.params, ctx.analysis);
        let mut state = RunState {
            content: ctx.params.content.clone(),
            ..Default::default()
        };

        let total = self.strategy.steps.len();
        for (i, step) in self.strategy.steps.iter().copied().enumerate() {
            let percent = (((i + 1) as f64 / total as f64) * 100.0).round() as u32;
            if let Some(on_step) = ctx.on_step {
                on_step(step, percent);
            }

            debug!(step = %step, percent, "[Pipeline] Step started");
            self.execute(step, ctx, &fragments, &mut state)
                .await
                .map_err(|e| AdaptError::step(step.as_str(), e))?;
            debug!(step = %step, tokens = state.tokens_used, "[Pipeline] Step finished");
        }

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            strategy = %self.strategy.kind,
            tokens = state.tokens_used,
            chunks = state.chunks.len(),
            processing_time_ms,
            "[Pipeline] Run complete"
        );

        Ok(PipelineResult {
            student_worksheet: state.student_worksheet,
            teacher_guide: state.teacher_guide,
            dynamic_descriptors: None,
            metadata: PipelineMetadata {
                strategy: self.strategy.kind,
                steps: self.strategy.steps.clone(),
                tokens_used: state.tokens_used,
                processing_time_ms,
                chunk_count: state.chunks.len(),
                preprocessing_changes: state.preprocessing_changes,
                enhancements: state.enhancements,
            },
        })
    }

    async fn execute(
        &self,
        step: StepKind,
        ctx: &PipelineContext<'_>,
        fragments: &PromptFragments,
        state: &mut RunState,
    ) -> Result<()> {
        match step {
            StepKind::Preprocess => {
                let processed = preprocess::preprocess(&state.content);
                state.content = processed.content;
                state.preprocessing_changes = processed.changes;
                Ok(())
            }
            StepKind::Chunk => {
                let size = self.strategy.chunk_size.unwrap_or(strategy::DEFAULT_CHUNK_SIZE);
                state.chunks = chunking::chunk_content(&state.content, size);
                debug!(chunks = state.chunks.len(), size, "[Pipeline] Content chunked");
                Ok(())
            }
            StepKind::Adapt => self.adapt(ctx, fragments, state).await,
            StepKind::Merge => {
                let worksheets: Vec<&str> = state.chunk_outputs.iter().map(|(w, _)| w.as_str()).collect();
                // chunks that fell back share one guide skeleton; keep it once
                let fallback = fallback_teacher_guide();
                let guides: Vec<&str> = state
                    .chunk_outputs
                    .iter()
                    .map(|(_, g)| g.as_str())
                    .filter(|g| g.trim() != fallback.trim())
                    .collect();
                state.student_worksheet = chunking::merge_sections(&worksheets);
                state.teacher_guide = if guides.is_empty() && !state.chunk_outputs.is_empty() {
                    fallback
                } else {
                    chunking::merge_sections(&guides)
                };
                Ok(())
            }
            StepKind::Enhance => {
                enhance(state);
                Ok(())
            }
            StepKind::CreateStructure => {
                let prompt = prompts::build_structure_prompt(&state.content, ctx.params, fragments.wida);
                let generated = ctx
                    .client
                    .generate_adaptation(&prompt, &self.options())
                    .await?;
                state.student_worksheet = generated.student_worksheet;
                state.teacher_guide = generated.teacher_guide;
                state.tokens_used += generated.tokens_used;
                Ok(())
            }
            StepKind::InsertContent => {
                state.student_worksheet = insert_passage(&state.student_worksheet, &state.content);
                Ok(())
            }
            StepKind::Validate => validate_result(state),
        }
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions::with_max_tokens(self.strategy.max_tokens)
    }

    async fn adapt(
        &self,
        ctx: &PipelineContext<'_>,
        fragments: &PromptFragments,
        state: &mut RunState,
    ) -> Result<()> {
        let options = self.options();

        if state.chunks.is_empty() {
            let prompt = prompts::build_adaptation_prompt(&prompt_context(ctx, fragments, &state.content, None));
            let generated = ctx.client.generate_adaptation(&prompt, &options).await?;
            state.student_worksheet = generated.student_worksheet;
            state.teacher_guide = generated.teacher_guide;
            state.tokens_used += generated.tokens_used;
            return Ok(());
        }

        // Sequential so outputs line up with chunk order
        let total = state.chunks.len();
        for (i, chunk) in state.chunks.iter().enumerate() {
            let part = ChunkPart { index: i + 1, total };
            let prompt = prompts::build_adaptation_prompt(&prompt_context(ctx, fragments, chunk, Some(part)));
            let generated = ctx.client.generate_adaptation(&prompt, &options).await?;
            debug!(part = i + 1, total, tokens = generated.tokens_used, "[Pipeline] Chunk adapted");
            state.tokens_used += generated.tokens_used;
            state
                .chunk_outputs
                .push((generated.student_worksheet, generated.teacher_guide));
        }
        Ok(())
    }
}

fn prompt_context<'a>(
    ctx: &'a PipelineContext<'a>,
    fragments: &'a PromptFragments,
    content: &'a str,
    part: Option<ChunkPart>,
) -> PromptContext<'a> {
    PromptContext {
        content,
        params: ctx.params,
        analysis: Some(ctx.analysis),
        complexity: Some(ctx.complexity),
        wida: fragments.wida,
        subject: Some(&fragments.subject),
        bilingual_instructions: &fragments.bilingual,
        iep_instructions: &fragments.iep,
        part,
    }
}

/// Deterministic fixes applied to generated output
fn enhance(state: &mut RunState) {
    let original = state.student_worksheet.clone();
    let fixed = OPEN_GLYPHS.replace_all(&state.student_worksheet, "[ ]").into_owned();
    let fixed = CHECKED_GLYPHS.replace_all(&fixed, "[x]").into_owned();
    if fixed != original {
        state.enhancements.push("replaced legacy glyphs".to_string());
    }

    let collapsed = EXCESS_BLANK_LINES.replace_all(&fixed, "\n\n").into_owned();
    if collapsed != fixed {
        state.enhancements.push("collapsed blank lines".to_string());
    }
    state.student_worksheet = collapsed;

    if state.teacher_guide.trim().is_empty() {
        state.teacher_guide = fallback_teacher_guide();
        state.enhancements.push("added fallback teacher guide".to_string());
    }
}

/// Put the passage where the structure left a placeholder, or on top
fn insert_passage(structure: &str, passage: &str) -> String {
    if PASSAGE_PLACEHOLDERS.iter().any(|p| structure.contains(p)) {
        PASSAGE_PLACEHOLDERS
            .iter()
            .fold(structure.to_string(), |acc, p| acc.replace(p, passage))
    } else {
        format!("## Reading Passage\n\n{}\n\n{}", passage, structure)
    }
}

fn validate_result(state: &RunState) -> Result<()> {
    if state.student_worksheet.trim().is_empty() {
        return Err(AdaptError::Parse("generated student worksheet is empty".to_string()));
    }
    let check = validate_parsed_content(&state.student_worksheet, &state.teacher_guide);
    for issue in &check.issues {
        warn!(issue = %issue, "[Pipeline] Generated content check");
    }
    Ok(())
}
