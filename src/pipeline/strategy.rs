//! Strategy decision table
//!
//! Picks the pipeline shape for one request from content type, word count
//! and the complexity report. Rows are evaluated in order; first match wins.

use serde::Serialize;

use super::steps::StepKind;
use crate::analysis::{ComplexityReport, ContentAnalysis, ContentType, ProcessingRecommendation};

pub const TWO_STEP_MIN_WORDS: usize = 1000;
pub const MULTI_STEP_MIN_WORDS: usize = 2000;
pub const SIMPLE_MAX_SCORE: f64 = 20.0;
pub const SIMPLE_MAX_WORDS: usize = 500;
pub const STANDARD_MAX_SCORE: f64 = 60.0;
pub const STANDARD_MAX_WORDS: usize = 2000;
/// Chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Simple,
    Standard,
    Chunked,
    TwoStep,
    MultiStep,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Simple => "simple",
            StrategyKind::Standard => "standard",
            StrategyKind::Chunked => "chunked",
            StrategyKind::TwoStep => "two_step",
            StrategyKind::MultiStep => "multi_step",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chosen pipeline shape; immutable once selected
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStrategy {
    pub kind: StrategyKind,
    pub steps: Vec<StepKind>,
    pub max_tokens: u32,
    pub chunk_size: Option<usize>,
}

impl ProcessingStrategy {
    pub fn for_kind(kind: StrategyKind) -> Self {
        use StepKind::*;
        let (steps, max_tokens, chunk_size) = match kind {
            StrategyKind::Simple => (vec![Preprocess, Adapt, Validate], 2048, None),
            StrategyKind::Standard => (vec![Preprocess, Adapt, Enhance, Validate], 4096, None),
            StrategyKind::Chunked => (
                vec![Preprocess, Chunk, Adapt, Merge, Validate],
                4096,
                Some(DEFAULT_CHUNK_SIZE),
            ),
            StrategyKind::TwoStep => (
                vec![Preprocess, CreateStructure, InsertContent, Validate],
                4096,
                None,
            ),
            StrategyKind::MultiStep => (
                vec![Preprocess, Chunk, Adapt, Merge, Enhance, Validate],
                8192,
                Some(DEFAULT_CHUNK_SIZE),
            ),
        };
        Self {
            kind,
            steps,
            max_tokens,
            chunk_size,
        }
    }
}

/// The inputs the decision table looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyInputs {
    pub primary_type: ContentType,
    pub word_count: usize,
    pub complexity_score: f64,
    pub recommendation: ProcessingRecommendation,
}

impl StrategyInputs {
    pub fn from_reports(analysis: &ContentAnalysis, complexity: &ComplexityReport) -> Self {
        Self {
            primary_type: analysis.content_type.primary_type,
            word_count: analysis.metrics.word_count,
            complexity_score: complexity.overall.score,
            recommendation: complexity.overall.processing_strategy,
        }
    }
}

pub fn decide(inputs: &StrategyInputs) -> StrategyKind {
    if inputs.primary_type == ContentType::ReadingComprehension && inputs.word_count > TWO_STEP_MIN_WORDS {
        StrategyKind::TwoStep
    } else if inputs.recommendation == ProcessingRecommendation::MultiStep
        && inputs.word_count >= MULTI_STEP_MIN_WORDS
    {
        StrategyKind::MultiStep
    } else if inputs.complexity_score < SIMPLE_MAX_SCORE && inputs.word_count < SIMPLE_MAX_WORDS {
        StrategyKind::Simple
    } else if inputs.complexity_score < STANDARD_MAX_SCORE && inputs.word_count < STANDARD_MAX_WORDS {
        StrategyKind::Standard
    } else {
        StrategyKind::Chunked
    }
}

pub fn select_strategy(analysis: &ContentAnalysis, complexity: &ComplexityReport) -> ProcessingStrategy {
    ProcessingStrategy::for_kind(decide(&StrategyInputs::from_reports(analysis, complexity)))
}
