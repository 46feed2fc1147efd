//! Content Analyzer
//!
//! Produces a [`ContentAnalysis`] snapshot of one input text. The six
//! sub-analyses share nothing mutable and are awaited jointly; results are
//! reassembled by field name.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::language::{self, LanguageReport};
use super::patterns::{
    ContentPattern, ContentType, QuestionType, CONTENT_PATTERNS, MATH_PATTERNS, QUESTION_PATTERNS,
};
use super::structure::{self, StructureReport};
use super::text;

const KEYWORD_WEIGHT: f64 = 0.4;
const STRUCTURE_WEIGHT: f64 = 0.6;
const MULTI_TYPE_THRESHOLD: f64 = 0.3;
const MATH_ELEMENT_THRESHOLD: usize = 5;
const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub average_words_per_sentence: f64,
    pub average_sentences_per_paragraph: f64,
    /// Minutes, rounded up
    pub estimated_reading_time: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeScore {
    pub content_type: ContentType,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeReport {
    pub primary_type: ContentType,
    pub confidence: f64,
    /// One entry per family, in declaration order
    pub scores: Vec<ContentTypeScore>,
    pub is_multi_type: bool,
}

impl ContentTypeReport {
    pub fn score(&self, content_type: ContentType) -> f64 {
        self.scores
            .iter()
            .find(|s| s.content_type == content_type)
            .map(|s| s.score)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTypeReport {
    pub counts: Vec<(QuestionType, usize)>,
    pub total_questions: usize,
    pub has_questions: bool,
    pub dominant_type: Option<QuestionType>,
}

impl QuestionTypeReport {
    pub fn count(&self, question_type: QuestionType) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| *t == question_type)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MathReport {
    pub elements: BTreeMap<&'static str, usize>,
    pub total_elements: usize,
    pub is_mathematical: bool,
    pub math_density: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub metrics: BasicMetrics,
    pub structure: StructureReport,
    pub language: LanguageReport,
    pub content_type: ContentTypeReport,
    pub question_types: QuestionTypeReport,
    pub mathematical: MathReport,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one text. Empty text yields an all-zero report.
    pub async fn analyze(&self, content: &str) -> ContentAnalysis {
        let (metrics, structure, language, content_type, question_types, mathematical) = tokio::join!(
            async { basic_metrics(content) },
            async { structure::analyze(content) },
            async { language::analyze(content) },
            async { classify_content_type(content) },
            async { question_types(content) },
            async { math_content(content) },
        );

        ContentAnalysis {
            metrics,
            structure,
            language,
            content_type,
            question_types,
            mathematical,
            analyzed_at: Utc::now(),
        }
    }
}

pub fn basic_metrics(content: &str) -> BasicMetrics {
    let word_count = text::word_count(content);
    let sentence_count = text::sentences(content).len();
    let paragraph_count = text::paragraphs(content).len();

    BasicMetrics {
        word_count,
        sentence_count,
        paragraph_count,
        character_count: content.chars().count(),
        character_count_no_spaces: content.chars().filter(|c| !c.is_whitespace()).count(),
        average_words_per_sentence: word_count as f64 / sentence_count.max(1) as f64,
        average_sentences_per_paragraph: sentence_count as f64 / paragraph_count.max(1) as f64,
        estimated_reading_time: word_count.div_ceil(WORDS_PER_MINUTE),
    }
}

fn pattern_score(content: &str, lower: &str, pattern: &ContentPattern) -> f64 {
    let keyword_hits = pattern.keywords.iter().filter(|k| lower.contains(*k)).count();
    let structure_hits = pattern.structures.iter().filter(|r| r.is_match(content)).count();

    let score = keyword_hits as f64 / pattern.keywords.len() as f64 * KEYWORD_WEIGHT
        + structure_hits as f64 / pattern.structures.len() as f64 * STRUCTURE_WEIGHT;
    score.min(1.0)
}

pub fn classify_content_type(content: &str) -> ContentTypeReport {
    let lower = content.to_lowercase();
    let scores: Vec<ContentTypeScore> = CONTENT_PATTERNS
        .iter()
        .map(|p| ContentTypeScore {
            content_type: p.content_type,
            score: pattern_score(content, &lower, p),
        })
        .collect();

    // Strict comparison keeps the earliest family on ties
    let mut best = &scores[0];
    for candidate in &scores[1..] {
        if candidate.score > best.score {
            best = candidate;
        }
    }

    ContentTypeReport {
        primary_type: best.content_type,
        confidence: best.score,
        is_multi_type: scores.iter().filter(|s| s.score > MULTI_TYPE_THRESHOLD).count() > 1,
        scores,
    }
}

pub fn question_types(content: &str) -> QuestionTypeReport {
    let counts: Vec<(QuestionType, usize)> = QUESTION_PATTERNS
        .iter()
        .map(|(kind, re)| (*kind, re.find_iter(content).count()))
        .collect();
    let total_questions: usize = counts.iter().map(|(_, c)| c).sum();

    let mut dominant: Option<(QuestionType, usize)> = None;
    for &(kind, count) in &counts {
        if count > 0 && dominant.map(|(_, best)| count > best).unwrap_or(true) {
            dominant = Some((kind, count));
        }
    }

    QuestionTypeReport {
        counts,
        total_questions,
        has_questions: total_questions > 0,
        dominant_type: dominant.map(|(kind, _)| kind),
    }
}

pub fn math_content(content: &str) -> MathReport {
    let elements: BTreeMap<&'static str, usize> = MATH_PATTERNS
        .iter()
        .map(|(name, re)| (*name, re.find_iter(content).count()))
        .collect();
    let total_elements: usize = elements.values().sum();

    MathReport {
        total_elements,
        is_mathematical: total_elements > MATH_ELEMENT_THRESHOLD,
        math_density: total_elements as f64 / text::word_count(content).max(1) as f64,
        elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_text_does_not_fail() {
        let analysis = ContentAnalyzer::new().analyze("").await;
        assert_eq!(analysis.metrics.word_count, 0);
        assert_eq!(analysis.metrics.estimated_reading_time, 0);
        assert!(!analysis.question_types.has_questions);
        assert_eq!(analysis.question_types.dominant_type, None);
        // All families score zero; the first declared wins
        assert_eq!(
            analysis.content_type.primary_type,
            ContentType::ReadingComprehension
        );
    }

    #[test]
    fn test_basic_metrics() {
        let words = vec!["word"; 201].join(" ");
        let metrics = basic_metrics(&format!("{}.\n\nSecond paragraph here.", words));
        assert_eq!(metrics.word_count, 204);
        assert_eq!(metrics.sentence_count, 2);
        assert_eq!(metrics.paragraph_count, 2);
        assert_eq!(metrics.estimated_reading_time, 2);
    }

    #[test]
    fn test_reading_comprehension_detected() {
        let report = classify_content_type(
            "Read the passage below. According to the text, why did the story end this way? \
             In the passage, the author says the reading matters.",
        );
        assert_eq!(report.primary_type, ContentType::ReadingComprehension);
        assert!(report.confidence > 0.8);
    }

    #[test]
    fn test_math_detected_and_multi_type() {
        let report = classify_content_type(
            "Solve for x. Calculate 3 + 4 and graph the equation. Find the value.\n\
             1. Complete the table\n2. Answer the following questions for practice",
        );
        assert_eq!(report.primary_type, ContentType::Mathematics);
        assert!(report.score(ContentType::Worksheet) > 0.3);
        assert!(report.is_multi_type);
    }

    #[test]
    fn test_tie_prefers_first_declared_family() {
        // One keyword each for science and quiz
        let report = classify_content_type("data test");
        assert_eq!(report.score(ContentType::Science), report.score(ContentType::Quiz));
        assert_eq!(report.primary_type, ContentType::Science);
    }

    #[test]
    fn test_question_types() {
        let report = question_types(
            "1. What is 2 + 2?\nA. 3\nB. 4\nC. 5\n2. Explain why the sky is blue?\n3. Fill in: ____",
        );
        assert_eq!(report.count(QuestionType::MultipleChoice), 3);
        assert_eq!(report.count(QuestionType::ShortAnswer), 2);
        assert_eq!(report.count(QuestionType::Essay), 1);
        assert_eq!(report.count(QuestionType::FillInBlank), 1);
        assert_eq!(report.dominant_type, Some(QuestionType::MultipleChoice));
    }

    #[test]
    fn test_math_content() {
        let report = math_content("Find 3/4 of 20. Then 15% of 80 = 12. Plot (2, 3). It is 5 cm.");
        assert!(report.is_mathematical);
        assert_eq!(report.elements["fractions"], 1);
        assert_eq!(report.elements["percentages"], 1);
        assert_eq!(report.elements["coordinates"], 1);
        assert_eq!(report.elements["measurements"], 1);
    }
}
