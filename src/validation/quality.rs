//! Overall quality: completeness, accuracy, appropriateness, usability and
//! WIDA alignment, each scored from 1.0 down by fixed deductions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

use super::supports::{self, Support};
use super::{ComponentReport, Issue, Priority, Severity};
use crate::adapters::ProficiencyLevel;
use crate::analysis::{text, vocabulary::subject_terms};
use crate::models::AdaptationParams;

pub const WEIGHT: f64 = 0.3;
pub const VALID_SCORE: f64 = 0.7;

const COMPLETENESS_WEIGHT: f64 = 0.25;
const ACCURACY_WEIGHT: f64 = 0.25;
const APPROPRIATENESS_WEIGHT: f64 = 0.2;
const USABILITY_WEIGHT: f64 = 0.15;
const ALIGNMENT_WEIGHT: f64 = 0.15;

const MIN_WORKSHEET_CHARS: usize = 100;
const MIN_GUIDE_CHARS: usize = 50;

/// Matched case-insensitively
const PLACEHOLDERS: &[&str] = &[
    "[content continues]",
    "[insert passage]",
    "...",
    "placeholder",
    "{{CONTENT_PLACEHOLDER}}",
    "[Complete the remaining items]",
];

static COMPLEX_WORD_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\b\w{10,}\b").unwrap(),
        Regex::new(r"\b\w+(?:tion|sion|ment|ance|ence|ity|ness)\b").unwrap(),
        Regex::new(r"(?i)\b(?:analyze|synthesize|evaluate|hypothesis|phenomenon)\b").unwrap(),
    ]
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    pub value: f64,
    pub issues: Vec<Issue>,
}

impl DimensionScore {
    fn start() -> Self {
        Self {
            value: 1.0,
            issues: Vec::new(),
        }
    }

    fn deduct(&mut self, amount: f64, issue: Issue) {
        self.value -= amount;
        self.issues.push(issue);
    }

    fn finish(mut self) -> Self {
        self.value = self.value.max(0.0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityBreakdown {
    pub completeness: DimensionScore,
    pub accuracy: DimensionScore,
    pub appropriateness: DimensionScore,
    pub usability: DimensionScore,
    pub alignment: DimensionScore,
}

impl QualityBreakdown {
    fn weighted(&self) -> [(&'static str, &DimensionScore, f64); 5] {
        [
            ("completeness", &self.completeness, COMPLETENESS_WEIGHT),
            ("accuracy", &self.accuracy, ACCURACY_WEIGHT),
            ("appropriateness", &self.appropriateness, APPROPRIATENESS_WEIGHT),
            ("usability", &self.usability, USABILITY_WEIGHT),
            ("alignment", &self.alignment, ALIGNMENT_WEIGHT),
        ]
    }

    pub fn overall(&self) -> f64 {
        self.weighted().iter().map(|(_, d, w)| d.value * w).sum()
    }
}

/// Measurements behind the dimension scores
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityDetails {
    /// Adapted word count as a percentage of the original
    pub content_preservation: u32,
    pub average_sentence_length: f64,
    pub expected_sentence_length: f64,
    pub complex_vocabulary_count: usize,
    pub format_consistency: f64,
    pub identified_supports: Vec<Support>,
    pub missing_supports: Vec<Support>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRecommendation {
    pub category: &'static str,
    pub priority: Priority,
    pub score: f64,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    #[serde(flatten)]
    pub report: ComponentReport,
    pub breakdown: QualityBreakdown,
    pub details: QualityDetails,
    pub recommendations: Vec<QualityRecommendation>,
}

pub fn validate(worksheet: &str, guide: &str, params: &AdaptationParams) -> QualityReport {
    let level = ProficiencyLevel::resolve(&params.proficiency_level);
    let mut details = QualityDetails::default();

    let breakdown = QualityBreakdown {
        completeness: completeness(worksheet, guide, &params.content, &mut details),
        accuracy: accuracy(worksheet),
        appropriateness: appropriateness(worksheet, level, &mut details),
        usability: usability(worksheet, &mut details),
        alignment: alignment(worksheet, level, &params.subject, &mut details),
    };

    let score = breakdown.overall();
    let issues: Vec<Issue> = breakdown
        .weighted()
        .iter()
        .flat_map(|(_, d, _)| d.issues.iter().cloned())
        .collect();

    QualityReport {
        report: ComponentReport {
            is_valid: score >= VALID_SCORE,
            score,
            weight: WEIGHT,
            summary: summarize(score, issues.len()),
            issues,
        },
        recommendations: recommendations(&breakdown, score),
        breakdown,
        details,
    }
}

fn completeness(worksheet: &str, guide: &str, original: &str, details: &mut QualityDetails) -> DimensionScore {
    let mut score = DimensionScore::start();

    if worksheet.chars().count() < MIN_WORKSHEET_CHARS {
        score.deduct(
            0.5,
            Issue::new(
                "completeness",
                Severity::Critical,
                "Student worksheet is missing or too short",
                "Ensure complete student worksheet is generated",
            ),
        );
    }
    if guide.chars().count() < MIN_GUIDE_CHARS {
        score.deduct(
            0.3,
            Issue::new(
                "completeness",
                Severity::Major,
                "Teacher guide is missing or inadequate",
                "Generate comprehensive teacher guide",
            ),
        );
    }

    let original_words = text::word_count(original);
    let adapted_words = text::word_count(worksheet);
    if (adapted_words as f64) < original_words as f64 * 0.5 {
        score.deduct(
            0.2,
            Issue::new(
                "completeness",
                Severity::Major,
                "Significant content loss detected",
                "Ensure all original content is preserved and adapted",
            ),
        );
    }
    details.content_preservation = if original_words == 0 {
        100
    } else {
        (adapted_words as f64 / original_words as f64 * 100.0).round() as u32
    };

    score.finish()
}

fn accuracy(worksheet: &str) -> DimensionScore {
    let mut score = DimensionScore::start();
    let lowered = worksheet.to_lowercase();

    for placeholder in PLACEHOLDERS {
        if lowered.contains(&placeholder.to_lowercase()) {
            score.deduct(
                0.3,
                Issue::new(
                    "accuracy",
                    Severity::Critical,
                    format!("Contains placeholder text: {}", placeholder),
                    "Remove all placeholder text and provide complete content",
                ),
            );
        }
    }

    if supports::bolded_terms(worksheet).is_empty() {
        score.deduct(
            0.1,
            Issue::new(
                "accuracy",
                Severity::Minor,
                "No vocabulary bolding detected",
                "Bold key vocabulary terms using **term** format",
            ),
        );
    }

    // Only the first break counts here
    if let Some((prev, next)) = supports::numbering_breaks(&supports::numbered_items(worksheet))
        .into_iter()
        .next()
    {
        score.deduct(
            0.1,
            Issue::new(
                "accuracy",
                Severity::Major,
                format!("Numbering error: Found {} followed by {}", prev, next),
                "Fix sequential numbering of questions/items",
            ),
        );
    }

    score.finish()
}

fn appropriateness(worksheet: &str, level: ProficiencyLevel, details: &mut QualityDetails) -> DimensionScore {
    let mut score = DimensionScore::start();
    let sentence_count = text::sentences(worksheet).len();
    let expected = supports::expected_sentence_length(level);
    details.expected_sentence_length = expected;

    if sentence_count > 0 {
        let average = supports::average_sentence_length(worksheet);
        details.average_sentence_length = average;
        if supports::length_deviation(average, expected) > 0.5 {
            score.deduct(
                0.3,
                Issue::new(
                    "appropriateness",
                    Severity::Major,
                    format!(
                        "Average sentence length ({}) not appropriate for {} level",
                        average.round(),
                        level
                    ),
                    format!("Adjust sentence complexity to target ~{} words per sentence", expected),
                ),
            );
        }
    }

    let complex = complex_vocabulary(worksheet);
    details.complex_vocabulary_count = complex.len();
    if complex.len() as f64 > sentence_count as f64 * 0.2 {
        score.deduct(
            0.2,
            Issue::new(
                "appropriateness",
                Severity::Minor,
                "High density of complex vocabulary detected",
                "Simplify vocabulary or provide more definitions",
            ),
        );
    }

    score.finish()
}

/// Distinct long words, nominalizations and academic terms, lowercased
fn complex_vocabulary(worksheet: &str) -> BTreeSet<String> {
    COMPLEX_WORD_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(worksheet).map(|m| m.as_str().to_lowercase()))
        .collect()
}

fn usability(worksheet: &str, details: &mut QualityDetails) -> DimensionScore {
    let mut score = DimensionScore::start();

    if !supports::has_markdown_headers(worksheet) {
        score.deduct(
            0.2,
            Issue::new(
                "usability",
                Severity::Minor,
                "No clear section headers found",
                "Add section headers to improve organization",
            ),
        );
    }
    if !supports::has_instructions(worksheet) {
        score.deduct(
            0.3,
            Issue::new(
                "usability",
                Severity::Major,
                "No clear instructions found",
                "Include clear directions for students",
            ),
        );
    }

    let consistency = supports::format_consistency(worksheet);
    details.format_consistency = consistency;
    if consistency < 0.8 {
        score.deduct(
            0.2,
            Issue::new(
                "usability",
                Severity::Minor,
                "Inconsistent formatting detected",
                "Ensure consistent use of formatting throughout",
            ),
        );
    }

    score.finish()
}

fn alignment(worksheet: &str, level: ProficiencyLevel, subject: &str, details: &mut QualityDetails) -> DimensionScore {
    let mut score = DimensionScore::start();

    let identified = supports::identify_supports(worksheet);
    let missing: Vec<Support> = supports::expected_supports(level)
        .iter()
        .copied()
        .filter(|s| !identified.contains(s))
        .collect();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(Support::as_str).collect();
        score.deduct(
            0.4,
            Issue::new(
                "alignment",
                Severity::Major,
                format!("Missing expected WIDA supports: {}", names.join(", ")),
                "Include appropriate supports for the proficiency level",
            ),
        );
    }
    details.identified_supports = identified;
    details.missing_supports = missing;

    // Subjects without a term table are not judged
    let terms = subject_terms(subject);
    let lowered = worksheet.to_lowercase();
    if !terms.is_empty() && !terms.iter().any(|t| lowered.contains(t)) {
        score.deduct(
            0.3,
            Issue::new(
                "alignment",
                Severity::Major,
                format!("Content doesn't align with {} subject", subject),
                "Ensure content includes subject-specific vocabulary and concepts",
            ),
        );
    }

    score.finish()
}

fn recommendations(breakdown: &QualityBreakdown, overall: f64) -> Vec<QualityRecommendation> {
    let mut out = Vec::new();
    if overall < VALID_SCORE {
        out.push(QualityRecommendation {
            category: "overall",
            priority: Priority::High,
            score: overall,
            suggestions: vec!["Consider regenerating with adjusted parameters".to_string()],
        });
    }

    for (category, dimension, _) in breakdown.weighted() {
        if dimension.value < 0.8 {
            out.push(QualityRecommendation {
                category,
                priority: if dimension.value < 0.6 {
                    Priority::High
                } else {
                    Priority::Medium
                },
                score: dimension.value,
                suggestions: dimension.issues.iter().map(|i| i.suggestion.clone()).collect(),
            });
        }
    }
    out
}

fn summarize(score: f64, issue_count: usize) -> String {
    let percent = (score * 100.0).round();
    if score >= 0.9 {
        format!("Excellent quality ({}%)", percent)
    } else if score >= 0.8 {
        format!("Good quality ({}%)", percent)
    } else if score >= 0.7 {
        format!("Acceptable quality ({}%)", percent)
    } else if score >= 0.6 {
        format!("Needs improvement ({}%) - {} issues found", percent, issue_count)
    } else {
        format!("Poor quality ({}%) - {} issues found", percent, issue_count)
    }
}
