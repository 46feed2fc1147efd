//! Vocabulary integration: highlighted terms, definitions and density

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use super::supports;
use super::{ComponentReport, Issue, Severity};
use crate::analysis::text;

pub const WEIGHT: f64 = 0.25;
pub const VALID_SCORE: f64 = 0.7;

static DEFINITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.+):\s*(.+)$").unwrap());
static ACADEMIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:analyze|synthesize|evaluate|compare|contrast|explain|describe|identify|classify|summarize)\b")
        .unwrap()
});
static VOCABULARY_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:key\s+)?vocabulary|important\s+terms").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyStats {
    pub total_words: usize,
    pub bolded_terms: usize,
    pub unique_bolded_terms: usize,
    pub definitions: usize,
    pub academic_terms: usize,
    /// Bolded terms per hundred words
    pub vocabulary_density: f64,
    pub has_vocabulary_section: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyIntegrationReport {
    #[serde(flatten)]
    pub report: ComponentReport,
    pub analysis: VocabularyStats,
}

pub fn analyze(worksheet: &str) -> VocabularyStats {
    let bolded = supports::bolded_terms(worksheet);
    let unique: HashSet<String> = bolded.iter().map(|t| t.to_lowercase()).collect();
    let total_words = text::word_count(worksheet);

    VocabularyStats {
        total_words,
        bolded_terms: bolded.len(),
        unique_bolded_terms: unique.len(),
        definitions: DEFINITION.find_iter(worksheet).count(),
        academic_terms: ACADEMIC.find_iter(worksheet).count(),
        vocabulary_density: bolded.len() as f64 / (total_words as f64 / 100.0).max(1.0),
        has_vocabulary_section: VOCABULARY_SECTION.is_match(worksheet),
    }
}

pub fn score(stats: &VocabularyStats) -> f64 {
    let mut score = 0.0;
    if stats.bolded_terms > 0 {
        score += 0.4;
    }
    if stats.has_vocabulary_section {
        score += 0.2;
    }
    if stats.definitions > 0 {
        score += 0.2;
    }

    if (2.0..=8.0).contains(&stats.vocabulary_density) {
        score += 0.2;
    } else if stats.vocabulary_density > 0.0 {
        score += 0.1;
    }
    f64::min(score, 1.0)
}

fn issues(stats: &VocabularyStats) -> Vec<Issue> {
    let mut issues = Vec::new();

    if stats.bolded_terms == 0 {
        issues.push(Issue::new(
            "vocabulary",
            Severity::Major,
            "No vocabulary terms are bolded or highlighted",
            "Bold key vocabulary terms using **term** format",
        ));
    }
    if stats.vocabulary_density < 1.0 {
        issues.push(Issue::new(
            "vocabulary",
            Severity::Minor,
            "Low vocabulary density - may need more key terms highlighted",
            "Consider highlighting more subject-specific vocabulary",
        ));
    }
    if stats.vocabulary_density > 10.0 {
        issues.push(Issue::new(
            "vocabulary",
            Severity::Minor,
            "High vocabulary density - may overwhelm students",
            "Consider reducing the number of highlighted terms",
        ));
    }
    if !stats.has_vocabulary_section && stats.bolded_terms > 5 {
        issues.push(Issue::new(
            "vocabulary",
            Severity::Minor,
            "Many vocabulary terms but no vocabulary section",
            "Consider adding a \"Key Vocabulary\" section with definitions",
        ));
    }
    issues
}

fn summarize(stats: &VocabularyStats, score: f64) -> String {
    let label = if score >= 0.8 {
        "Excellent"
    } else if score >= 0.7 {
        "Good"
    } else if score >= 0.5 {
        "Adequate"
    } else {
        "Insufficient"
    };
    format!(
        "{} vocabulary support - {} unique vocabulary terms highlighted",
        label, stats.unique_bolded_terms
    )
}

pub fn validate(worksheet: &str) -> VocabularyIntegrationReport {
    let stats = analyze(worksheet);
    let score = score(&stats);

    VocabularyIntegrationReport {
        report: ComponentReport {
            is_valid: score >= VALID_SCORE,
            score,
            weight: WEIGHT,
            issues: issues(&stats),
            summary: summarize(&stats, score),
        },
        analysis: stats,
    }
}
