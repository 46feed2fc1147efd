//! WIDA compliance: level-appropriate supports, subject language and
//! sentence length for the requested proficiency band.

use serde::Serialize;

use super::supports::{self, Support};
use super::{ComponentReport, Issue, Severity};
use crate::adapters::ProficiencyLevel;
use crate::analysis::{text, vocabulary::subject_terms};
use crate::models::AdaptationParams;

pub const WEIGHT: f64 = 0.2;
pub const VALID_SCORE: f64 = 0.7;

const SUPPORT_SHARE: f64 = 0.6;
const SUBJECT_SHARE: f64 = 0.2;
const SENTENCE_SHARE: f64 = 0.2;

/// Deviation from the target length tolerated before the fit starts to drop
const LENGTH_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidaReport {
    #[serde(flatten)]
    pub report: ComponentReport,
    pub level: ProficiencyLevel,
    pub identified_supports: Vec<Support>,
    pub expected_supports: Vec<Support>,
    pub missing_supports: Vec<Support>,
    pub subject_aligned: bool,
    pub average_sentence_length: f64,
    pub expected_sentence_length: f64,
}

/// Share of expected supports present; 1.0 when the level expects none
fn supported_fraction(expected: &[Support], missing: &[Support]) -> f64 {
    if expected.is_empty() {
        1.0
    } else {
        (expected.len() - missing.len()) as f64 / expected.len() as f64
    }
}

/// 1.0 inside the tolerance band, falling linearly to 0 at twice the tolerance
fn sentence_fit(deviation: f64) -> f64 {
    (1.0 - (deviation - LENGTH_TOLERANCE).max(0.0) / LENGTH_TOLERANCE).clamp(0.0, 1.0)
}

pub fn validate(worksheet: &str, params: &AdaptationParams) -> WidaReport {
    let level = ProficiencyLevel::resolve(&params.proficiency_level);
    let mut issues = Vec::new();

    let identified = supports::identify_supports(worksheet);
    let expected = supports::expected_supports(level).to_vec();
    let missing: Vec<Support> = expected.iter().copied().filter(|s| !identified.contains(s)).collect();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(Support::as_str).collect();
        issues.push(Issue::new(
            "wida_supports",
            Severity::Major,
            format!("Missing supports expected at the {} level: {}", level, names.join(", ")),
            "Add the scaffolds expected for this proficiency level",
        ));
    }

    let terms = subject_terms(&params.subject);
    let lowered = worksheet.to_lowercase();
    let subject_aligned = terms.is_empty() || terms.iter().any(|t| lowered.contains(t));
    if !subject_aligned {
        issues.push(Issue::new(
            "wida_subject",
            Severity::Major,
            format!("No {} language found", params.subject),
            "Use subject-specific vocabulary from the original material",
        ));
    }

    let expected_length = supports::expected_sentence_length(level);
    let (average, fit) = if text::sentences(worksheet).is_empty() {
        (0.0, 0.0)
    } else {
        let average = supports::average_sentence_length(worksheet);
        (average, sentence_fit(supports::length_deviation(average, expected_length)))
    };
    if fit < 1.0 {
        issues.push(Issue::new(
            "wida_sentence_length",
            Severity::Minor,
            format!(
                "Average sentence length ({}) is outside the {} range",
                average.round(),
                level
            ),
            format!("Aim for about {} words per sentence", expected_length),
        ));
    }

    let score = SUPPORT_SHARE * supported_fraction(&expected, &missing)
        + SUBJECT_SHARE * if subject_aligned { 1.0 } else { 0.0 }
        + SENTENCE_SHARE * fit;

    let summary = format!(
        "{} level: {}/{} expected supports present",
        level.label(),
        expected.len() - missing.len(),
        expected.len()
    );

    WidaReport {
        report: ComponentReport {
            is_valid: score >= VALID_SCORE,
            score,
            weight: WEIGHT,
            issues,
            summary,
        },
        level,
        identified_supports: identified,
        expected_supports: expected,
        missing_supports: missing,
        subject_aligned,
        average_sentence_length: average,
        expected_sentence_length: expected_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_fit_band() {
        assert_eq!(sentence_fit(0.0), 1.0);
        assert_eq!(sentence_fit(0.5), 1.0);
        assert!((sentence_fit(0.75) - 0.5).abs() < 1e-9);
        assert_eq!(sentence_fit(1.5), 0.0);
    }

    #[test]
    fn test_entering_worksheet_with_all_supports() {
        // eight words per sentence
        let worksheet = "## Plants\n\
Directions: Look at the picture of the plant.\n\
A **root** takes water from the soil below.\n\
The plant needs water and sun to grow.";
        let params = AdaptationParams::new("x", "Science", "entering");
        let result = validate(worksheet, &params);

        assert!(result.missing_supports.is_empty());
        assert_eq!(result.level, ProficiencyLevel::Entering);
        // "Science" terms are absent
        assert!(!result.subject_aligned);
        assert!((result.report.score - 0.8).abs() < 1e-9, "{}", result.report.score);
        assert!(result.report.is_valid);
    }

    #[test]
    fn test_reaching_expects_no_supports() {
        let sentence = "Students observe how the data from each experiment supports a clear conclusion about energy transfer in closed systems today.";
        let worksheet = format!("{} {}", sentence, sentence);
        let params = AdaptationParams::new("x", "Science", "Level 6");
        let result = validate(&worksheet, &params);

        assert!(result.expected_supports.is_empty());
        assert!(result.subject_aligned);
        assert!(result.report.issues.is_empty(), "{:?}", result.report.issues);
        assert!((result.report.score - 1.0).abs() < 1e-9);
        assert_eq!(result.report.summary, "Reaching level: 0/0 expected supports present");
    }

    #[test]
    fn test_missing_supports_fail() {
        let params = AdaptationParams::new("x", "Mathematics", "emerging");
        let result = validate("Solve the number problem now please.", &params);
        assert_eq!(
            result.missing_supports,
            vec![
                Support::VocabularyHighlighting,
                Support::ClearInstructions,
                Support::SentenceFrames
            ]
        );
        assert!(!result.report.is_valid);
    }
}
