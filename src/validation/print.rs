//! Print readiness: placeholders, numbering, glyphs and missing passages

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use super::supports;
use super::{ComponentReport, Issue, Severity};

pub const WEIGHT: f64 = 0.3;

/// Text a generator leaves behind instead of real content
pub const PLACEHOLDERS: &[&str] = &[
    "[Original passage preserved exactly as written]",
    "[Content continues...]",
    "...",
    "[Add more questions here]",
    "[Insert passage here]",
    "[Passage text here]",
    "[Complete the remaining items]",
    "[Insert full passage text here]",
    "[Include complete passage]",
    "[Full text goes here]",
    "[Replace with actual passage]",
    "{{CONTENT_PLACEHOLDER}}",
    "{{READING_PASSAGE_PLACEHOLDER}}",
];

/// Glyphs that render inconsistently on paper
pub const PROBLEM_GLYPHS: &[char] = &['□', '✓', '○', '●', '◯', '◉'];

const PASSAGE_MIN_CHARS: usize = 100;

static READING_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)reading passage|passage|story|text to read").unwrap());
static PASSAGE_QUESTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)according to the passage|in the text|the author|the story").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintReport {
    #[serde(flatten)]
    pub report: ComponentReport,
    pub auto_fixable: bool,
}

pub fn validate(worksheet: &str) -> PrintReport {
    let mut issues = placeholder_issues(worksheet);
    issues.extend(numbering_issues(worksheet));
    issues.extend(glyph_issues(worksheet));
    issues.extend(missing_passage_issue(worksheet));

    let report = ComponentReport {
        is_valid: !issues.iter().any(|i| i.severity == Severity::Critical),
        score: score(&issues),
        weight: WEIGHT,
        summary: String::new(),
        issues,
    };
    let summary = summarize(&report);
    let auto_fixable = report.issues.iter().any(|i| i.auto_fixable);

    PrintReport {
        report: ComponentReport { summary, ..report },
        auto_fixable,
    }
}

fn placeholder_issues(worksheet: &str) -> Vec<Issue> {
    PLACEHOLDERS
        .iter()
        .filter_map(|placeholder| {
            let location = worksheet.find(placeholder)?;
            Some(
                Issue::new(
                    "placeholder",
                    Severity::Critical,
                    format!("Contains placeholder: {}", placeholder),
                    "Remove or replace placeholder with actual content",
                )
                .auto_fixable()
                .at(location),
            )
        })
        .collect()
}

fn numbering_issues(worksheet: &str) -> Vec<Issue> {
    let numbers = supports::numbered_items(worksheet);
    let mut issues: Vec<Issue> = supports::numbering_breaks(&numbers)
        .into_iter()
        .map(|(prev, next)| {
            Issue::new(
                "numbering",
                Severity::Major,
                format!("Numbering error: Found {} followed by {}", prev, next),
                "Fix sequential numbering",
            )
            .auto_fixable()
        })
        .collect();

    let mut seen = HashSet::new();
    for n in numbers {
        if !seen.insert(n) {
            issues.push(
                Issue::new(
                    "numbering",
                    Severity::Major,
                    format!("Duplicate number: {}", n),
                    "Remove duplicate numbering",
                )
                .auto_fixable(),
            );
        }
    }
    issues
}

fn glyph_issues(worksheet: &str) -> Vec<Issue> {
    PROBLEM_GLYPHS
        .iter()
        .filter_map(|glyph| {
            let location = worksheet.find(*glyph)?;
            Some(
                Issue::new(
                    "formatting",
                    Severity::Minor,
                    format!("Contains problematic character: {}", glyph),
                    format!("Replace {} with standard formatting", glyph),
                )
                .auto_fixable()
                .at(location),
            )
        })
        .collect()
}

/// A reading section whose questions point at a passage that is not there
fn missing_passage_issue(worksheet: &str) -> Option<Issue> {
    if !READING_SECTION.is_match(worksheet) && !PASSAGE_QUESTIONS.is_match(worksheet) {
        return None;
    }

    let has_passage = worksheet.lines().any(|line| {
        line.trim().chars().count() > PASSAGE_MIN_CHARS
            && !line.contains('#')
            && !line.contains('*')
            && !line.contains('?')
            && !["Answer", "Question", "Direction"].iter().any(|w| line.contains(w))
    });
    if has_passage {
        return None;
    }

    Some(Issue::new(
        "content",
        Severity::Critical,
        "Reading comprehension worksheet missing the actual reading passage",
        "Ensure the complete reading passage is included",
    ))
}

/// 1.0 less a fixed deduction per finding
fn score(issues: &[Issue]) -> f64 {
    let deductions: f64 = issues
        .iter()
        .map(|i| match i.severity {
            Severity::Critical => 0.5,
            Severity::Major => 0.2,
            Severity::Minor => 0.1,
        })
        .sum();
    (1.0 - deductions).max(0.0)
}

fn summarize(report: &ComponentReport) -> String {
    if report.issues.is_empty() {
        return "Content is print-ready".to_string();
    }
    let mut summary = format!("Found {} print-readiness issue(s)", report.issues.len());
    for severity in [Severity::Critical, Severity::Major, Severity::Minor] {
        let n = report.count(severity);
        if n > 0 {
            summary.push_str(&format!(" ({} {})", n, severity.as_str()));
        }
    }
    summary
}
