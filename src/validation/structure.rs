//! Structural integrity: headers, numbering, instructions, flow and list formats

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::supports;
use super::{ComponentReport, Issue, Severity};

pub const WEIGHT: f64 = 0.2;
pub const VALID_SCORE: f64 = 0.7;

static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s+|\*\*[^*]+\*\*\s*$").unwrap());
static QUESTION_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\s+.+\?").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Headers,
    SequentialNumbering,
    Instructions,
    LogicalFlow,
    ConsistentFormatting,
}

impl Check {
    const ALL: [Check; 5] = [
        Check::Headers,
        Check::SequentialNumbering,
        Check::Instructions,
        Check::LogicalFlow,
        Check::ConsistentFormatting,
    ];

    /// Weight in tenths so the sum stays exact
    fn tenths(&self) -> u32 {
        match self {
            Check::Headers => 2,
            Check::SequentialNumbering => 3,
            Check::Instructions => 2,
            Check::LogicalFlow => 2,
            Check::ConsistentFormatting => 1,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Check::Headers => "No section headers found",
            Check::SequentialNumbering => "Numbering sequence issues detected",
            Check::Instructions => "No clear instructions provided",
            Check::LogicalFlow => "Content organization could be improved",
            Check::ConsistentFormatting => "Inconsistent formatting detected",
        }
    }

    fn suggestion(&self) -> &'static str {
        match self {
            Check::Headers => "Add clear section headers to organize content",
            Check::SequentialNumbering => "Ensure questions are numbered sequentially (1, 2, 3...)",
            Check::Instructions => "Include clear directions for students",
            Check::LogicalFlow => "Reorganize content with instructions before activities",
            Check::ConsistentFormatting => "Use consistent formatting for similar elements",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureChecks {
    pub has_headers: bool,
    pub has_sequential_numbering: bool,
    pub has_instructions: bool,
    pub has_logical_flow: bool,
    pub has_consistent_formatting: bool,
}

impl StructureChecks {
    pub fn run(worksheet: &str) -> Self {
        let (bullets, numbers) = supports::list_format_usage(worksheet);
        Self {
            has_headers: HEADER.is_match(worksheet),
            has_sequential_numbering: supports::is_sequential(worksheet),
            has_instructions: supports::has_instructions(worksheet),
            has_logical_flow: has_logical_flow(worksheet),
            has_consistent_formatting: bullets <= 1 && numbers <= 1,
        }
    }

    fn passed(&self, check: Check) -> bool {
        match check {
            Check::Headers => self.has_headers,
            Check::SequentialNumbering => self.has_sequential_numbering,
            Check::Instructions => self.has_instructions,
            Check::LogicalFlow => self.has_logical_flow,
            Check::ConsistentFormatting => self.has_consistent_formatting,
        }
    }
}

/// Instructions, when present, come before the first numbered question
fn has_logical_flow(worksheet: &str) -> bool {
    match (
        supports::instructions_position(worksheet),
        QUESTION_ITEM.find(worksheet).map(|m| m.start()),
    ) {
        (Some(instructions), Some(question)) => instructions < question,
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureReport {
    #[serde(flatten)]
    pub report: ComponentReport,
    pub checks: StructureChecks,
}

pub fn validate(worksheet: &str) -> StructureReport {
    let checks = StructureChecks::run(worksheet);

    let tenths: u32 = Check::ALL
        .iter()
        .filter(|c| checks.passed(**c))
        .map(Check::tenths)
        .sum();
    let score = f64::from(tenths) / 10.0;

    let issues: Vec<Issue> = Check::ALL
        .iter()
        .filter(|c| !checks.passed(**c))
        .map(|c| Issue::new("structure", Severity::Major, c.message(), c.suggestion()))
        .collect();

    let summary = if score >= 0.9 {
        "Excellent structure and organization".to_string()
    } else if score >= 0.8 {
        "Good structure with minor issues".to_string()
    } else if score >= 0.7 {
        "Acceptable structure".to_string()
    } else {
        format!("Structure needs improvement - {} issues found", issues.len())
    };

    StructureReport {
        report: ComponentReport {
            is_valid: score >= VALID_SCORE,
            score,
            weight: WEIGHT,
            issues,
            summary,
        },
        checks,
    }
}
