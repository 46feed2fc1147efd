//! IEP accommodation adapter

use crate::analysis::{ContentAnalysis, ContentType};
use crate::models::{AdaptationParams, WorksheetLength};

const HEADER: &str = "\n\n**IEP ACCOMMODATION REQUIREMENTS:**\n";
const MAX_CHECKLIST_ITEMS: usize = 6;

struct LengthStrategy {
    target_time: &'static str,
    item_count: &'static str,
    strategy: &'static str,
}

fn length_strategy(length: WorksheetLength) -> LengthStrategy {
    match length {
        WorksheetLength::Short => LengthStrategy {
            target_time: "5-10 minutes",
            item_count: "3-5 items",
            strategy: "Focus on essential concepts only",
        },
        WorksheetLength::Medium => LengthStrategy {
            target_time: "15-25 minutes",
            item_count: "6-12 items",
            strategy: "Balanced coverage with appropriate pacing",
        },
        WorksheetLength::Long => LengthStrategy {
            target_time: "30+ minutes",
            item_count: "13+ items",
            strategy: "Comprehensive coverage with extended practice",
        },
    }
}

/// Prompt block for IEP accommodations. Always starts with the header; each
/// accommodation appends its own lines in a fixed order.
pub fn build_instructions(params: &AdaptationParams) -> String {
    let mut out = String::from(HEADER);

    if params.worksheet_length != WorksheetLength::Medium {
        let s = length_strategy(params.worksheet_length);
        out.push_str(&format!(
            "- **Worksheet Length**: Adjust content for \"{}\" timeframe ({}, approximately {})\n",
            params.worksheet_length.as_str(),
            s.target_time,
            s.item_count
        ));
        out.push_str(&format!("- **Strategy**: {}\n", s.strategy));
    }

    if params.add_student_checklist {
        out.push_str("- **Student Checklist**: Add a \"My Learning Checklist\" section at the top with 4-6 specific steps that match the actual worksheet activities\n");
    }

    if params.use_multiple_choice {
        out.push_str("- **Multiple Choice Format**: Convert open-ended questions to multiple choice with 3-4 answer options where appropriate\n");
        out.push_str("- **Multiple Choice Guidelines**: Ensure one clearly correct answer, plausible distractors, avoid \"all of the above\" or \"none of the above\"\n");
    }

    out
}

/// Checklist items derived from the content, always ending with a review step
pub fn generate_student_checklist(analysis: &ContentAnalysis, params: &AdaptationParams) -> Vec<String> {
    let mut items = Vec::new();

    if analysis.question_types.has_questions {
        items.push("Read all questions carefully before starting".to_string());
        items.push(format!(
            "Answer all {} questions",
            analysis.question_types.total_questions
        ));
    }
    if analysis.content_type.primary_type == ContentType::ReadingComprehension {
        items.push("Read the passage twice before answering questions".to_string());
        items.push("Highlight or underline key information".to_string());
    }
    if analysis.mathematical.is_mathematical {
        items.push("Show your work for all problems".to_string());
        items.push("Check your answers".to_string());
    }
    match params.subject.trim() {
        "Mathematics" => items.push("Use the correct units in your answers".to_string()),
        "Science" => items.push("Use scientific vocabulary in your responses".to_string()),
        _ => {}
    }

    items.truncate(MAX_CHECKLIST_ITEMS - 1);
    items.push("Review all my work before finishing".to_string());
    items
}

/// Content-derived checklist steps for the IEP block. Empty unless the
/// checklist accommodation is requested.
pub fn build_checklist_hint(analysis: &ContentAnalysis, params: &AdaptationParams) -> String {
    if !params.add_student_checklist {
        return String::new();
    }
    format!(
        "- **Suggested Checklist Steps**: {}\n",
        generate_student_checklist(analysis, params).join("; ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ContentAnalyzer;

    fn params() -> AdaptationParams {
        AdaptationParams::new("content", "Mathematics", "Level 2")
    }

    #[test]
    fn test_defaults_yield_header_only() {
        assert_eq!(
            build_instructions(&params()),
            "\n\n**IEP ACCOMMODATION REQUIREMENTS:**\n"
        );
    }

    #[test]
    fn test_short_length_lines() {
        let mut p = params();
        p.worksheet_length = WorksheetLength::Short;
        let out = build_instructions(&p);
        assert!(out.contains(
            "- **Worksheet Length**: Adjust content for \"Short\" timeframe (5-10 minutes, approximately 3-5 items)\n"
        ));
        assert!(out.contains("- **Strategy**: Focus on essential concepts only\n"));
    }

    #[test]
    fn test_all_flags_order_and_idempotence() {
        let mut p = params();
        p.worksheet_length = WorksheetLength::Long;
        p.add_student_checklist = true;
        p.use_multiple_choice = true;
        let first = build_instructions(&p);
        assert_eq!(first, build_instructions(&p));

        let length = first.find("Worksheet Length").unwrap();
        let checklist = first.find("Student Checklist").unwrap();
        let mc = first.find("Multiple Choice Format").unwrap();
        assert!(length < checklist && checklist < mc);
        assert_eq!(first.lines().filter(|l| l.starts_with("- ")).count(), 5);
    }

    #[tokio::test]
    async fn test_checklist_capped_and_ends_with_review() {
        let analysis = ContentAnalyzer::new()
            .analyze(
                "Read the passage. According to the text, what happened?\n\
                 1. What is 3 + 4 = ?\n2. What is 10 - 2 = ?\n3. Measure 5 cm.",
            )
            .await;
        let checklist = generate_student_checklist(&analysis, &params());
        assert!(checklist.len() <= MAX_CHECKLIST_ITEMS);
        assert_eq!(
            checklist.last().map(String::as_str),
            Some("Review all my work before finishing")
        );
        assert_eq!(checklist[0], "Read all questions carefully before starting");
    }

    #[tokio::test]
    async fn test_checklist_hint_only_when_requested() {
        let analysis = ContentAnalyzer::new().analyze("1. What is 3 + 4 = ?").await;
        let mut p = params();
        assert_eq!(build_checklist_hint(&analysis, &p), "");

        p.add_student_checklist = true;
        let hint = build_checklist_hint(&analysis, &p);
        assert!(hint.starts_with("- **Suggested Checklist Steps**: "));
        assert!(hint.ends_with("Review all my work before finishing\n"));
    }
}
