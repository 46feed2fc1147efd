//! Detection helpers shared by the validators: numbering, headers,
//! instructions, list formats and the WIDA support tables.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::adapters::ProficiencyLevel;
use crate::analysis::text;

static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(\d+)\.").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static INSTRUCTIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(directions?|instructions?):").unwrap());
static MARKDOWN_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s+").unwrap());
static CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[ \]").unwrap());
static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap());
static SENTENCE_FRAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{3,}").unwrap());
static VISUAL_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)!\[|\b(?:diagram|picture|image|chart|graphic organizer|illustration|draw)\b").unwrap()
});

static BULLET_FORMATS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?m)^\s*-\s+").unwrap(),
        Regex::new(r"(?m)^\s*\*\s+").unwrap(),
        Regex::new(r"(?m)^\s*•\s+").unwrap(),
    ]
});
static NUMBER_FORMATS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?m)^\s*\d+\.\s+").unwrap(),
        Regex::new(r"(?m)^\s*\d+\)\s+").unwrap(),
    ]
});

/// Support features a worksheet can offer a language learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Support {
    VocabularyHighlighting,
    Checkboxes,
    ClearInstructions,
    NumberedSequence,
    SectionHeaders,
    SentenceFrames,
    VisualSupports,
}

impl Support {
    pub fn as_str(&self) -> &'static str {
        match self {
            Support::VocabularyHighlighting => "vocabulary_highlighting",
            Support::Checkboxes => "checkboxes",
            Support::ClearInstructions => "clear_instructions",
            Support::NumberedSequence => "numbered_sequence",
            Support::SectionHeaders => "section_headers",
            Support::SentenceFrames => "sentence_frames",
            Support::VisualSupports => "visual_supports",
        }
    }
}

pub fn identify_supports(content: &str) -> Vec<Support> {
    let checks = [
        (Support::VocabularyHighlighting, BOLD.is_match(content)),
        (Support::Checkboxes, CHECKBOX.is_match(content)),
        (Support::ClearInstructions, has_instructions(content)),
        (Support::NumberedSequence, NUMBERED_LINE.is_match(content)),
        (Support::SectionHeaders, has_markdown_headers(content)),
        (Support::SentenceFrames, SENTENCE_FRAME.is_match(content)),
        (Support::VisualSupports, VISUAL_CUE.is_match(content)),
    ];
    checks
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(support, _)| support)
        .collect()
}

pub fn expected_supports(level: ProficiencyLevel) -> &'static [Support] {
    use Support::*;
    match level {
        ProficiencyLevel::Entering => &[VocabularyHighlighting, ClearInstructions, VisualSupports],
        ProficiencyLevel::Emerging => &[VocabularyHighlighting, ClearInstructions, SentenceFrames],
        ProficiencyLevel::Developing => &[VocabularyHighlighting, NumberedSequence, SectionHeaders],
        ProficiencyLevel::Expanding => &[VocabularyHighlighting, SectionHeaders],
        ProficiencyLevel::Bridging => &[SectionHeaders],
        ProficiencyLevel::Reaching => &[],
    }
}

/// Target words per sentence for each band
pub fn expected_sentence_length(level: ProficiencyLevel) -> f64 {
    match level {
        ProficiencyLevel::Entering => 8.0,
        ProficiencyLevel::Emerging => 12.0,
        ProficiencyLevel::Developing => 16.0,
        ProficiencyLevel::Expanding => 20.0,
        ProficiencyLevel::Bridging => 24.0,
        ProficiencyLevel::Reaching => 28.0,
    }
}

/// Mean words per sentence; 0 when there are no sentences
pub fn average_sentence_length(content: &str) -> f64 {
    let lengths: Vec<f64> = text::sentences(content)
        .iter()
        .map(|s| text::word_count(s) as f64)
        .collect();
    text::mean(&lengths)
}

/// Relative deviation of `actual` from `expected`
pub fn length_deviation(actual: f64, expected: f64) -> f64 {
    (actual - expected).abs() / expected
}

/// Numbers of `N.` items at the start of lines, in order
pub fn numbered_items(content: &str) -> Vec<u64> {
    NUMBERED_ITEM
        .captures_iter(content)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect()
}

/// Adjacent pairs that are not consecutive
pub fn numbering_breaks(numbers: &[u64]) -> Vec<(u64, u64)> {
    numbers
        .windows(2)
        .filter(|w| w[1] != w[0] + 1)
        .map(|w| (w[0], w[1]))
        .collect()
}

pub fn is_sequential(content: &str) -> bool {
    numbering_breaks(&numbered_items(content)).is_empty()
}

pub fn bolded_terms(content: &str) -> Vec<&str> {
    BOLD.captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

pub fn has_instructions(content: &str) -> bool {
    INSTRUCTIONS.is_match(content)
}

pub fn instructions_position(content: &str) -> Option<usize> {
    INSTRUCTIONS.find(content).map(|m| m.start())
}

pub fn has_markdown_headers(content: &str) -> bool {
    MARKDOWN_HEADER.is_match(content)
}

/// Number of distinct bullet styles and distinct numbering styles in use
pub fn list_format_usage(content: &str) -> (usize, usize) {
    let bullets = BULLET_FORMATS.iter().filter(|r| r.is_match(content)).count();
    let numbers = NUMBER_FORMATS.iter().filter(|r| r.is_match(content)).count();
    (bullets, numbers)
}

/// 1.0 when at most one bullet and one numbering style are used
pub fn format_consistency(content: &str) -> f64 {
    let (bullets, numbers) = list_format_usage(content);
    let extra = bullets.saturating_sub(1) + numbers.saturating_sub(1);
    (1.0 - extra as f64 * 0.2).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_supports() {
        let worksheet = "# Plants\nDirections: Read.\n1. A **root** takes in ___ water.\n[ ] Done\nDraw a picture.";
        let supports = identify_supports(worksheet);
        assert_eq!(
            supports,
            vec![
                Support::VocabularyHighlighting,
                Support::Checkboxes,
                Support::ClearInstructions,
                Support::NumberedSequence,
                Support::SectionHeaders,
                Support::SentenceFrames,
                Support::VisualSupports,
            ]
        );
        assert!(identify_supports("plain text").is_empty());
    }

    #[test]
    fn test_numbering_helpers() {
        let numbers = numbered_items("1. a\n2. b\n 4. c\nnot 5. here");
        assert_eq!(numbers, vec![1, 2, 4]);
        assert_eq!(numbering_breaks(&numbers), vec![(2, 4)]);
        assert!(is_sequential("1. a\n2. b"));
    }

    #[test]
    fn test_format_consistency() {
        assert_eq!(format_consistency("- a\n- b\n1. c"), 1.0);
        assert!((format_consistency("- a\n* b\n1. c\n2) d") - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_expected_tables() {
        assert!(expected_supports(ProficiencyLevel::Reaching).is_empty());
        assert_eq!(expected_sentence_length(ProficiencyLevel::Developing), 16.0);
        assert_eq!(average_sentence_length("One two three. Four five."), 2.5);
    }
}
