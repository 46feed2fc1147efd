//! Pattern tables for content-type, question-type and math detection
//!
//! Families are declared in priority order; ties are resolved in favor of the
//! earlier entry.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Known content families, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    ReadingComprehension,
    Mathematics,
    Science,
    Worksheet,
    Quiz,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::ReadingComprehension,
        ContentType::Mathematics,
        ContentType::Science,
        ContentType::Worksheet,
        ContentType::Quiz,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ReadingComprehension => "reading_comprehension",
            ContentType::Mathematics => "mathematics",
            ContentType::Science => "science",
            ContentType::Worksheet => "worksheet",
            ContentType::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ContentPattern {
    pub content_type: ContentType,
    pub keywords: &'static [&'static str],
    pub structures: Vec<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

pub static CONTENT_PATTERNS: Lazy<Vec<ContentPattern>> = Lazy::new(|| {
    vec![
        ContentPattern {
            content_type: ContentType::ReadingComprehension,
            keywords: &["passage", "story", "text", "reading", "according to"],
            structures: compile(&[
                r"(?i)read the (?:passage|story|text)",
                r"(?i)according to the (?:passage|text|story)",
                r"(?i)in the (?:passage|text|story)",
                r"(?i)the author (?:says|writes|mentions)",
            ]),
        },
        ContentPattern {
            content_type: ContentType::Mathematics,
            keywords: &["solve", "calculate", "equation", "graph", "formula"],
            structures: compile(&[
                r"\d+\s*[+\-×÷*/]\s*\d+",
                r"(?i)solve\s+(?:for\s+)?[a-z]",
                r"(?i)graph\s+the\s+(?:equation|function)",
                r"(?i)find\s+the\s+(?:value|solution)",
            ]),
        },
        ContentPattern {
            content_type: ContentType::Science,
            keywords: &["experiment", "hypothesis", "observe", "conclude", "data"],
            structures: compile(&[
                r"(?i)form\s+a\s+hypothesis",
                r"(?i)conduct\s+(?:an\s+)?experiment",
                r"(?i)record\s+(?:your\s+)?observations",
                r"(?i)what\s+do\s+you\s+conclude",
            ]),
        },
        ContentPattern {
            content_type: ContentType::Worksheet,
            keywords: &["complete", "fill in", "answer", "practice", "exercise"],
            structures: compile(&[
                r"(?m)^\s*\d+[.)]\s+",
                r"(?i)fill\s+in\s+the\s+blank",
                r"(?i)complete\s+the\s+(?:sentence|table|chart)",
                r"(?i)answer\s+the\s+(?:following\s+)?questions",
            ]),
        },
        ContentPattern {
            content_type: ContentType::Quiz,
            keywords: &["test", "quiz", "assessment", "choose", "select"],
            structures: compile(&[
                r"(?m)^\s*[A-D][.)]\s+",
                r"(?i)choose\s+the\s+(?:best\s+)?answer",
                r"(?i)select\s+(?:all\s+that\s+apply|the\s+correct)",
                r"(?i)true\s+or\s+false",
            ]),
        },
    ]
});

/// Question kinds, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
    ShortAnswer,
    Essay,
    TrueFalse,
    Matching,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::FillInBlank => "fill_in_blank",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::Essay => "essay",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Matching => "matching",
        }
    }
}

pub static QUESTION_PATTERNS: Lazy<Vec<(QuestionType, Regex)>> = Lazy::new(|| {
    vec![
        (QuestionType::MultipleChoice, Regex::new(r"(?m)^\s*[A-D][.)]").unwrap()),
        (QuestionType::FillInBlank, Regex::new(r"_{3,}|\(\s*\)|\[\s*\]").unwrap()),
        (QuestionType::ShortAnswer, Regex::new(r"(?m)\?\s*$").unwrap()),
        (
            QuestionType::Essay,
            Regex::new(r"(?i)(explain|describe|analyze|discuss|compare|contrast).*\?").unwrap(),
        ),
        (QuestionType::TrueFalse, Regex::new(r"(?i)(true|false).*\?").unwrap()),
        (QuestionType::Matching, Regex::new(r"(?i)(match|pair|connect).*with").unwrap()),
    ]
});

pub static MATH_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("numbers", Regex::new(r"\b\d+(?:\.\d+)?\b").unwrap()),
        ("operations", Regex::new(r"[+\-×÷*/=<>≤≥]").unwrap()),
        ("fractions", Regex::new(r"\d+/\d+").unwrap()),
        ("percentages", Regex::new(r"\d+%").unwrap()),
        ("equations", Regex::new(r"[a-zA-Z]\s*[=<>]").unwrap()),
        ("coordinates", Regex::new(r"\(\s*[\d\-]+\s*,\s*[\d\-]+\s*\)").unwrap()),
        (
            "measurements",
            Regex::new(r"(?i)\d+\s*(?:cm|mm|m|km|in|ft|yd|mi|g|kg|lb|oz|ml|l|gal)\b").unwrap(),
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(CONTENT_PATTERNS.len(), ContentType::ALL.len());
        for (pattern, expected) in CONTENT_PATTERNS.iter().zip(ContentType::ALL) {
            assert_eq!(pattern.content_type, expected);
            assert_eq!(pattern.structures.len(), 4);
        }
        assert_eq!(QUESTION_PATTERNS.len(), 6);
        assert_eq!(MATH_PATTERNS.len(), 7);
    }

    #[test]
    fn test_measurement_requires_unit_boundary() {
        let (_, re) = &MATH_PATTERNS[6];
        assert!(re.is_match("12 cm long"));
        assert!(!re.is_match("5 minutes"));
    }
}
