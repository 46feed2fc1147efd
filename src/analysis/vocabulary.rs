//! Vocabulary complexity and subject-term lookup

use serde::Serialize;
use std::collections::HashSet;

use super::text;

/// Academic word markers (substring match on cleaned words)
pub const ACADEMIC_VOCABULARY: &[&str] = &[
    "analyze", "synthesize", "evaluate", "compare", "contrast", "justify", "interpret",
    "infer", "hypothes", "significan", "establish", "principle", "concept", "theory",
    "structure", "function", "process", "factor", "method", "evidence", "assess",
    "derive", "indicate", "require", "constitute",
];

/// Core terms expected in adapted material for a subject
pub fn subject_terms(subject: &str) -> &'static [&'static str] {
    match subject.trim() {
        "Mathematics" | "Math" => &["equation", "solve", "calculate", "graph", "number", "problem"],
        "Science" => &["experiment", "hypothesis", "observe", "data", "conclusion", "analysis"],
        "English Language Arts" | "ELA" => &["character", "plot", "theme", "evidence", "analyze", "text"],
        "Social Studies" | "History" => &["culture", "government", "history", "society", "geography", "community"],
        _ => &[],
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyReport {
    pub total_words: usize,
    pub unique_words: usize,
    pub lexical_diversity: f64,
    pub average_word_length: f64,
    pub long_words: usize,
    pub polysyllabic_ratio: f64,
    pub academic_word_count: usize,
    pub subject_term_count: usize,
    /// Grade-like difficulty estimate on a 0-20 scale
    pub complexity_score: f64,
}

pub fn analyze(content: &str, subject: Option<&str>) -> VocabularyReport {
    let words = text::clean_words(content);
    if words.is_empty() {
        return VocabularyReport {
            total_words: 0,
            unique_words: 0,
            lexical_diversity: 0.0,
            average_word_length: 0.0,
            long_words: 0,
            polysyllabic_ratio: 0.0,
            academic_word_count: 0,
            subject_term_count: 0,
            complexity_score: 0.0,
        };
    }

    let total = words.len() as f64;
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    let average_word_length = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / total;
    let long_words = words.iter().filter(|w| w.chars().count() >= 7).count();
    let polysyllabic = words.iter().filter(|w| text::count_syllables(w) >= 3).count();
    let academic_word_count = words
        .iter()
        .filter(|w| ACADEMIC_VOCABULARY.iter().any(|a| w.contains(a)))
        .count();
    let terms = subject.map(subject_terms).unwrap_or(&[]);
    let subject_term_count = words
        .iter()
        .filter(|w| terms.iter().any(|t| w.starts_with(t)))
        .count();

    let polysyllabic_ratio = polysyllabic as f64 / total;
    let academic_ratio = academic_word_count as f64 / total;
    let subject_ratio = subject_term_count as f64 / total;

    let complexity_score = ((average_word_length - 3.0).max(0.0) * 2.0
        + polysyllabic_ratio * 25.0
        + academic_ratio * 40.0
        + subject_ratio * 20.0)
        .min(20.0);

    VocabularyReport {
        total_words: words.len(),
        unique_words: unique.len(),
        lexical_diversity: unique.len() as f64 / total,
        average_word_length,
        long_words,
        polysyllabic_ratio,
        academic_word_count,
        subject_term_count,
        complexity_score,
    }
}
