//! Sentence-level and syntactic language complexity

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use super::text;
use super::vocabulary::ACADEMIC_VOCABULARY;

const SUBORDINATING: &[&str] = &["because", "although", "since", "while", "whereas", "unless"];
const COORDINATING: &[&str] = &["and", "but", "or", "nor", "for", "so", "yet"];
const TRANSITIONS: &[&str] = &["however", "therefore", "moreover", "furthermore", "consequently"];
const NOMINALIZATION_SUFFIXES: &[&str] = &["tion", "sion", "ment", "ance", "ence", "ity", "ness"];

static PASSIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:was|were|is|are|am|be|been|being)\s+\w+ed\b").unwrap());
static CONDITIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bif\s+.*\s+(?:would|could|should|might)\b").unwrap());
static MODAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:might|could|should|would|may|can|must|ought)\b").unwrap()
});

/// Five-band complexity label shared by language and complexity scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    VerySimple,
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl ComplexityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::VerySimple => "very_simple",
            ComplexityLevel::Simple => "simple",
            ComplexityLevel::Moderate => "moderate",
            ComplexityLevel::Complex => "complex",
            ComplexityLevel::VeryComplex => "very_complex",
        }
    }

    /// Band a score given the four ascending cut points
    pub fn from_score(score: f64, cuts: [f64; 4]) -> Self {
        if score < cuts[0] {
            ComplexityLevel::VerySimple
        } else if score < cuts[1] {
            ComplexityLevel::Simple
        } else if score < cuts[2] {
            ComplexityLevel::Moderate
        } else if score < cuts[3] {
            ComplexityLevel::Complex
        } else {
            ComplexityLevel::VeryComplex
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceComplexity {
    pub average_words_per_sentence: f64,
    pub average_clauses_per_sentence: f64,
    pub average_complexity_score: f64,
    /// Coefficient of variation of sentence lengths
    pub sentence_variety: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntacticMarkers {
    pub passive_voice_count: usize,
    pub conditional_count: usize,
    pub modal_verb_count: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageReport {
    pub sentence_complexity: SentenceComplexity,
    pub lexical_diversity: f64,
    pub average_word_length: f64,
    pub academic_word_count: usize,
    pub nominalization_count: usize,
    pub syntactic: SyntacticMarkers,
    pub transitional_phrases: Vec<String>,
    pub coordinating_conjunctions: Vec<String>,
    pub cohesion_score: f64,
    pub overall_score: f64,
    pub level: ComplexityLevel,
    pub recommendations: Vec<String>,
}

pub fn analyze(content: &str) -> LanguageReport {
    let sentences = text::sentences(content);
    let words = text::clean_words(content);

    let sentence_complexity = sentence_complexity(&sentences);
    let syntactic = syntactic_markers(content);

    let (lexical_diversity, average_word_length) = if words.is_empty() {
        (0.0, 0.0)
    } else {
        let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
        (
            unique.len() as f64 / words.len() as f64,
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64,
        )
    };
    let academic_word_count = words
        .iter()
        .filter(|w| ACADEMIC_VOCABULARY.iter().any(|a| w.contains(a)))
        .count();
    let nominalization_count = words
        .iter()
        .filter(|w| NOMINALIZATION_SUFFIXES.iter().any(|s| w.ends_with(s)))
        .count();

    let word_set: HashSet<&str> = words.iter().map(String::as_str).collect();
    let lower = content.to_lowercase();
    let transitional_phrases: Vec<String> = TRANSITIONS
        .iter()
        .filter(|t| lower.contains(*t))
        .map(|t| t.to_string())
        .collect();
    let coordinating_conjunctions: Vec<String> = COORDINATING
        .iter()
        .filter(|c| word_set.contains(*c))
        .map(|c| c.to_string())
        .collect();
    let cohesion_score =
        transitional_phrases.len() as f64 * 0.4 + coordinating_conjunctions.len() as f64 * 0.2;

    let overall_score = sentence_complexity.average_complexity_score * 0.4
        + lexical_diversity * 10.0 * 0.3
        + syntactic.score * 0.3;
    let level = ComplexityLevel::from_score(overall_score, [2.0, 4.0, 6.0, 8.0]);

    let mut recommendations = Vec::new();
    if sentence_complexity.average_words_per_sentence > 20.0 {
        recommendations.push("Consider breaking long sentences into shorter ones".to_string());
    }
    if !words.is_empty() && academic_word_count as f64 > words.len() as f64 * 0.1 {
        recommendations.push("High academic vocabulary density - provide definitions".to_string());
    }
    if overall_score > 6.0 {
        recommendations.push("Language complexity is high - consider simplification".to_string());
    }

    LanguageReport {
        sentence_complexity,
        lexical_diversity,
        average_word_length,
        academic_word_count,
        nominalization_count,
        syntactic,
        transitional_phrases,
        coordinating_conjunctions,
        cohesion_score,
        overall_score,
        level,
        recommendations,
    }
}

fn sentence_complexity(sentences: &[&str]) -> SentenceComplexity {
    let mut lengths = Vec::with_capacity(sentences.len());
    let mut clauses = Vec::with_capacity(sentences.len());
    let mut scores = Vec::with_capacity(sentences.len());

    for sentence in sentences {
        let lower = sentence.to_lowercase();
        let word_count = text::word_count(sentence) as f64;
        let clause_count = text::clause_count(sentence) as f64;
        let subordinating = SUBORDINATING
            .iter()
            .filter(|c| lower.split_whitespace().any(|w| w.trim_matches(|ch: char| !ch.is_alphanumeric()) == **c))
            .count() as f64;

        lengths.push(word_count);
        clauses.push(clause_count);
        scores.push(word_count * 0.1 + clause_count * 0.3 + subordinating * 0.5);
    }

    SentenceComplexity {
        average_words_per_sentence: text::mean(&lengths),
        average_clauses_per_sentence: text::mean(&clauses),
        average_complexity_score: text::mean(&scores),
        sentence_variety: text::coefficient_of_variation(&lengths),
    }
}

fn syntactic_markers(content: &str) -> SyntacticMarkers {
    let passive_voice_count = PASSIVE.find_iter(content).count();
    let conditional_count = CONDITIONAL.find_iter(content).count();
    let modal_verb_count = MODAL.find_iter(content).count();

    SyntacticMarkers {
        passive_voice_count,
        conditional_count,
        modal_verb_count,
        score: passive_voice_count as f64 * 0.3
            + conditional_count as f64 * 0.4
            + modal_verb_count as f64 * 0.2,
    }
}
