//! Low-level text splitting shared by the analyzers and validators

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static CLAUSE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;:]").unwrap());
static VOWEL_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[aeiouy]+").unwrap());

/// Whitespace-delimited tokens
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercased tokens with punctuation stripped, empties dropped
pub fn clean_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Sentences split on terminal punctuation, trimmed, blanks removed
pub fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Blank-line separated paragraphs, trimmed, blanks removed
pub fn paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Comma/semicolon/colon delimited segments of one sentence
pub fn clause_count(sentence: &str) -> usize {
    CLAUSE_SPLIT.split(sentence).count()
}

/// Vowel-group syllable estimate. Short words count as one syllable and a
/// trailing silent `e` is dropped.
pub fn count_syllables(word: &str) -> usize {
    let word: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if word.is_empty() {
        return 0;
    }
    if word.len() <= 3 {
        return 1;
    }

    let mut groups = VOWEL_GROUP.find_iter(&word).count();
    if word.ends_with('e') && groups > 1 {
        groups -= 1;
    }
    groups.max(1)
}

/// Mean of a slice, zero when empty
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Coefficient of variation (stddev / mean), zero for empty or zero-mean input
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_and_paragraphs() {
        let text = "One two. Three four!\n\n  \nFive six?";
        assert_eq!(sentences(text), vec!["One two", "Three four", "Five six"]);
        assert_eq!(paragraphs(text).len(), 2);
    }

    #[test]
    fn test_empty_text() {
        assert!(words("").is_empty());
        assert!(sentences("   ").is_empty());
        assert!(paragraphs("").is_empty());
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("water"), 2);
        assert_eq!(count_syllables("photosynthesis"), 5);
        assert_eq!(count_syllables("123"), 0);
    }

    #[test]
    fn test_clean_words_strip_punctuation() {
        assert_eq!(clean_words("Hello, World! (ok)"), vec!["hello", "world", "ok"]);
    }

    #[test]
    fn test_clause_count() {
        assert_eq!(clause_count("first, second; third"), 3);
        assert_eq!(clause_count("no clauses here"), 1);
    }
}
