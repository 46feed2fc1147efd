//! Input normalization run before any generation call

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::analysis::text;

const MAX_WORD_LOSS: f64 = 0.05;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static TRAILING_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m) +$").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static BULLETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•◦▪▫]").unwrap());
static OPEN_BOXES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[□☐]").unwrap());
static CHECKED_BOXES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[✓☑]").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessedContent {
    pub content: String,
    pub changes: Vec<String>,
    pub original_length: usize,
    pub processed_length: usize,
}

pub fn preprocess(content: &str) -> PreprocessedContent {
    let mut changes = Vec::new();

    let mut processed = content.replace("\r\n", "\n").replace('\r', "\n");
    if processed != content {
        changes.push("normalized line endings".to_string());
    }

    let before = processed.clone();
    processed = SPACE_RUNS.replace_all(&processed, " ").into_owned();
    processed = TRAILING_SPACE.replace_all(&processed, "").into_owned();
    processed = BLANK_RUNS.replace_all(&processed, "\n\n").into_owned();
    if processed != before {
        changes.push("normalized whitespace".to_string());
    }

    let before = processed.clone();
    processed = BULLETS.replace_all(&processed, "-").into_owned();
    processed = OPEN_BOXES.replace_all(&processed, "[ ]").into_owned();
    processed = CHECKED_BOXES.replace_all(&processed, "[x]").into_owned();
    if processed != before {
        changes.push("fixed formatting characters".to_string());
    }

    let processed = processed.trim().to_string();
    check_integrity(content, &processed);

    PreprocessedContent {
        original_length: content.chars().count(),
        processed_length: processed.chars().count(),
        content: processed,
        changes,
    }
}

/// Fraction of words lost between `original` and `processed`
pub fn word_loss(original: &str, processed: &str) -> f64 {
    let original_words = text::word_count(original);
    if original_words == 0 {
        return 0.0;
    }
    let processed_words = text::word_count(processed);
    (original_words as f64 - processed_words as f64) / original_words as f64
}

fn check_integrity(original: &str, processed: &str) {
    let loss = word_loss(original, processed);
    if loss > MAX_WORD_LOSS {
        warn!(
            loss_percent = loss * 100.0,
            "[Preprocess] Content processing lost words"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_whitespace_and_line_endings() {
        let result = preprocess("  Read\tthe   text.\r\n\r\n\r\n\r\nAnswer.  ");
        assert_eq!(result.content, "Read the text.\n\nAnswer.");
        assert!(result.changes.contains(&"normalized line endings".to_string()));
        assert!(result.changes.contains(&"normalized whitespace".to_string()));
    }

    #[test]
    fn test_replaces_glyphs() {
        let result = preprocess("• apples\n□ done?\n✓ yes\n☐ no");
        assert_eq!(result.content, "- apples\n[ ] done?\n[x] yes\n[ ] no");
        assert_eq!(result.changes, vec!["fixed formatting characters".to_string()]);
    }

    #[test]
    fn test_clean_text_unchanged() {
        let result = preprocess("Already clean.\n\nSecond paragraph.");
        assert_eq!(result.content, "Already clean.\n\nSecond paragraph.");
        assert!(result.changes.is_empty());
        assert_eq!(result.original_length, result.processed_length);
    }

    #[test]
    fn test_word_loss() {
        assert_eq!(word_loss("", ""), 0.0);
        assert_eq!(word_loss("a b c d", "a b"), 0.5);
        assert_eq!(word_loss("a b", "a b"), 0.0);
    }
}
