//! Paragraph-bounded chunking and order-preserving merge
//!
//! Sizes are measured in characters. A paragraph is only ever split when it
//! alone exceeds the limit: first on sentence boundaries, then on
//! whitespace, then by a hard character cut.

use once_cell::sync::Lazy;
use regex::Regex;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s).*?[.!?]+(?:\s+|$)").unwrap());

const PARAGRAPH_SEPARATOR: &str = "\n\n";

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `content` into chunks of at most `max_chars` characters
pub fn chunk_content(content: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in PARAGRAPH_BREAK.split(content).map(str::trim).filter(|p| !p.is_empty()) {
        let len = char_len(paragraph);

        if len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_oversized(paragraph, max_chars));
            continue;
        }

        if !current.is_empty() && char_len(&current) + PARAGRAPH_SEPARATOR.len() + len > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(PARAGRAPH_SEPARATOR);
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Join chunk outputs in order with a blank line between them
pub fn merge_sections<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

fn split_oversized(paragraph: &str, max_chars: usize) -> Vec<String> {
    let mut units: Vec<String> = Vec::new();
    let mut consumed = 0;
    for m in SENTENCE.find_iter(paragraph) {
        units.push(m.as_str().trim().to_string());
        consumed = m.end();
    }
    let rest = paragraph[consumed..].trim();
    if !rest.is_empty() {
        units.push(rest.to_string());
    }

    let mut pieces = Vec::new();
    for unit in units.into_iter().filter(|u| !u.is_empty()) {
        if char_len(&unit) <= max_chars {
            pieces.push(unit);
            continue;
        }
        for word in unit.split_whitespace() {
            if char_len(word) <= max_chars {
                pieces.push(word.to_string());
            } else {
                pieces.extend(hard_split(word, max_chars));
            }
        }
    }

    pack(pieces, max_chars)
}

fn hard_split(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
}

/// Greedily join pieces with single spaces without exceeding `max_chars`
fn pack(pieces: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if !current.is_empty() && char_len(&current) + 1 + char_len(&piece) > max_chars {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
