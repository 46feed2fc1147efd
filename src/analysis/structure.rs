//! Document structure detection (lists, sections, instructions)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+[.)]\s+").unwrap());
static LETTERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[A-Za-z][.)]\s+").unwrap());
static BULLETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*•◦▪]\s+").unwrap());
static CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[ xX]?\]|[□☐]").unwrap());
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:#{1,6}\s+\S.*|\*\*[^*\n]+\*\*:?\s*|[A-Z][A-Z ]{3,}:?\s*)$").unwrap()
});
static INSTRUCTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:directions|instructions)\s*:").unwrap());

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureReport {
    pub numbered_items: usize,
    pub lettered_items: usize,
    pub bulleted_items: usize,
    pub checkboxes: usize,
    pub section_count: usize,
    pub has_instructions: bool,
    pub total_items: usize,
    pub has_lists: bool,
}

pub fn analyze(content: &str) -> StructureReport {
    let numbered_items = NUMBERED.find_iter(content).count();
    let lettered_items = LETTERED.find_iter(content).count();
    let bulleted_items = BULLETED.find_iter(content).count();
    let total_items = numbered_items + lettered_items + bulleted_items;

    StructureReport {
        numbered_items,
        lettered_items,
        bulleted_items,
        checkboxes: CHECKBOX.find_iter(content).count(),
        section_count: HEADER.find_iter(content).count(),
        has_instructions: INSTRUCTIONS.is_match(content),
        total_items,
        has_lists: total_items > 0,
    }
}
