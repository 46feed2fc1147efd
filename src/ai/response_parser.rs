//! Parsing of generated adaptation text and JSON payloads
//!
//! Adaptation responses follow a two-marker text contract
//! (`STUDENT_WORKSHEET:` then `TEACHER_GUIDE:`). Parsing never fails: when
//! either marker is missing the whole text becomes the worksheet and a
//! templated teacher's guide is synthesized.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AdaptError, Result};

pub const STUDENT_MARKER: &str = "STUDENT_WORKSHEET:";
pub const TEACHER_MARKER: &str = "TEACHER_GUIDE:";

static STUDENT_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)STUDENT_WORKSHEET:\s*(.*?)(?:TEACHER_GUIDE:|$)").unwrap());
static TEACHER_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)TEACHER_GUIDE:\s*(.*)$").unwrap());

const FALLBACK_TEACHER_GUIDE: &str = "# Teacher's Guide

## Overview
This guide accompanies the adapted student worksheet.

## Materials Needed
- Student worksheet
- Answer key (refer to original materials)
- Additional supports as needed

## ELL Supports Included
- Simplified language structure
- Key vocabulary highlighted
- Clear instructions provided

## Pacing Suggestions
- Review vocabulary: 5-10 minutes
- Complete activities: 20-30 minutes
- Discussion/review: 10-15 minutes

## Notes
This is an automatically generated fallback guide. Please review and supplement with your professional judgment.";

/// How a response was split into worksheet and guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMethod {
    Structured,
    Fallback,
}

impl ParseMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMethod::Structured => "structured",
            ParseMethod::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAdaptation {
    pub student_worksheet: String,
    pub teacher_guide: String,
    pub parse_method: ParseMethod,
}

/// Problems found in an already-parsed adaptation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContentCheck {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// Guide used whenever the generated text lacks its own
pub fn fallback_teacher_guide() -> String {
    FALLBACK_TEACHER_GUIDE.to_string()
}

/// Split raw generated text into worksheet and teacher's guide
pub fn parse_adaptation_response(raw: &str) -> ParsedAdaptation {
    let student = STUDENT_SECTION.captures(raw).and_then(|c| c.get(1));
    let teacher = TEACHER_SECTION.captures(raw).and_then(|c| c.get(1));

    match (student, teacher) {
        (Some(student), Some(teacher)) => ParsedAdaptation {
            student_worksheet: student.as_str().trim().to_string(),
            teacher_guide: teacher.as_str().trim().to_string(),
            parse_method: ParseMethod::Structured,
        },
        _ => ParsedAdaptation {
            student_worksheet: raw.to_string(),
            teacher_guide: fallback_teacher_guide(),
            parse_method: ParseMethod::Fallback,
        },
    }
}

/// Locate the JSON payload in generated text.
///
/// Tries a fenced code block, then the outermost `{...}` span, then the
/// whole string. Each candidate must actually parse before it is accepted.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> Result<T> {
    if let Some(block) = fenced_block(raw) {
        if let Ok(value) = serde_json::from_str(block) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&raw[start..=end]) {
                return Ok(value);
            }
        }
    }

    serde_json::from_str(raw.trim())
        .map_err(|e| AdaptError::Parse(format!("Failed to parse JSON response: {}", e)))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = start + 3;
    // Skip an optional language tag on the opening fence
    let content_start = match text[after_fence..].find('\n') {
        Some(i) if text[after_fence..after_fence + i].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            after_fence + i + 1
        }
        _ => after_fence,
    };
    let end = text[content_start..].find("```")?;
    Some(text[content_start..content_start + end].trim())
}

/// Detect marker leakage and truncated sections in generated content
pub fn validate_parsed_content(student_worksheet: &str, teacher_guide: &str) -> ParsedContentCheck {
    let mut issues = Vec::new();

    if student_worksheet.chars().count() < 50 {
        issues.push("Student worksheet is too short or missing".to_string());
    }
    if teacher_guide.chars().count() < 50 {
        issues.push("Teacher guide is too short or missing".to_string());
    }
    if student_worksheet.contains(TEACHER_MARKER) {
        issues.push("Student worksheet contains teacher guide content".to_string());
    }
    if teacher_guide.contains(STUDENT_MARKER) {
        issues.push("Teacher guide contains student worksheet content".to_string());
    }

    ParsedContentCheck {
        is_valid: issues.is_empty(),
        issues,
    }
}
