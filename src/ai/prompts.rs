//! Prompt construction for adaptation, two-step structure and descriptor calls
//!
//! Every builder is a pure function of its inputs so a retried call resends
//! byte-identical text.

use crate::adapters::subject::SubjectAdaptations;
use crate::adapters::WidaAdaptations;
use crate::analysis::{ComplexityReport, ContentAnalysis};
use crate::models::AdaptationParams;

/// Placeholder the structure prompt asks the model to leave for the passage
pub const CONTENT_PLACEHOLDER: &str = "{{CONTENT_PLACEHOLDER}}";

/// Directive appended to prompts whose answer must be a bare JSON object
pub const JSON_ONLY_DIRECTIVE: &str = "\n\nCRITICAL: Respond ONLY with valid JSON. No explanations, no markdown, no additional text. Just the JSON object.";

const STRUCTURE_SAMPLE_CHARS: usize = 500;
const DESCRIPTOR_SAMPLE_CHARS: usize = 800;

/// Position of a chunk inside a longer document (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPart {
    pub index: usize,
    pub total: usize,
}

/// Everything the adaptation prompt is assembled from
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub content: &'a str,
    pub params: &'a AdaptationParams,
    pub analysis: Option<&'a ContentAnalysis>,
    pub complexity: Option<&'a ComplexityReport>,
    pub wida: &'a WidaAdaptations,
    pub subject: Option<&'a SubjectAdaptations>,
    pub bilingual_instructions: &'a str,
    pub iep_instructions: &'a str,
    pub part: Option<ChunkPart>,
}

/// Build the main adaptation prompt.
///
/// Section order: analysis summary, level adaptations, subject header,
/// bilingual block, IEP block, requirements, fenced content, output contract.
pub fn build_adaptation_prompt(ctx: &PromptContext<'_>) -> String {
    let params = ctx.params;

    let content_type = ctx
        .analysis
        .map(|a| a.content_type.primary_type.as_str())
        .unwrap_or("general");
    let word_count = ctx
        .analysis
        .map(|a| a.metrics.word_count.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let complexity_level = ctx
        .complexity
        .map(|c| c.overall.level.as_str())
        .unwrap_or("moderate");
    let processing_strategy = ctx
        .complexity
        .map(|c| c.overall.processing_strategy.as_str())
        .unwrap_or("standard");

    let mut prompt = format!(
        r#"You are an expert ELL curriculum adapter. Create a complete adapted worksheet for {level} level students.

**CONTENT ANALYSIS:**
- Content Type: {content_type}
- Complexity Level: {complexity_level}
- Word Count: {word_count}
- Processing Strategy: {processing_strategy}

**PROFICIENCY LEVEL ADAPTATIONS:**
- Sentence Structure: {sentences}
- Vocabulary Support: {vocabulary}
- Instructional Support: {support}
- Assessment Format: {assessment}

**SUBJECT:** {subject}
**MATERIAL TYPE:** {material_type}
**GRADE LEVEL:** {grade}"#,
        level = params.proficiency_level,
        sentences = ctx.wida.sentences,
        vocabulary = ctx.wida.vocabulary,
        support = ctx.wida.support,
        assessment = ctx.wida.assessment,
        subject = params.subject,
        material_type = params.material_type,
        grade = params.grade_level.as_deref().unwrap_or("Not specified"),
    );

    if let Some(subject) = ctx.subject {
        if !subject.specific_instructions.is_empty() {
            prompt.push_str("\n**SUBJECT-SPECIFIC SUPPORTS:**");
            for line in &subject.specific_instructions {
                prompt.push_str("\n- ");
                prompt.push_str(line);
            }
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(ctx.bilingual_instructions);
    prompt.push('\n');
    prompt.push_str(ctx.iep_instructions);

    prompt.push_str(
        r#"

**CRITICAL REQUIREMENTS:**
1. Include EVERY word of any reading passages - no summarizing or abbreviating
2. Number all questions sequentially (1. 2. 3. etc.)
3. Bold key vocabulary terms throughout using **term** format
4. Use [ ] for checkboxes, not special characters
5. NO placeholder text or abbreviations like "..." or "[continues]"
6. Create complete, print-ready content
"#,
    );

    if let Some(part) = ctx.part {
        prompt.push_str(&format!(
            "\n**DOCUMENT PART:** This is part {} of {} of a longer document. Adapt only this part and keep its original order; do not add an introduction or conclusion for the whole document.\n",
            part.index, part.total
        ));
    }

    prompt.push_str(&format!(
        r#"
**ORIGINAL CONTENT TO ADAPT:**
```
{}
```

Generate both:
1. **STUDENT WORKSHEET** - Complete adapted material
2. **TEACHER'S GUIDE** - Answer key, materials needed, objectives, ELL supports, pacing

Respond with:
STUDENT_WORKSHEET:
[Complete student worksheet here]

TEACHER_GUIDE:
[Complete teacher's guide here]"#,
        ctx.content
    ));

    prompt
}

/// First step of two-step processing: structure and questions only, with
/// [`CONTENT_PLACEHOLDER`] where the passage goes
pub fn build_structure_prompt(content: &str, params: &AdaptationParams, wida: &WidaAdaptations) -> String {
    format!(
        r#"Create the structure and questions for a {material_type} adapted for {level} students.

Where the main content should go, write exactly: {placeholder}

**PROFICIENCY LEVEL ADAPTATIONS:**
- Sentence Structure: {sentences}
- Vocabulary Support: {vocabulary}
- Assessment Format: {assessment}

**SAMPLE CONTENT FOR CONTEXT:**
{sample}...

Create complete structure with all questions and activities but use {placeholder} for the main passage/content.

Respond with:
STUDENT_WORKSHEET:
[Worksheet structure with {placeholder}]

TEACHER_GUIDE:
[Complete teacher's guide here]"#,
        material_type = params.material_type,
        level = params.proficiency_level,
        placeholder = CONTENT_PLACEHOLDER,
        sentences = wida.sentences,
        vocabulary = wida.vocabulary,
        assessment = wida.assessment,
        sample = truncate_chars(content, STRUCTURE_SAMPLE_CHARS),
    )
}

/// Prompt asking for dynamic descriptors as JSON
pub fn build_descriptors_prompt(
    student_worksheet: &str,
    params: &AdaptationParams,
    content_type: &str,
) -> String {
    format!(
        r#"Based on this adapted {subject} material for {level} students, generate specific WIDA descriptors.

**CONTENT TYPE:** {content_type}

**ADAPTED CONTENT SAMPLE:**
{sample}...

Generate JSON with:
{{
  "title": "Specific title for this adaptation",
  "descriptors": ["Array of specific learning objectives"],
  "contentSpecificSupports": ["Array of supports actually included"],
  "vocabularySupports": ["Array of key vocabulary terms used"],
  "languageObjectives": ["Array of language learning goals"],
  "assessmentSuggestions": [{{"type": "Formative", "description": "specific suggestion"}}]
}}"#,
        subject = params.subject,
        level = params.proficiency_level,
        sample = truncate_chars(student_worksheet, DESCRIPTOR_SAMPLE_CHARS),
    )
}

/// Prefix of at most `max` characters, never splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::wida;

    fn params() -> AdaptationParams {
        let mut params = AdaptationParams::new("The cell is the basic unit of life.", "Science", "developing");
        params.grade_level = Some("5".into());
        params
    }

    fn context<'a>(params: &'a AdaptationParams, bilingual: &'a str, iep: &'a str) -> PromptContext<'a> {
        PromptContext {
            content: &params.content,
            params,
            analysis: None,
            complexity: None,
            wida: wida::get_adaptations(&params.proficiency_level),
            subject: None,
            bilingual_instructions: bilingual,
            iep_instructions: iep,
            part: None,
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let params = params();
        let a = build_adaptation_prompt(&context(&params, "", ""));
        let b = build_adaptation_prompt(&context(&params.clone(), "", ""));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sections_in_order() {
        let params = params();
        let prompt = build_adaptation_prompt(&context(&params, "\n\n**BILINGUAL**\n", "\n\n**IEP**\n"));

        let order = [
            "**CONTENT ANALYSIS:**",
            "**PROFICIENCY LEVEL ADAPTATIONS:**",
            "**SUBJECT:** Science",
            "**GRADE LEVEL:** 5",
            "**BILINGUAL**",
            "**IEP**",
            "**CRITICAL REQUIREMENTS:**",
            "**ORIGINAL CONTENT TO ADAPT:**",
            "The cell is the basic unit of life.",
            "STUDENT_WORKSHEET:",
            "TEACHER_GUIDE:",
        ];
        let mut cursor = 0;
        for marker in order {
            let found = prompt[cursor..]
                .find(marker)
                .unwrap_or_else(|| panic!("{} missing or out of order", marker));
            cursor += found + marker.len();
        }
    }

    #[test]
    fn test_defaults_without_analysis() {
        let mut params = params();
        params.grade_level = None;
        let prompt = build_adaptation_prompt(&context(&params, "", ""));
        assert!(prompt.contains("- Content Type: general"));
        assert!(prompt.contains("- Word Count: unknown"));
        assert!(prompt.contains("**GRADE LEVEL:** Not specified"));
    }

    #[test]
    fn test_chunk_part_note() {
        let params = params();
        let mut ctx = context(&params, "", "");
        ctx.part = Some(ChunkPart { index: 2, total: 3 });
        let prompt = build_adaptation_prompt(&ctx);
        assert!(prompt.contains("part 2 of 3"));
    }

    #[test]
    fn test_structure_prompt_uses_placeholder_and_sample() {
        let params = params();
        let long = "word ".repeat(300);
        let prompt = build_structure_prompt(&long, &params, wida::get_adaptations("developing"));
        assert!(prompt.contains(CONTENT_PLACEHOLDER));
        assert!(prompt.contains(&format!("{}...", &long[..500])));
        assert!(!prompt.contains(&long[..600]));
    }

    #[test]
    fn test_descriptors_prompt_mentions_schema() {
        let prompt = build_descriptors_prompt("Worksheet", &params(), "science");
        assert!(prompt.contains("\"assessmentSuggestions\""));
        assert!(prompt.contains("**CONTENT TYPE:** science"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
