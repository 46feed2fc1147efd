//! Subject adapter: per-subject vocabulary focus, supports and instructions

use serde::Serialize;

use crate::analysis::{ContentAnalysis, ContentType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStrategy {
    pub vocabulary_focus: &'static [&'static str],
    pub visual_supports: &'static [&'static str],
    pub scaffolding: &'static [&'static str],
    pub assessment_types: &'static [&'static str],
}

const MATHEMATICS: SubjectStrategy = SubjectStrategy {
    vocabulary_focus: &["equation", "variable", "solution", "graph", "function"],
    visual_supports: &["number lines", "graphs", "diagrams", "manipulatives"],
    scaffolding: &["step-by-step procedures", "formula sheets", "example problems"],
    assessment_types: &["problem solving", "multiple choice", "short answer"],
};

const SCIENCE: SubjectStrategy = SubjectStrategy {
    vocabulary_focus: &["hypothesis", "observation", "experiment", "conclusion", "data"],
    visual_supports: &["diagrams", "charts", "lab images", "process flows"],
    scaffolding: &["graphic organizers", "sentence frames", "vocabulary banks"],
    assessment_types: &["investigation", "explanation", "analysis"],
};

const ENGLISH_LANGUAGE_ARTS: SubjectStrategy = SubjectStrategy {
    vocabulary_focus: &["character", "setting", "plot", "theme", "evidence"],
    visual_supports: &["story maps", "character charts", "timeline"],
    scaffolding: &["sentence starters", "paragraph frames", "text structures"],
    assessment_types: &["written response", "analysis", "creative writing"],
};

const SOCIAL_STUDIES: SubjectStrategy = SubjectStrategy {
    vocabulary_focus: &["culture", "government", "economy", "geography", "history"],
    visual_supports: &["maps", "timelines", "charts", "primary sources"],
    scaffolding: &["cause and effect frames", "comparison charts", "vocabulary maps"],
    assessment_types: &["analysis", "comparison", "explanation"],
};

const GENERIC: SubjectStrategy = SubjectStrategy {
    vocabulary_focus: &["key terms", "academic vocabulary"],
    visual_supports: &["graphic organizers", "charts", "diagrams"],
    scaffolding: &["sentence frames", "vocabulary support", "examples"],
    assessment_types: &["multiple choice", "short answer", "matching"],
};

const MATH_VISUALS: &[&str] = &["graphs", "diagrams", "number lines"];
const READING_VISUALS: &[&str] = &["story maps", "character charts", "graphic organizers"];

/// Strategy table lookup; unknown subjects get the generic strategy
pub fn strategy_for(subject: &str) -> &'static SubjectStrategy {
    match subject.trim() {
        "Mathematics" => &MATHEMATICS,
        "Science" => &SCIENCE,
        "English Language Arts" => &ENGLISH_LANGUAGE_ARTS,
        "Social Studies" => &SOCIAL_STUDIES,
        _ => &GENERIC,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAdaptations {
    pub subject: String,
    pub vocabulary_focus: Vec<String>,
    pub visual_supports: Vec<String>,
    pub scaffolding: Vec<String>,
    pub assessment_types: Vec<String>,
    pub specific_instructions: Vec<String>,
}

pub fn get_subject_adaptations(subject: &str, analysis: &ContentAnalysis) -> SubjectAdaptations {
    let strategy = strategy_for(subject);
    SubjectAdaptations {
        subject: subject.to_string(),
        vocabulary_focus: to_owned(strategy.vocabulary_focus),
        visual_supports: select_visual_supports(strategy.visual_supports, analysis),
        scaffolding: to_owned(strategy.scaffolding),
        assessment_types: to_owned(strategy.assessment_types),
        specific_instructions: subject_instructions(subject, analysis),
    }
}

/// Narrow visual supports to what suits the content. Falls back to the first
/// three when nothing in the table fits.
pub fn select_visual_supports(supports: &[&str], analysis: &ContentAnalysis) -> Vec<String> {
    let preferred: Option<&[&str]> = if analysis.mathematical.is_mathematical {
        Some(MATH_VISUALS)
    } else if analysis.content_type.primary_type == ContentType::ReadingComprehension {
        Some(READING_VISUALS)
    } else {
        None
    };

    if let Some(preferred) = preferred {
        let selected: Vec<String> = supports
            .iter()
            .filter(|s| preferred.contains(*s))
            .map(|s| s.to_string())
            .collect();
        if !selected.is_empty() {
            return selected;
        }
    }
    supports.iter().take(3).map(|s| s.to_string()).collect()
}

pub fn subject_instructions(subject: &str, analysis: &ContentAnalysis) -> Vec<String> {
    let lines: &[&str] = match subject.trim() {
        "Mathematics" => &[
            "Include step-by-step problem-solving procedures",
            "Provide formula reference when appropriate",
        ],
        "Science" => &[
            "Define scientific terms in context",
            "Include cause-and-effect relationships",
            "Connect to real-world examples",
        ],
        "English Language Arts" => &[
            "Provide text evidence examples",
            "Include character motivation support",
            "Add literary device explanations",
        ],
        "Social Studies" => &[
            "Provide historical context",
            "Include geographic references",
            "Connect to modern examples",
        ],
        _ => &[],
    };

    let mut out = to_owned(lines);
    if subject.trim() == "Mathematics"
        && analysis
            .mathematical
            .elements
            .get("measurements")
            .copied()
            .unwrap_or(0)
            > 0
    {
        out.push("Include unit conversion support".to_string());
    }
    out
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ContentAnalyzer;

    #[tokio::test]
    async fn test_math_content_prefers_math_visuals() {
        let analysis = ContentAnalyzer::new()
            .analyze("Solve 3 + 4 = 7. Then 12 - 5 = 7. Measure 5 cm and 10 cm.")
            .await;
        assert!(analysis.mathematical.is_mathematical);

        let adaptations = get_subject_adaptations("Mathematics", &analysis);
        assert_eq!(adaptations.visual_supports, vec!["number lines", "graphs", "diagrams"]);
        assert!(adaptations
            .specific_instructions
            .contains(&"Include unit conversion support".to_string()));
    }

    #[tokio::test]
    async fn test_reading_content_prefers_story_maps() {
        let analysis = ContentAnalyzer::new()
            .analyze("Read the passage. According to the text, the author says the story is sad.")
            .await;
        let adaptations = get_subject_adaptations("English Language Arts", &analysis);
        assert_eq!(adaptations.visual_supports, vec!["story maps", "character charts"]);
    }

    #[tokio::test]
    async fn test_unknown_subject_uses_generic_strategy() {
        let analysis = ContentAnalyzer::new().analyze("Paint a picture of a tree.").await;
        let adaptations = get_subject_adaptations("Art", &analysis);
        assert_eq!(adaptations.vocabulary_focus, vec!["key terms", "academic vocabulary"]);
        assert_eq!(adaptations.visual_supports.len(), 3);
        assert!(adaptations.specific_instructions.is_empty());
    }
}
