//! Local WIDA descriptor generator
//!
//! Used whenever the generated descriptor payload is missing, malformed or
//! unusable. Derived purely from subject, level and content type.

use crate::adapters::{subject, wida, ProficiencyLevel};
use crate::analysis::ContentType;
use crate::models::{AdaptationParams, AssessmentSuggestion, DynamicDescriptors};

const CORE_SUPPORTS: [&str; 3] = [
    "Simplified sentence structure",
    "Visual supports and organizers",
    "Vocabulary definitions and examples",
];

/// How the subject's content is named in learner-facing statements
fn subject_concepts(subject: &str) -> String {
    match subject.trim() {
        "Mathematics" => "mathematical concepts".to_string(),
        "Science" => "scientific concepts".to_string(),
        "English Language Arts" => "literary elements".to_string(),
        "Social Studies" => "historical/social concepts".to_string(),
        other => format!("{} content", other.to_lowercase()),
    }
}

pub fn fallback_descriptors(params: &AdaptationParams, content_type: ContentType) -> DynamicDescriptors {
    let level = ProficiencyLevel::resolve(&params.proficiency_level);
    let targets = wida::adaptations_for(level);
    let strategy = subject::strategy_for(&params.subject);
    let content_label = content_type.as_str().replace('_', " ");

    let mut descriptors = vec![format!(
        "Students can engage with {} at their language level",
        subject_concepts(&params.subject)
    )];
    descriptors.extend(wida::can_do_statements(level, &params.subject, &content_label));
    descriptors.push("Students can complete adapted activities with appropriate support".to_string());
    descriptors.push("Students can use academic vocabulary with scaffolding".to_string());

    let mut content_specific_supports: Vec<String> = CORE_SUPPORTS.iter().map(|s| s.to_string()).collect();
    content_specific_supports.push(targets.support.to_string());

    DynamicDescriptors {
        title: format!("{} - {} Level", params.subject, level.label()),
        descriptors,
        content_specific_supports,
        vocabulary_supports: vec![
            "Key terms bolded throughout".to_string(),
            format!("Focus terms: {}", strategy.vocabulary_focus.join(", ")),
        ],
        language_objectives: vec![
            format!("Sentences: {}", targets.sentences),
            format!("Vocabulary: {}", targets.vocabulary),
        ],
        assessment_suggestions: vec![
            AssessmentSuggestion::new("Formative", "Exit ticket with key concepts"),
            AssessmentSuggestion::new("Summative", "Modified assessment with supports"),
            AssessmentSuggestion::new("Format", targets.assessment),
        ],
    }
}
