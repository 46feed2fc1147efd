//! Request value objects shared across analysis, prompting and validation

use serde::{Deserialize, Serialize};

use crate::error::{AdaptError, Result};

/// IEP worksheet length accommodation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorksheetLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl WorksheetLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorksheetLength::Short => "Short",
            WorksheetLength::Medium => "Medium",
            WorksheetLength::Long => "Long",
        }
    }
}

impl std::str::FromStr for WorksheetLength {
    type Err = AdaptError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(WorksheetLength::Short),
            "medium" => Ok(WorksheetLength::Medium),
            "long" => Ok(WorksheetLength::Long),
            _ => Err(AdaptError::invalid_input(format!("Unknown worksheet length: {}", s))),
        }
    }
}

/// Full adaptation request.
///
/// Owned by the caller and borrowed by the engine for the duration of one
/// adaptation; nothing downstream mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptationParams {
    pub content: String,
    pub material_type: String,
    pub subject: String,
    pub grade_level: Option<String>,
    /// Raw proficiency input ("Level 3", "developing", ...)
    pub proficiency_level: String,
    pub learning_objectives: Option<String>,

    pub include_bilingual_support: bool,
    pub native_language: Option<String>,
    pub translate_summary: bool,
    pub translate_instructions: bool,
    pub list_cognates: bool,

    pub worksheet_length: WorksheetLength,
    pub add_student_checklist: bool,
    pub use_multiple_choice: bool,
}

impl AdaptationParams {
    pub fn new(
        content: impl Into<String>,
        subject: impl Into<String>,
        proficiency_level: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            subject: subject.into(),
            proficiency_level: proficiency_level.into(),
            material_type: "worksheet".to_string(),
            ..Default::default()
        }
    }

    /// Reject requests missing required fields before any work is done
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.content.trim().is_empty() {
            missing.push("content");
        }
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if self.proficiency_level.trim().is_empty() {
            missing.push("proficiencyLevel");
        }

        if !missing.is_empty() {
            return Err(AdaptError::invalid_input(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        if self.include_bilingual_support
            && self
                .native_language
                .as_deref()
                .map(|l| l.trim().is_empty())
                .unwrap_or(true)
        {
            return Err(AdaptError::invalid_input(
                "Bilingual support requested without a native language",
            ));
        }

        Ok(())
    }

    /// Native language when bilingual support is active
    pub fn bilingual_language(&self) -> Option<&str> {
        if !self.include_bilingual_support {
            return None;
        }
        self.native_language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// True when any IEP accommodation differs from the defaults
    pub fn has_iep_accommodations(&self) -> bool {
        self.worksheet_length != WorksheetLength::Medium
            || self.add_student_checklist
            || self.use_multiple_choice
    }
}

/// One assessment idea attached to the descriptors.
///
/// Generators sometimes answer with a bare string; that becomes a
/// description with an empty type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SuggestionRepr")]
pub struct AssessmentSuggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl AssessmentSuggestion {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionRepr {
    Text(String),
    Full {
        #[serde(rename = "type", default)]
        kind: String,
        description: String,
    },
}

impl From<SuggestionRepr> for AssessmentSuggestion {
    fn from(repr: SuggestionRepr) -> Self {
        match repr {
            SuggestionRepr::Text(description) => AssessmentSuggestion::new("", description),
            SuggestionRepr::Full { kind, description } => AssessmentSuggestion::new(kind, description),
        }
    }
}

/// Content-specific WIDA descriptors attached to a finished adaptation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicDescriptors {
    pub title: String,
    pub descriptors: Vec<String>,
    pub content_specific_supports: Vec<String>,
    pub vocabulary_supports: Vec<String>,
    pub language_objectives: Vec<String>,
    pub assessment_suggestions: Vec<AssessmentSuggestion>,
}

impl DynamicDescriptors {
    /// A generated payload is only kept when it names a title and at least one descriptor
    pub fn is_usable(&self) -> bool {
        !self.title.trim().is_empty() && !self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_names_missing_fields() {
        let params = AdaptationParams::new("   ", "", "developing");
        let err = params.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("content"));
        assert!(msg.contains("subject"));
        assert!(!msg.contains("proficiencyLevel"));
    }

    #[test]
    fn test_bilingual_requires_language() {
        let mut params = AdaptationParams::new("text", "Science", "Level 2");
        params.include_bilingual_support = true;
        assert!(params.validate().is_err());

        params.native_language = Some("Spanish".into());
        assert!(params.validate().is_ok());
        assert_eq!(params.bilingual_language(), Some("Spanish"));
    }

    #[test]
    fn test_deserializes_camel_case_with_defaults() {
        let params: AdaptationParams = serde_json::from_str(
            r#"{"content":"Hi","subject":"Mathematics","proficiencyLevel":"emerging","worksheetLength":"Short"}"#,
        )
        .unwrap();
        assert_eq!(params.worksheet_length, WorksheetLength::Short);
        assert!(!params.use_multiple_choice);
        assert!(params.has_iep_accommodations());
    }

    #[test]
    fn test_worksheet_length_parsing() {
        assert_eq!("LONG".parse::<WorksheetLength>().unwrap(), WorksheetLength::Long);
        assert!(matches!("huge".parse::<WorksheetLength>(), Err(AdaptError::InvalidInput(_))));
    }

    #[test]
    fn test_descriptors_accept_string_suggestions() {
        let descriptors: DynamicDescriptors = serde_json::from_str(
            r#"{"title":"Plant Cells","descriptors":["Label parts"],"assessmentSuggestions":["Exit ticket",{"type":"Summative","description":"Quiz"}]}"#,
        )
        .unwrap();
        assert!(descriptors.is_usable());
        assert_eq!(descriptors.assessment_suggestions[0], AssessmentSuggestion::new("", "Exit ticket"));
        assert_eq!(descriptors.assessment_suggestions[1].kind, "Summative");
        assert!(descriptors.vocabulary_supports.is_empty());
    }
}
