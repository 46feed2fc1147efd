//! WIDA proficiency adapter
//!
//! Maps the six WIDA bands to language targets used by prompt building,
//! descriptor fallback and validation.

use serde::Serialize;

use crate::error::AdaptError;

/// The six WIDA proficiency bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    Entering,
    Emerging,
    Developing,
    Expanding,
    Bridging,
    Reaching,
}

impl ProficiencyLevel {
    pub const ALL: [ProficiencyLevel; 6] = [
        ProficiencyLevel::Entering,
        ProficiencyLevel::Emerging,
        ProficiencyLevel::Developing,
        ProficiencyLevel::Expanding,
        ProficiencyLevel::Bridging,
        ProficiencyLevel::Reaching,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Entering => "entering",
            ProficiencyLevel::Emerging => "emerging",
            ProficiencyLevel::Developing => "developing",
            ProficiencyLevel::Expanding => "expanding",
            ProficiencyLevel::Bridging => "bridging",
            ProficiencyLevel::Reaching => "reaching",
        }
    }

    /// Title-case label ("Developing")
    pub fn label(&self) -> &'static str {
        match self {
            ProficiencyLevel::Entering => "Entering",
            ProficiencyLevel::Emerging => "Emerging",
            ProficiencyLevel::Developing => "Developing",
            ProficiencyLevel::Expanding => "Expanding",
            ProficiencyLevel::Bridging => "Bridging",
            ProficiencyLevel::Reaching => "Reaching",
        }
    }

    /// WIDA level number, 1 through 6
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    /// Resolve any accepted spelling; unknown input falls back to `developing`
    pub fn resolve(input: &str) -> Self {
        normalize_proficiency_level(input)
            .parse()
            .unwrap_or(ProficiencyLevel::Developing)
    }
}

/// Canonical band names only; use [`ProficiencyLevel::resolve`] for free-form input
impl std::str::FromStr for ProficiencyLevel {
    type Err = AdaptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| AdaptError::invalid_input(format!("Unknown proficiency level: {}", s)))
    }
}

impl std::fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language targets for one proficiency band
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidaAdaptations {
    pub sentences: &'static str,
    pub vocabulary: &'static str,
    pub structure: &'static str,
    pub support: &'static str,
    pub assessment: &'static str,
}

static ADAPTATIONS: [WidaAdaptations; 6] = [
    WidaAdaptations {
        sentences: "3-5 words maximum, simple present tense",
        vocabulary: "Basic everyday words with visual supports",
        structure: "Single simple sentences only",
        support: "Extensive visual supports, word banks, matching activities",
        assessment: "Fill-in-blank, true/false, picture matching",
    },
    WidaAdaptations {
        sentences: "6-10 words with simple connecting words",
        vocabulary: "Familiar words with gradual academic introduction",
        structure: "Present and simple past tense",
        support: "Visual supports, sentence starters, guided examples",
        assessment: "Multiple choice, yes/no, short responses with frames",
    },
    WidaAdaptations {
        sentences: "Expanded sentences with multiple clauses",
        vocabulary: "Academic vocabulary with context support",
        structure: "Various tenses and transitions",
        support: "Graphic organizers, sentence frames, models",
        assessment: "Mixed formats with substantial scaffolding",
    },
    WidaAdaptations {
        sentences: "Complex sentences with sophisticated language",
        vocabulary: "Technical vocabulary with minimal support",
        structure: "Multiple tenses and complex structures",
        support: "Text-based scaffolds, reasoning requirements",
        assessment: "Analysis tasks with some scaffolding",
    },
    WidaAdaptations {
        sentences: "Grade-level academic language with strategic supports",
        vocabulary: "Specialized and technical terms",
        structure: "Sophisticated grammatical structures",
        support: "Minimal scaffolding, focus on refinement",
        assessment: "Extended responses with light support",
    },
    WidaAdaptations {
        sentences: "Full grade-level complexity",
        vocabulary: "All specialized vocabulary without support",
        structure: "Sophisticated academic register",
        support: "No simplification needed",
        assessment: "Grade-level expectations, full rigor",
    },
];

/// Canonical band name for "Level 3", "DEVELOPING", " level 1 " and the like.
/// Unrecognized input is returned lowercased and trimmed.
pub fn normalize_proficiency_level(level: &str) -> String {
    let normalized = level.trim().to_lowercase();
    let mapped = match normalized.as_str() {
        "level 1" | "1" => Some(ProficiencyLevel::Entering),
        "level 2" | "2" => Some(ProficiencyLevel::Emerging),
        "level 3" | "3" => Some(ProficiencyLevel::Developing),
        "level 4" | "4" => Some(ProficiencyLevel::Expanding),
        "level 5" | "5" => Some(ProficiencyLevel::Bridging),
        "level 6" | "6" => Some(ProficiencyLevel::Reaching),
        _ => None,
    };
    match mapped {
        Some(l) => l.as_str().to_string(),
        None => normalized,
    }
}

/// Adaptation targets for a raw level string, defaulting to `developing`
pub fn get_adaptations(level: &str) -> &'static WidaAdaptations {
    adaptations_for(ProficiencyLevel::resolve(level))
}

pub fn adaptations_for(level: ProficiencyLevel) -> &'static WidaAdaptations {
    &ADAPTATIONS[level as usize]
}

/// Subject-specific can-do statements for a band
pub fn can_do_statements(level: ProficiencyLevel, subject: &str, content_type: &str) -> Vec<String> {
    let s = subject.to_lowercase();
    let c = content_type;
    match level {
        ProficiencyLevel::Entering => vec![
            format!("Students can identify key {} vocabulary with visual supports", s),
            format!("Students can match {} terms to pictures or symbols", s),
            format!("Students can complete simple {} activities with extensive guidance", c),
        ],
        ProficiencyLevel::Emerging => vec![
            format!("Students can use basic {} vocabulary in simple sentences", s),
            format!("Students can answer yes/no questions about {} concepts", s),
            format!("Students can complete {} with sentence frames and examples", c),
        ],
        ProficiencyLevel::Developing => vec![
            format!("Students can explain {} concepts using academic vocabulary", s),
            format!("Students can analyze {} with graphic organizers", c),
            format!("Students can make connections between {} ideas with support", s),
        ],
        ProficiencyLevel::Expanding => vec![
            format!("Students can synthesize {} information from multiple sources", s),
            format!("Students can evaluate {} using subject-specific criteria", c),
            format!("Students can create original responses about {} topics", s),
        ],
        ProficiencyLevel::Bridging => vec![
            format!("Students can critique and analyze complex {} materials", s),
            format!("Students can produce detailed explanations of {} processes", s),
            format!("Students can engage in academic discussions about {} topics", s),
        ],
        ProficiencyLevel::Reaching => vec![
            format!("Students can demonstrate full command of {} academic language", s),
            format!("Students can create sophisticated analyses of {} content", s),
            format!("Students can mentor others in {} understanding", s),
        ],
    }
}
