//! Complexity Analyzer
//!
//! Combines readability, vocabulary, structural, cognitive-load and
//! subject-specific sub-scores into one weighted, grade-like score with
//! simplification flags and an advisory processing recommendation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::language::ComplexityLevel;
use super::readability::{self, ReadabilityReport};
use super::text;
use super::vocabulary::{self, VocabularyReport};

/// Simplification is needed once the score exceeds the grade target by this much
pub const SIMPLIFICATION_GRADE_OFFSET: f64 = 1.0;
pub const EXTENSIVE_GRADE_OFFSET: f64 = 3.0;
/// Thresholds used when no grade level is given
pub const DEFAULT_SIMPLIFICATION_SCORE: f64 = 8.0;
pub const DEFAULT_EXTENSIVE_SCORE: f64 = 12.0;

const LEVEL_CUTS: [f64; 4] = [3.0, 6.0, 9.0, 12.0];
const SUB_SCORE_CAP: f64 = 20.0;

/// Weights applied to the five sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityWeights {
    pub readability: f64,
    pub vocabulary: f64,
    pub structural: f64,
    pub cognitive: f64,
    pub subject_specific: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            readability: 0.25,
            vocabulary: 0.25,
            structural: 0.20,
            cognitive: 0.20,
            subject_specific: 0.10,
        }
    }
}

/// Advisory strategy tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingRecommendation {
    Direct,
    Standard,
    Chunked,
    MultiStep,
}

impl ProcessingRecommendation {
    pub fn from_score(score: f64) -> Self {
        if score < 6.0 {
            ProcessingRecommendation::Direct
        } else if score < 10.0 {
            ProcessingRecommendation::Standard
        } else if score < 15.0 {
            ProcessingRecommendation::Chunked
        } else {
            ProcessingRecommendation::MultiStep
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingRecommendation::Direct => "direct",
            ProcessingRecommendation::Standard => "standard",
            ProcessingRecommendation::Chunked => "chunked",
            ProcessingRecommendation::MultiStep => "multi_step",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralComplexity {
    pub average_sentence_length: f64,
    pub average_clauses_per_sentence: f64,
    pub average_paragraph_length: f64,
    pub sentence_complexity_score: f64,
    pub structural_variety: f64,
    pub organization_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveLoad {
    pub total_concepts: usize,
    pub abstract_concepts: usize,
    pub concrete_concepts: usize,
    /// Concepts per 100 words
    pub concept_density: f64,
    pub processing_demand: f64,
    pub cognitive_load_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectComplexity {
    pub score: f64,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityScore {
    pub score: f64,
    pub level: ComplexityLevel,
    pub grade_equivalent: i64,
    pub needs_simplification: bool,
    pub needs_extensive_simplification: bool,
    pub processing_strategy: ProcessingRecommendation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
    pub readability: ReadabilityReport,
    pub vocabulary: VocabularyReport,
    pub structural: StructuralComplexity,
    pub cognitive: CognitiveLoad,
    pub subject_specific: SubjectComplexity,
    pub overall: ComplexityScore,
    pub recommendations: Vec<String>,
}

static CONJUNCTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:and|but|or|because|although|however|therefore|moreover)\b").unwrap()
});
static HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:#{1,6}\s|\*\*|\d+[.)]\s|[-*]\s)").unwrap());
static COGNITIVE_VERBS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:analy[sz]e|evaluate|compare|contrast|infer|predict|justify|synthesize|explain why)\b")
        .unwrap()
});

static MATH_INDICATORS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_indicators(&[
        ("equations", r"[a-zA-Z]\s*=\s*[\d\w]"),
        ("multi-step operations", r"\d+\s*[+\-×÷*/]\s*\d+\s*[+\-×÷*/]\s*\d+"),
        ("fractions", r"\d+/\d+"),
        ("word problems", r"(?i)\b(?:how many|how much|altogether|in all|remaining)\b"),
        ("advanced notation", r"[√π∑∫^²³]|(?i)\b(?:exponent|polynomial|quadratic|coefficient)\b"),
    ])
});
static SCIENCE_INDICATORS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_indicators(&[
        ("scientific method", r"(?i)\b(?:hypothes[ie]s|variable|control group|procedure)\b"),
        ("data interpretation", r"(?i)\b(?:data|table|graph|chart|measurement)s?\b"),
        ("technical terms", r"(?i)\b\w+(?:synthesis|ology|osis|ation)\b"),
        ("processes", r"(?i)\b(?:cycle|reaction|energy|force|cell)s?\b"),
    ])
});
static ELA_INDICATORS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_indicators(&[
        ("literary analysis", r"(?i)\b(?:theme|symbol\w*|metaphor|simile|irony|tone)\b"),
        ("figurative language", r"(?i)\b(?:like a|as if|as \w+ as)\b"),
        ("text evidence", r"(?i)\b(?:evidence|cite|quote|support your answer)\b"),
        ("dialogue", r#"["“][^"”]+["”]"#),
    ])
});
static SOCIAL_STUDIES_INDICATORS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    compile_indicators(&[
        ("dates and eras", r"\b(?:1[0-9]{3}|20[0-9]{2})s?\b|(?i)\bcentury\b"),
        ("civic concepts", r"(?i)\b(?:government|constitution|democracy|rights|law)s?\b"),
        ("cause and effect", r"(?i)\b(?:caused|led to|resulted in|as a result)\b"),
        ("proper nouns", r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b"),
    ])
});

fn compile_indicators(table: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
    table
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ComplexityAnalyzer {
    weights: ComplexityWeights,
}

impl ComplexityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ComplexityWeights) -> Self {
        Self { weights }
    }

    pub async fn analyze(
        &self,
        content: &str,
        subject: Option<&str>,
        grade_level: Option<&str>,
    ) -> ComplexityReport {
        let (readability, vocabulary, structural, cognitive, subject_specific) = tokio::join!(
            async { readability::calculate(content) },
            async { vocabulary::analyze(content, subject) },
            async { structural_complexity(content) },
            async { cognitive_load(content) },
            async { subject_complexity(content, subject) },
        );

        let w = &self.weights;
        let score = readability.flesch_kincaid_grade * w.readability
            + vocabulary.complexity_score * w.vocabulary
            + structural.sentence_complexity_score * w.structural
            + cognitive.cognitive_load_score * w.cognitive
            + subject_specific.score * w.subject_specific;

        let grade_target = grade_level.and_then(parse_grade_target);
        let overall = score_overall(score, grade_target);
        let recommendations =
            recommendations(&overall, &readability, &vocabulary, &structural, &cognitive);

        tracing::debug!(
            score = overall.score,
            level = overall.level.as_str(),
            "[ComplexityAnalyzer] analysis complete"
        );

        ComplexityReport {
            readability,
            vocabulary,
            structural,
            cognitive,
            subject_specific,
            overall,
            recommendations,
        }
    }
}

/// Level, grade equivalent, flags and recommendation for a composite score
pub fn score_overall(score: f64, grade_target: Option<f64>) -> ComplexityScore {
    // readability grades go negative for very short words and sentences
    let score = score.max(0.0);
    let (simplify_at, extensive_at) = match grade_target {
        Some(target) => (
            target + SIMPLIFICATION_GRADE_OFFSET,
            target + EXTENSIVE_GRADE_OFFSET,
        ),
        None => (DEFAULT_SIMPLIFICATION_SCORE, DEFAULT_EXTENSIVE_SCORE),
    };

    ComplexityScore {
        score,
        level: ComplexityLevel::from_score(score, LEVEL_CUTS),
        grade_equivalent: score.round() as i64,
        needs_simplification: score > simplify_at,
        needs_extensive_simplification: score > extensive_at,
        processing_strategy: ProcessingRecommendation::from_score(score),
    }
}

/// First integer in a grade string; kindergarten is grade 0
pub fn parse_grade_target(grade: &str) -> Option<f64> {
    let trimmed = grade.trim().to_lowercase();
    if trimmed == "k" || trimmed.starts_with("kinder") {
        return Some(0.0);
    }
    let digits: String = trimmed
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<f64>().ok()
}

fn structural_complexity(content: &str) -> StructuralComplexity {
    let sentences = text::sentences(content);
    let paragraphs = text::paragraphs(content);

    let mut lengths = Vec::with_capacity(sentences.len());
    let mut clauses = Vec::with_capacity(sentences.len());
    let mut scores = Vec::with_capacity(sentences.len());
    for sentence in &sentences {
        let words = text::word_count(sentence) as f64;
        let clause_count = text::clause_count(sentence) as f64;
        let conjunctions = CONJUNCTIONS.find_iter(sentence).count() as f64;
        lengths.push(words);
        clauses.push(clause_count);
        scores.push(words * 0.1 + clause_count * 0.3 + conjunctions * 0.2);
    }

    let organized = paragraphs
        .iter()
        .filter(|p| HEADING_LINE.is_match(p) || text::sentences(p).len() <= 5)
        .count();

    StructuralComplexity {
        average_sentence_length: text::mean(&lengths),
        average_clauses_per_sentence: text::mean(&clauses),
        average_paragraph_length: sentences.len() as f64 / paragraphs.len().max(1) as f64,
        sentence_complexity_score: text::mean(&scores),
        structural_variety: text::coefficient_of_variation(&lengths),
        organization_score: if paragraphs.is_empty() {
            0.0
        } else {
            organized as f64 / paragraphs.len() as f64
        },
    }
}

fn cognitive_load(content: &str) -> CognitiveLoad {
    let mut abstract_concepts = 0;
    let mut concrete_concepts = 0;
    let mut seen = std::collections::HashSet::new();

    for sentence in text::sentences(content) {
        for (i, raw) in sentence.split_whitespace().enumerate() {
            let word: String = raw.chars().filter(|c| c.is_alphabetic()).collect();
            if word.is_empty() || !seen.insert(word.to_lowercase()) {
                continue;
            }
            let lower = word.to_lowercase();
            let is_abstract = ["tion", "sion", "ment", "ity", "ism", "ness", "ence", "ance"]
                .iter()
                .any(|s| lower.ends_with(s) && lower.len() > 6);
            let is_proper = i > 0 && word.chars().next().map(char::is_uppercase).unwrap_or(false);
            let is_long = word.chars().count() >= 9;

            if is_abstract {
                abstract_concepts += 1;
            } else if is_proper || is_long {
                concrete_concepts += 1;
            }
        }
    }

    let word_count = text::word_count(content);
    let total_concepts = abstract_concepts + concrete_concepts;
    let concept_density = total_concepts as f64 / (word_count as f64 / 100.0).max(1.0);
    let sentence_count = text::sentences(content).len().max(1);
    let processing_demand =
        COGNITIVE_VERBS.find_iter(content).count() as f64 / sentence_count as f64 * 5.0;
    let abstract_ratio = if total_concepts == 0 {
        0.0
    } else {
        abstract_concepts as f64 / total_concepts as f64
    };

    CognitiveLoad {
        total_concepts,
        abstract_concepts,
        concrete_concepts,
        concept_density,
        processing_demand,
        cognitive_load_score: (concept_density * 0.5 + abstract_ratio * 5.0 + processing_demand)
            .min(SUB_SCORE_CAP),
    }
}

fn subject_complexity(content: &str, subject: Option<&str>) -> SubjectComplexity {
    let indicators: &[(&'static str, Regex)] = match subject.map(str::trim) {
        Some("Mathematics") | Some("Math") => MATH_INDICATORS.as_slice(),
        Some("Science") => SCIENCE_INDICATORS.as_slice(),
        Some("English Language Arts") | Some("ELA") => ELA_INDICATORS.as_slice(),
        Some("Social Studies") | Some("History") => SOCIAL_STUDIES_INDICATORS.as_slice(),
        _ => {
            return SubjectComplexity {
                score: 0.0,
                factors: Vec::new(),
            }
        }
    };

    let per_hundred = (text::word_count(content) as f64 / 100.0).max(1.0);
    let mut score = 0.0;
    let mut factors = Vec::new();
    for (name, re) in indicators {
        let hits = re.find_iter(content).count();
        if hits > 0 {
            factors.push(name.to_string());
            score += 2.0 + hits as f64 / per_hundred;
        }
    }

    SubjectComplexity {
        score: score.min(SUB_SCORE_CAP),
        factors,
    }
}

fn recommendations(
    overall: &ComplexityScore,
    readability: &ReadabilityReport,
    vocabulary: &VocabularyReport,
    structural: &StructuralComplexity,
    cognitive: &CognitiveLoad,
) -> Vec<String> {
    let mut out = Vec::new();
    if overall.needs_extensive_simplification {
        out.push("Content needs extensive simplification for the target grade".to_string());
    } else if overall.needs_simplification {
        out.push("Content needs moderate simplification for the target grade".to_string());
    }
    if vocabulary.complexity_score > 10.0 {
        out.push("Simplify vocabulary and pre-teach key academic terms".to_string());
    }
    if structural.average_sentence_length > 20.0 || readability.average_sentence_length > 20.0 {
        out.push("Break long sentences into shorter ones".to_string());
    }
    if cognitive.concept_density > 15.0 {
        out.push("Reduce concept load by introducing fewer ideas at a time".to_string());
    }
    if matches!(
        overall.processing_strategy,
        ProcessingRecommendation::Chunked | ProcessingRecommendation::MultiStep
    ) {
        out.push("Chunk content into smaller sections".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT_SIMPLE: &str = "Tom has a red ball. He likes to play in the park. \
        His dog runs with him. They play all day in the sun. At night Tom goes home. \
        He eats his food and goes to bed. The dog sleeps too.";

    #[tokio::test]
    async fn test_short_simple_text_needs_no_simplification() {
        assert!(text::word_count(SHORT_SIMPLE) <= 45);
        let report = ComplexityAnalyzer::new().analyze(SHORT_SIMPLE, None, None).await;
        assert!(report.overall.score < DEFAULT_SIMPLIFICATION_SCORE);
        assert!(!report.overall.needs_simplification);
        assert_eq!(
            report.overall.processing_strategy,
            ProcessingRecommendation::Direct
        );
    }

    #[tokio::test]
    async fn test_dense_text_scores_higher() {
        let dense = "The constitutional ramifications of the legislation, although \
            fundamentally controversial, necessitated comprehensive reevaluation of \
            governmental accountability mechanisms; consequently, administrative \
            institutions implemented substantive organizational transformations.";
        let analyzer = ComplexityAnalyzer::new();
        let simple = analyzer.analyze(SHORT_SIMPLE, None, None).await;
        let complex = analyzer.analyze(dense, Some("Social Studies"), Some("4")).await;
        assert!(complex.overall.score > simple.overall.score + 5.0);
        assert!(complex.overall.needs_simplification);
        assert!(!complex.recommendations.is_empty());
    }

    #[test]
    fn test_flags_are_monotonic_in_score() {
        for grade in [None, Some(0.0), Some(5.0), Some(11.0)] {
            let mut was_simplify = false;
            let mut was_extensive = false;
            let mut score = 0.0;
            while score < 25.0 {
                let overall = score_overall(score, grade);
                assert!(!(was_simplify && !overall.needs_simplification));
                assert!(!(was_extensive && !overall.needs_extensive_simplification));
                was_simplify = overall.needs_simplification;
                was_extensive = overall.needs_extensive_simplification;
                score += 0.25;
            }
            assert!(was_extensive);
        }
    }

    #[test]
    fn test_negative_composite_clamped_to_zero() {
        let overall = score_overall(-3.4, None);
        assert_eq!(overall.score, 0.0);
        assert_eq!(overall.grade_equivalent, 0);
        assert_eq!(overall.level, ComplexityLevel::VerySimple);
    }

    #[tokio::test]
    async fn test_trivial_text_never_scores_below_zero() {
        let report = ComplexityAnalyzer::new().analyze("Go. Run. Sit. Eat.", None, Some("K")).await;
        assert!(report.overall.score >= 0.0);
        assert!(report.overall.grade_equivalent >= 0);
    }

    #[test]
    fn test_grade_offsets() {
        let overall = score_overall(6.5, Some(5.0));
        assert!(overall.needs_simplification);
        assert!(!overall.needs_extensive_simplification);
        assert_eq!(overall.grade_equivalent, 7);
        assert_eq!(overall.level, ComplexityLevel::Moderate);
    }

    #[test]
    fn test_parse_grade_target() {
        assert_eq!(parse_grade_target("Grade 7"), Some(7.0));
        assert_eq!(parse_grade_target("10th"), Some(10.0));
        assert_eq!(parse_grade_target("K"), Some(0.0));
        assert_eq!(parse_grade_target("Kindergarten"), Some(0.0));
        assert_eq!(parse_grade_target("college"), None);
    }

    #[test]
    fn test_recommendation_bands() {
        assert_eq!(ProcessingRecommendation::from_score(5.9), ProcessingRecommendation::Direct);
        assert_eq!(ProcessingRecommendation::from_score(9.0), ProcessingRecommendation::Standard);
        assert_eq!(ProcessingRecommendation::from_score(14.9), ProcessingRecommendation::Chunked);
        assert_eq!(ProcessingRecommendation::from_score(15.0), ProcessingRecommendation::MultiStep);
    }

    #[test]
    fn test_unknown_subject_scores_zero() {
        let result = subject_complexity("anything 1 + 2 + 3", Some("Art"));
        assert_eq!(result.score, 0.0);
        let math = subject_complexity("x = 4 and 1 + 2 + 3 and 3/4", Some("Mathematics"));
        assert!(math.score > 0.0);
        assert!(math.factors.contains(&"fractions".to_string()));
    }
}
