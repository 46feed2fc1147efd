//! Output validation
//!
//! Scores a finished adaptation along five independent components (print
//! readiness, vocabulary integration, structural integrity, WIDA compliance
//! and overall quality) and folds them into one weighted report. Components
//! run concurrently and are reassembled by name.

pub mod print;
pub mod quality;
pub mod structure;
pub mod supports;
pub mod vocabulary;
pub mod wida;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::models::AdaptationParams;

pub use print::PrintReport;
pub use quality::QualityReport;
pub use structure::StructureReport;
pub use vocabulary::VocabularyIntegrationReport;
pub use wida::WidaReport;

/// Default minimum overall score for `passes_threshold`
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A single finding from one validator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    pub auto_fixable: bool,
    /// Byte offset into the worksheet, when the finding has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<usize>,
}

impl Issue {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            message: message.into(),
            suggestion: suggestion.into(),
            auto_fixable: false,
            location: None,
        }
    }

    pub fn auto_fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }

    pub fn at(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }
}

/// Fields every component report carries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReport {
    pub is_valid: bool,
    pub score: f64,
    pub weight: f64,
    pub issues: Vec<Issue>,
    pub summary: String,
}

impl ComponentReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Component {
    PrintReadiness,
    VocabularyIntegration,
    StructuralIntegrity,
    WidaCompliance,
    Quality,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::PrintReadiness => "printReadiness",
            Component::VocabularyIntegration => "vocabularyIntegration",
            Component::StructuralIntegrity => "structuralIntegrity",
            Component::WidaCompliance => "widaCompliance",
            Component::Quality => "quality",
        }
    }
}

/// An issue tagged with the component that raised it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIssue {
    pub component: Component,
    #[serde(flatten)]
    pub issue: Issue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: String,
    pub priority: Priority,
    pub issue: String,
    pub suggestion: String,
    pub auto_fixable: bool,
}

impl Recommendation {
    fn new(category: &str, priority: Priority, issue: &str, suggestion: &str) -> Self {
        Self {
            category: category.to_string(),
            priority,
            issue: issue.to_string(),
            suggestion: suggestion.to_string(),
            auto_fixable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallValidation {
    pub is_valid: bool,
    pub score: f64,
    pub passes_threshold: bool,
    pub issues: Vec<ComponentIssue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_readiness: Option<PrintReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_integration: Option<VocabularyIntegrationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_integrity: Option<StructureReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wida_compliance: Option<WidaReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
    pub overall: OverallValidation,
    pub recommendations: Vec<Recommendation>,
}

impl ValidationReport {
    /// Component reports that ran, keyed by component
    pub fn components(&self) -> Vec<(Component, &ComponentReport)> {
        let mut out = Vec::new();
        if let Some(r) = &self.print_readiness {
            out.push((Component::PrintReadiness, &r.report));
        }
        if let Some(r) = &self.vocabulary_integration {
            out.push((Component::VocabularyIntegration, &r.report));
        }
        if let Some(r) = &self.structural_integrity {
            out.push((Component::StructuralIntegrity, &r.report));
        }
        if let Some(r) = &self.wida_compliance {
            out.push((Component::WidaCompliance, &r.report));
        }
        if let Some(r) = &self.quality {
            out.push((Component::Quality, &r.report));
        }
        out
    }

    pub fn component(&self, component: Component) -> Option<&ComponentReport> {
        self.components()
            .into_iter()
            .find(|(c, _)| *c == component)
            .map(|(_, r)| r)
    }
}

/// Which components to run and the pass threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    pub check_print_readiness: bool,
    pub check_vocabulary_integration: bool,
    pub check_structural_integrity: bool,
    pub check_wida_compliance: bool,
    pub check_quality: bool,
    pub quality_threshold: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_print_readiness: true,
            check_vocabulary_integration: true,
            check_structural_integrity: true,
            check_wida_compliance: true,
            check_quality: true,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputValidator {
    options: ValidationOptions,
}

impl OutputValidator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    pub async fn validate(
        &self,
        student_worksheet: &str,
        teacher_guide: &str,
        params: &AdaptationParams,
    ) -> ValidationReport {
        let opts = &self.options;
        debug!(
            worksheet_chars = student_worksheet.len(),
            guide_chars = teacher_guide.len(),
            "[Validation] Running output validators"
        );

        let (print_readiness, vocabulary_integration, structural_integrity, wida_compliance, quality) = tokio::join!(
            async { opts.check_print_readiness.then(|| print::validate(student_worksheet)) },
            async { opts.check_vocabulary_integration.then(|| vocabulary::validate(student_worksheet)) },
            async { opts.check_structural_integrity.then(|| structure::validate(student_worksheet)) },
            async { opts.check_wida_compliance.then(|| wida::validate(student_worksheet, params)) },
            async {
                opts.check_quality
                    .then(|| quality::validate(student_worksheet, teacher_guide, params))
            },
        );

        let mut report = ValidationReport {
            timestamp: Utc::now(),
            print_readiness,
            vocabulary_integration,
            structural_integrity,
            wida_compliance,
            quality,
            overall: OverallValidation {
                is_valid: true,
                score: 1.0,
                passes_threshold: true,
                issues: Vec::new(),
            },
            recommendations: Vec::new(),
        };

        report.overall = aggregate(&report, opts.quality_threshold);
        report.recommendations = recommendations(&report);

        info!(
            score = report.overall.score,
            is_valid = report.overall.is_valid,
            passes_threshold = report.overall.passes_threshold,
            issues = report.overall.issues.len(),
            "[Validation] Output validated"
        );
        report
    }
}

/// Weighted mean of the components that ran; 1.0 when none did
fn aggregate(report: &ValidationReport, threshold: f64) -> OverallValidation {
    let components = report.components();

    let total_weight: f64 = components.iter().map(|(_, r)| r.weight).sum();
    let score = if total_weight > 0.0 {
        components.iter().map(|(_, r)| r.score * r.weight).sum::<f64>() / total_weight
    } else {
        1.0
    };

    let issues = components
        .iter()
        .flat_map(|(component, r)| {
            r.issues.iter().cloned().map(move |issue| ComponentIssue {
                component: *component,
                issue,
            })
        })
        .collect();

    OverallValidation {
        is_valid: components.iter().all(|(_, r)| r.is_valid),
        score,
        passes_threshold: score >= threshold,
        issues,
    }
}

fn recommendations(report: &ValidationReport) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if let Some(print) = &report.print_readiness {
        if !print.report.is_valid {
            let mut rec = Recommendation::new(
                "Print Readiness",
                Priority::High,
                "Content not ready for printing",
                "Review and fix formatting issues, remove placeholders",
            );
            rec.auto_fixable = print.auto_fixable;
            out.push(rec);
        }
    }

    if let Some(vocab) = &report.vocabulary_integration {
        if vocab.report.score < vocabulary::VALID_SCORE {
            out.push(Recommendation::new(
                "Vocabulary",
                Priority::Medium,
                "Insufficient vocabulary integration",
                "Bold more key terms and add vocabulary definitions",
            ));
        }
    }

    if let Some(structure) = &report.structural_integrity {
        if !structure.report.is_valid {
            out.push(Recommendation::new(
                "Structure",
                Priority::High,
                "Structural integrity issues detected",
                "Review content organization and formatting consistency",
            ));
        }
    }

    if let Some(wida) = &report.wida_compliance {
        if wida.report.score < 0.8 {
            out.push(Recommendation::new(
                "WIDA Compliance",
                Priority::High,
                "Content may not align with WIDA standards",
                "Review language complexity and proficiency level alignment",
            ));
        }
    }

    if report.overall.score < 0.7 {
        out.push(Recommendation::new(
            "Overall Quality",
            Priority::High,
            "Content quality below threshold",
            "Consider regenerating with different parameters",
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_WORKSHEET: &str = "# The Water Cycle\n\n\
## Key Vocabulary\n\
**evaporation**: water turns into gas.\n\
**condensation**: gas turns into water drops.\n\
**precipitation**: water falls from clouds.\n\n\
Directions: Read the text. Then answer the questions.\n\n\
The sun heats water in the ocean. The water turns into gas. This is **evaporation**. \
The gas goes up into the sky. It cools and makes clouds. This is **condensation**. \
Rain falls from the clouds. This is **precipitation**. Scientists observe the data.\n\n\
1. What is evaporation?\n\
2. What makes clouds?\n\
3. What falls from the clouds?\n";

    fn params() -> AdaptationParams {
        let mut params = AdaptationParams::new(
            "The sun heats water in the ocean and the water evaporates into the atmosphere.",
            "Science",
            "expanding",
        );
        params.grade_level = Some("5".into());
        params
    }

    #[tokio::test]
    async fn test_all_components_run_by_default() {
        let validator = OutputValidator::default();
        let report = validator
            .validate(GOOD_WORKSHEET, "Teacher guide with answer key and notes for the lesson.", &params())
            .await;

        let names: Vec<&str> = report.components().iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "printReadiness",
                "vocabularyIntegration",
                "structuralIntegrity",
                "widaCompliance",
                "quality"
            ]
        );
        assert!(report.overall.score > 0.0 && report.overall.score <= 1.0);
        assert!(report.print_readiness.as_ref().unwrap().report.is_valid);
    }

    #[tokio::test]
    async fn test_no_components_scores_one() {
        let validator = OutputValidator::new(ValidationOptions {
            check_print_readiness: false,
            check_vocabulary_integration: false,
            check_structural_integrity: false,
            check_wida_compliance: false,
            check_quality: false,
            quality_threshold: 0.8,
        });
        let report = validator.validate("anything", "", &params()).await;
        assert!(report.components().is_empty());
        assert_eq!(report.overall.score, 1.0);
        assert!(report.overall.is_valid);
        assert!(report.overall.passes_threshold);
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_skipped_numbering_is_one_major_issue() {
        let validator = OutputValidator::new(ValidationOptions {
            check_vocabulary_integration: false,
            check_structural_integrity: false,
            check_wida_compliance: false,
            check_quality: false,
            ..Default::default()
        });
        let worksheet = "Directions: Answer each question.\n1. First?\n2. Second?\n4. Third?";
        let report = validator.validate(worksheet, "", &params()).await;

        let print = report.print_readiness.as_ref().unwrap();
        assert_eq!(print.report.issues.len(), 1);
        assert_eq!(print.report.issues[0].severity, Severity::Major);
        assert_eq!(print.report.issues[0].message, "Numbering error: Found 2 followed by 4");
        assert!(print.report.is_valid);
        assert!(report.overall.is_valid);
    }

    #[tokio::test]
    async fn test_placeholder_invalidates_and_recommends_fix() {
        let validator = OutputValidator::new(ValidationOptions {
            check_quality: false,
            check_wida_compliance: false,
            ..Default::default()
        });
        let worksheet = format!("{}\n[Insert passage here]\n", GOOD_WORKSHEET);
        let report = validator.validate(&worksheet, "", &params()).await;

        assert!(!report.overall.is_valid);
        let rec = &report.recommendations[0];
        assert_eq!(rec.category, "Print Readiness");
        assert_eq!(rec.priority, Priority::High);
        assert!(rec.auto_fixable);
        assert!(report
            .overall
            .issues
            .iter()
            .any(|i| i.component == Component::PrintReadiness && i.issue.severity == Severity::Critical));
    }

    #[test]
    fn test_aggregate_is_weighted_mean() {
        let component = |score: f64, weight: f64| ComponentReport {
            is_valid: true,
            score,
            weight,
            issues: Vec::new(),
            summary: String::new(),
        };
        let report = ValidationReport {
            timestamp: Utc::now(),
            print_readiness: Some(PrintReport {
                report: component(1.0, 0.3),
                auto_fixable: false,
            }),
            vocabulary_integration: None,
            structural_integrity: Some(StructureReport {
                report: component(0.5, 0.2),
                checks: Default::default(),
            }),
            wida_compliance: None,
            quality: None,
            overall: OverallValidation {
                is_valid: true,
                score: 0.0,
                passes_threshold: false,
                issues: Vec::new(),
            },
            recommendations: Vec::new(),
        };

        let overall = aggregate(&report, 0.75);
        assert!((overall.score - 0.8).abs() < 1e-9);
        assert!(overall.passes_threshold);
        assert_eq!(
            report.component(Component::StructuralIntegrity).map(|r| r.score),
            Some(0.5)
        );
    }
}
