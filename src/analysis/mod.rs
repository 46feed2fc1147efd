//! Text analysis: content structure, language and complexity scoring

pub mod complexity;
pub mod content;
pub mod language;
pub mod patterns;
pub mod readability;
pub mod structure;
pub mod text;
pub mod vocabulary;

pub use complexity::{ComplexityAnalyzer, ComplexityReport, ComplexityScore, ProcessingRecommendation};
pub use content::{ContentAnalysis, ContentAnalyzer};
pub use language::ComplexityLevel;
pub use patterns::{ContentType, QuestionType};
