//! Pipeline step identifiers and step-list validation

use serde::{Deserialize, Serialize};

use crate::error::{AdaptError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Preprocess,
    Chunk,
    Adapt,
    Merge,
    Enhance,
    CreateStructure,
    InsertContent,
    Validate,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Preprocess => "preprocess",
            StepKind::Chunk => "chunk",
            StepKind::Adapt => "adapt",
            StepKind::Merge => "merge",
            StepKind::Enhance => "enhance",
            StepKind::CreateStructure => "createStructure",
            StepKind::InsertContent => "insertContent",
            StepKind::Validate => "validate",
        }
    }

    /// Parse a list of step names, failing on the first unknown one
    pub fn parse_list(names: &[&str]) -> Result<Vec<StepKind>> {
        names.iter().map(|n| n.parse()).collect()
    }
}

impl std::str::FromStr for StepKind {
    type Err = AdaptError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "preprocess" => Ok(StepKind::Preprocess),
            "chunk" => Ok(StepKind::Chunk),
            "adapt" => Ok(StepKind::Adapt),
            "merge" => Ok(StepKind::Merge),
            "enhance" => Ok(StepKind::Enhance),
            "createStructure" => Ok(StepKind::CreateStructure),
            "insertContent" => Ok(StepKind::InsertContent),
            "validate" => Ok(StepKind::Validate),
            other => Err(AdaptError::invalid_input(format!("Unknown pipeline step: {}", other))),
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check ordering constraints between steps before anything runs
pub fn validate_steps(steps: &[StepKind]) -> Result<()> {
    if steps.is_empty() {
        return Err(AdaptError::invalid_input("Pipeline has no steps"));
    }

    let position = |kind: StepKind| steps.iter().position(|s| *s == kind);
    let requires_before = |step: StepKind, earlier: StepKind| -> Result<()> {
        if let Some(at) = position(step) {
            match position(earlier) {
                Some(before) if before < at => {}
                _ => {
                    return Err(AdaptError::invalid_input(format!(
                        "Step '{}' requires an earlier '{}' step",
                        step, earlier
                    )))
                }
            }
        }
        Ok(())
    };

    requires_before(StepKind::Merge, StepKind::Chunk)?;
    requires_before(StepKind::Merge, StepKind::Adapt)?;
    requires_before(StepKind::InsertContent, StepKind::CreateStructure)?;

    // Chunked adaptation output only reaches the result through merge
    if let Some(chunk_at) = position(StepKind::Chunk) {
        if !steps[chunk_at..].contains(&StepKind::Merge) {
            return Err(AdaptError::invalid_input("Step 'chunk' requires a later 'merge' step"));
        }
    }

    if let Some(at) = position(StepKind::Validate) {
        if at != steps.len() - 1 {
            return Err(AdaptError::invalid_input("Step 'validate' must be the last step"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use StepKind::*;

    #[test]
    fn test_parse_camel_case_names() {
        let steps = StepKind::parse_list(&["preprocess", "createStructure", "insertContent", "validate"]).unwrap();
        assert_eq!(steps, vec![Preprocess, CreateStructure, InsertContent, Validate]);
        assert_eq!(CreateStructure.as_str(), "createStructure");
    }

    #[test]
    fn test_unknown_step_rejected() {
        let err = StepKind::parse_list(&["preprocess", "summarize"]).unwrap_err();
        assert!(matches!(err, AdaptError::InvalidInput(ref m) if m.contains("summarize")));
    }

    #[test]
    fn test_valid_orders() {
        assert!(validate_steps(&[Preprocess, Adapt, Validate]).is_ok());
        assert!(validate_steps(&[Preprocess, Chunk, Adapt, Merge, Enhance, Validate]).is_ok());
        assert!(validate_steps(&[Preprocess, CreateStructure, InsertContent, Validate]).is_ok());
    }

    #[test]
    fn test_invalid_orders() {
        assert!(validate_steps(&[]).is_err());
        assert!(validate_steps(&[Adapt, Merge]).is_err());
        assert!(validate_steps(&[Chunk, Merge, Adapt]).is_err());
        assert!(validate_steps(&[Chunk, Adapt]).is_err());
        assert!(validate_steps(&[InsertContent, CreateStructure]).is_err());
        assert!(validate_steps(&[Preprocess, Validate, Adapt]).is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        assert_eq!(serde_json::to_string(&InsertContent).unwrap(), "\"insertContent\"");
    }
}
