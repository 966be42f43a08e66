//! Validation issue and result types.
//!
//! Issues are data returned from the engine and rendered inline next to
//! the offending field or step — they are never raised as errors.

use serde::Serialize;

use crate::types::BlockId;

/// Stable machine-readable codes for validation issues.
pub mod codes {
    // Study-level structure
    pub const NO_BLOCKS: &str = "no_blocks";
    pub const TOO_MANY_BLOCKS: &str = "too_many_blocks";
    pub const STUDY_TOO_LONG: &str = "study_too_long";
    pub const MUST_OPEN_WITH: &str = "must_open_with";
    pub const MUST_CLOSE_WITH: &str = "must_close_with";

    // Setup / participants / session
    pub const INVALID_SETUP_FIELD: &str = "invalid_setup_field";
    pub const INVALID_TARGET_PARTICIPANTS: &str = "invalid_target_participants";
    pub const MISSING_SESSION_DURATION: &str = "missing_session_duration";
    pub const SESSION_DURATION_OUT_OF_RANGE: &str = "session_duration_out_of_range";
    pub const RECORDING_DISABLED: &str = "recording_disabled";

    // Per-block fields
    pub const EMPTY_BLOCK_NAME: &str = "empty_block_name";
    pub const MISSING_DESCRIPTION: &str = "missing_description";
    pub const DURATION_OUT_OF_RANGE: &str = "duration_out_of_range";
    pub const BLOCK_NOT_APPLICABLE: &str = "block_not_applicable";

    // Type-specific settings
    pub const MISSING_QUESTION: &str = "missing_question";
    pub const TOO_FEW_OPTIONS: &str = "too_few_options";
    pub const INVALID_SCALE_BOUNDS: &str = "invalid_scale_bounds";
    pub const MISSING_IMAGE: &str = "missing_image";
    pub const DISPLAY_DURATION_OUT_OF_RANGE: &str = "display_duration_out_of_range";
    pub const NO_CARDS: &str = "no_cards";
    pub const TOO_FEW_CATEGORIES: &str = "too_few_categories";
    pub const EMPTY_TREE: &str = "empty_tree";
    pub const MISSING_TASK: &str = "missing_task";
    pub const NO_QUALIFYING_OPTIONS: &str = "no_qualifying_options";
    pub const MISSING_URL: &str = "missing_url";
    pub const MISSING_PROMPT: &str = "missing_prompt";
    pub const INVALID_MAX_FILES: &str = "invalid_max_files";
}

/// What a validation issue is anchored to: the draft as a whole, or a
/// single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueScope {
    Draft,
    Block(BlockId),
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub scope: IssueScope,
    pub code: &'static str,
    pub message: String,
}

impl ValidationIssue {
    pub fn draft(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            scope: IssueScope::Draft,
            code,
            message: message.into(),
        }
    }

    pub fn block(id: BlockId, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            scope: IssueScope::Block(id),
            code,
            message: message.into(),
        }
    }
}

/// Aggregated outcome of validating a draft (or a per-step subset of it).
///
/// Errors block wizard progression; warnings are advisory and never block.
/// Derived on every relevant mutation, never cached across edits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Build a result, deriving `is_valid` from the error list.
    pub fn new(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A passing result with no findings.
    pub fn valid() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.is_valid = self.errors.is_empty();
    }

    /// Whether any error or warning carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().chain(&self.warnings).any(|i| i.code == code)
    }

    /// Issues (errors and warnings) scoped to one block.
    pub fn issues_for_block(&self, id: BlockId) -> Vec<&ValidationIssue> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .filter(|i| i.scope == IssueScope::Block(id))
            .collect()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_validity_from_errors() {
        let ok = ValidationResult::new(vec![], vec![]);
        assert!(ok.is_valid);

        let warned = ValidationResult::new(
            vec![],
            vec![ValidationIssue::draft(codes::STUDY_TOO_LONG, "long")],
        );
        assert!(warned.is_valid, "warnings must not invalidate");

        let failed = ValidationResult::new(
            vec![ValidationIssue::draft(codes::NO_BLOCKS, "empty")],
            vec![],
        );
        assert!(!failed.is_valid);
    }

    #[test]
    fn merge_combines_and_rederives_validity() {
        let mut result = ValidationResult::valid();
        result.merge(ValidationResult::new(
            vec![ValidationIssue::draft(codes::NO_BLOCKS, "empty")],
            vec![ValidationIssue::draft(codes::STUDY_TOO_LONG, "long")],
        ));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn issues_for_block_filters_by_scope() {
        let id = uuid::Uuid::new_v4();
        let other = uuid::Uuid::new_v4();
        let result = ValidationResult::new(
            vec![
                ValidationIssue::block(id, codes::EMPTY_BLOCK_NAME, "name"),
                ValidationIssue::block(other, codes::MISSING_QUESTION, "question"),
            ],
            vec![ValidationIssue::draft(codes::STUDY_TOO_LONG, "long")],
        );
        let for_block = result.issues_for_block(id);
        assert_eq!(for_block.len(), 1);
        assert_eq!(for_block[0].code, codes::EMPTY_BLOCK_NAME);
    }

    #[test]
    fn has_code_checks_both_lists() {
        let result = ValidationResult::new(
            vec![ValidationIssue::draft(codes::NO_BLOCKS, "e")],
            vec![ValidationIssue::draft(codes::STUDY_TOO_LONG, "w")],
        );
        assert!(result.has_code(codes::NO_BLOCKS));
        assert!(result.has_code(codes::STUDY_TOO_LONG));
        assert!(!result.has_code(codes::MISSING_QUESTION));
    }
}
