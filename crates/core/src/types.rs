//! Shared identifier and enum types used across the builder engine.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Blocks are identified by a v4 UUID, stable for the lifetime of a draft.
pub type BlockId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

// ---------------------------------------------------------------------------
// Study type
// ---------------------------------------------------------------------------

/// The research method a study is built around.
///
/// Each study type declares its own structural rules (applicable block
/// types, block-count ceiling) in the [`BlockCatalog`](crate::catalog::BlockCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyType {
    UsabilityTest,
    PrototypeTest,
    Survey,
    UserInterview,
    CardSorting,
    TreeTesting,
}

/// All study types, in display order.
pub const ALL_STUDY_TYPES: &[StudyType] = &[
    StudyType::UsabilityTest,
    StudyType::PrototypeTest,
    StudyType::Survey,
    StudyType::UserInterview,
    StudyType::CardSorting,
    StudyType::TreeTesting,
];

impl StudyType {
    /// Parse a wire string into a `StudyType`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "usability_test" => Ok(Self::UsabilityTest),
            "prototype_test" => Ok(Self::PrototypeTest),
            "survey" => Ok(Self::Survey),
            "user_interview" => Ok(Self::UserInterview),
            "card_sorting" => Ok(Self::CardSorting),
            "tree_testing" => Ok(Self::TreeTesting),
            _ => Err(CoreError::Validation(format!(
                "Invalid study type '{s}'. Must be one of: usability_test, prototype_test, \
                 survey, user_interview, card_sorting, tree_testing"
            ))),
        }
    }

    /// Convert to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsabilityTest => "usability_test",
            Self::PrototypeTest => "prototype_test",
            Self::Survey => "survey",
            Self::UserInterview => "user_interview",
            Self::CardSorting => "card_sorting",
            Self::TreeTesting => "tree_testing",
        }
    }

    /// Human-readable label for display in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UsabilityTest => "Usability Test",
            Self::PrototypeTest => "Prototype Test",
            Self::Survey => "Survey",
            Self::UserInterview => "User Interview",
            Self::CardSorting => "Card Sorting",
            Self::TreeTesting => "Tree Testing",
        }
    }
}

// ---------------------------------------------------------------------------
// Session type
// ---------------------------------------------------------------------------

/// Whether participants complete the study on their own or with a
/// moderator present. Moderated studies get an extra wizard step for
/// session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Moderated,
    Unmoderated,
}

impl SessionType {
    /// Parse a wire string into a `SessionType`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "moderated" => Ok(Self::Moderated),
            "unmoderated" => Ok(Self::Unmoderated),
            _ => Err(CoreError::Validation(format!(
                "Invalid session type '{s}'. Must be one of: moderated, unmoderated"
            ))),
        }
    }

    /// Convert to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Moderated => "moderated",
            Self::Unmoderated => "unmoderated",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
