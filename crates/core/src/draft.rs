//! The mutable working document a researcher edits in the builder.
//!
//! A draft holds no server identity; it is created empty or seeded from a
//! template, mutated block-by-block through the wizard, and either
//! discarded or handed to the external study-creation API as a
//! [`StudySubmission`] payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::block::Block;
use crate::block_list::OrderedBlockList;
use crate::error::CoreError;
use crate::template::StudyTemplate;
use crate::types::{SessionType, StudyType, Timestamp};

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Maximum length for a study title.
pub const MAX_TITLE_LEN: u64 = 200;

/// Maximum length for a study description.
pub const MAX_DESCRIPTION_LEN: u64 = 5000;

/// Upper bound on requested participants.
pub const MAX_TARGET_PARTICIPANTS: u32 = 10_000;

/// Study-level metadata captured on the wizard's first step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudySetup {
    #[validate(length(min = 1, max = MAX_TITLE_LEN, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = MAX_DESCRIPTION_LEN, message = "Description is too long"))]
    pub description: String,

    pub study_type: StudyType,

    pub session_type: SessionType,

    #[validate(range(min = 1, max = MAX_TARGET_PARTICIPANTS, message = "Participant target must be at least 1"))]
    pub target_participants: u32,

    /// Planned session length for moderated studies, in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration_mins: Option<u32>,

    /// Free-text incentive description, e.g. "$25 gift card".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation: Option<String>,
}

impl StudySetup {
    /// A minimal unmoderated setup, the from-scratch starting point.
    pub fn new(title: impl Into<String>, study_type: StudyType) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            study_type,
            session_type: SessionType::Unmoderated,
            target_participants: 10,
            session_duration_mins: None,
            compensation: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Recording and tracking flags applied to the whole study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudySettings {
    pub record_screen: bool,
    pub record_audio: bool,
    pub record_webcam: bool,
    pub track_clicks: bool,
    pub collect_device_info: bool,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// The working document: setup, ordered blocks, and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDraft {
    pub setup: StudySetup,
    pub blocks: OrderedBlockList,
    pub settings: StudySettings,
    pub created_at: Timestamp,
}

impl StudyDraft {
    /// Create an empty from-scratch draft.
    pub fn new(setup: StudySetup) -> Self {
        Self {
            setup,
            blocks: OrderedBlockList::new(),
            settings: StudySettings::default(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Seed a draft from a template. The instantiated list behaves
    /// identically to a from-scratch one for all subsequent mutations.
    pub fn from_template(
        setup: StudySetup,
        template: &StudyTemplate,
        bindings: &HashMap<String, String>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            setup,
            blocks: template.instantiate(bindings)?,
            settings: StudySettings::default(),
            created_at: chrono::Utc::now(),
        })
    }

    /// Build the submission payload handed to the external study-creation
    /// API. The draft itself stays server-identity-free; any id comes back
    /// from the collaborator on success.
    pub fn submission_payload(&self) -> StudySubmission {
        StudySubmission {
            setup: self.setup.clone(),
            blocks: self.blocks.as_slice().to_vec(),
            settings: self.settings,
        }
    }
}

// ---------------------------------------------------------------------------
// Submission payload
// ---------------------------------------------------------------------------

/// The structurally valid payload produced on submit: setup fields, the
/// ordered block array, and the settings flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySubmission {
    pub setup: StudySetup,
    pub blocks: Vec<Block>,
    pub settings: StudySettings,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    #[test]
    fn new_draft_starts_empty() {
        let draft = StudyDraft::new(StudySetup::new("Checkout study", StudyType::UsabilityTest));
        assert!(draft.blocks.is_empty());
        assert_eq!(draft.settings, StudySettings::default());
    }

    #[test]
    fn setup_validation_rejects_empty_title() {
        let mut setup = StudySetup::new("ok", StudyType::Survey);
        assert!(setup.validate().is_ok());
        setup.title.clear();
        assert!(setup.validate().is_err());
    }

    #[test]
    fn setup_validation_rejects_zero_participants() {
        let mut setup = StudySetup::new("ok", StudyType::Survey);
        setup.target_participants = 0;
        assert!(setup.validate().is_err());
    }

    #[test]
    fn submission_payload_carries_ordered_blocks() {
        let mut draft =
            StudyDraft::new(StudySetup::new("Nav study", StudyType::TreeTesting));
        draft.blocks.insert(Block::new(BlockType::Welcome, "Hi"), None);
        draft.blocks.insert(Block::new(BlockType::TreeTest, "Find it"), None);

        let payload = draft.submission_payload();
        assert_eq!(payload.blocks.len(), 2);
        assert_eq!(payload.blocks[0].order, 0);
        assert_eq!(payload.blocks[1].order, 1);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["setup"]["studyType"], "tree_testing");
        assert_eq!(json["blocks"][1]["type"], "tree_test");
        assert_eq!(json["settings"]["recordScreen"], false);
    }

    #[test]
    fn draft_roundtrips_through_json() {
        let mut draft = StudyDraft::new(StudySetup::new("Round trip", StudyType::Survey));
        draft
            .blocks
            .insert(Block::new(BlockType::OpenQuestion, "Q1"), None);
        let json = serde_json::to_string(&draft).unwrap();
        let back: StudyDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(back, draft);
    }
}
