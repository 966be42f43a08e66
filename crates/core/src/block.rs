//! Block model: the unit of participant experience.
//!
//! A block's `settings` bag is an open JSON object whose valid keys are
//! determined by the block type. Unknown keys are tolerated (forward
//! compatibility); unknown *types* are a hard error at every boundary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::BlockId;

// ---------------------------------------------------------------------------
// Duration bounds
// ---------------------------------------------------------------------------

/// Minimum estimated duration for a single block, in minutes.
pub const MIN_BLOCK_DURATION_MINS: u32 = 1;

/// Maximum estimated duration for a single block, in minutes.
pub const MAX_BLOCK_DURATION_MINS: u32 = 180;

// ---------------------------------------------------------------------------
// Block type
// ---------------------------------------------------------------------------

/// The closed set of block types participants can encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Welcome,
    OpenQuestion,
    OpinionScale,
    SimpleInput,
    MultipleChoice,
    ContextScreen,
    YesNo,
    FiveSecondTest,
    CardSort,
    TreeTest,
    Screener,
    PrototypeTest,
    LiveWebsiteTest,
    ThankYou,
    ImageUpload,
    FileUpload,
}

/// All block types, in catalog order.
pub const ALL_BLOCK_TYPES: &[BlockType] = &[
    BlockType::Welcome,
    BlockType::OpenQuestion,
    BlockType::OpinionScale,
    BlockType::SimpleInput,
    BlockType::MultipleChoice,
    BlockType::ContextScreen,
    BlockType::YesNo,
    BlockType::FiveSecondTest,
    BlockType::CardSort,
    BlockType::TreeTest,
    BlockType::Screener,
    BlockType::PrototypeTest,
    BlockType::LiveWebsiteTest,
    BlockType::ThankYou,
    BlockType::ImageUpload,
    BlockType::FileUpload,
];

impl BlockType {
    /// Parse a wire string into a `BlockType`.
    ///
    /// Unknown strings fail with [`CoreError::UnknownBlockType`] — templates
    /// or catalog entries carrying a type outside the closed set are
    /// authoring errors and must fail closed, never be silently skipped.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "welcome" => Ok(Self::Welcome),
            "open_question" => Ok(Self::OpenQuestion),
            "opinion_scale" => Ok(Self::OpinionScale),
            "simple_input" => Ok(Self::SimpleInput),
            "multiple_choice" => Ok(Self::MultipleChoice),
            "context_screen" => Ok(Self::ContextScreen),
            "yes_no" => Ok(Self::YesNo),
            "five_second_test" => Ok(Self::FiveSecondTest),
            "card_sort" => Ok(Self::CardSort),
            "tree_test" => Ok(Self::TreeTest),
            "screener" => Ok(Self::Screener),
            "prototype_test" => Ok(Self::PrototypeTest),
            "live_website_test" => Ok(Self::LiveWebsiteTest),
            "thank_you" => Ok(Self::ThankYou),
            "image_upload" => Ok(Self::ImageUpload),
            "file_upload" => Ok(Self::FileUpload),
            _ => Err(CoreError::UnknownBlockType {
                type_name: s.to_string(),
            }),
        }
    }

    /// Convert to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::OpenQuestion => "open_question",
            Self::OpinionScale => "opinion_scale",
            Self::SimpleInput => "simple_input",
            Self::MultipleChoice => "multiple_choice",
            Self::ContextScreen => "context_screen",
            Self::YesNo => "yes_no",
            Self::FiveSecondTest => "five_second_test",
            Self::CardSort => "card_sort",
            Self::TreeTest => "tree_test",
            Self::Screener => "screener",
            Self::PrototypeTest => "prototype_test",
            Self::LiveWebsiteTest => "live_website_test",
            Self::ThankYou => "thank_you",
            Self::ImageUpload => "image_upload",
            Self::FileUpload => "file_upload",
        }
    }

    /// Human-readable label for display in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome Screen",
            Self::OpenQuestion => "Open Question",
            Self::OpinionScale => "Opinion Scale",
            Self::SimpleInput => "Simple Input",
            Self::MultipleChoice => "Multiple Choice",
            Self::ContextScreen => "Context Screen",
            Self::YesNo => "Yes / No",
            Self::FiveSecondTest => "Five Second Test",
            Self::CardSort => "Card Sort",
            Self::TreeTest => "Tree Test",
            Self::Screener => "Screener",
            Self::PrototypeTest => "Prototype Test",
            Self::LiveWebsiteTest => "Live Website Test",
            Self::ThankYou => "Thank You Screen",
            Self::ImageUpload => "Image Upload",
            Self::FileUpload => "File Upload",
        }
    }

    /// Narrative blocks carry their content in `description`; an empty
    /// description there means the participant sees a blank screen.
    pub fn requires_description(&self) -> bool {
        matches!(self, Self::Welcome | Self::ContextScreen | Self::ThankYou)
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A single unit of participant experience within a draft.
///
/// Serializes to the boundary JSON shape consumed by the persistence API:
/// `{id, templateId, name, description, estimatedDuration, settings, order,
/// isRequired, type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,

    /// The template this block was instantiated from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Estimated completion time in minutes, bounded
    /// [[`MIN_BLOCK_DURATION_MINS`], [`MAX_BLOCK_DURATION_MINS`]].
    #[serde(rename = "estimatedDuration")]
    pub estimated_duration_mins: u32,

    /// Open key/value bag; valid keys and shapes depend on `block_type`.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,

    /// Zero-based position within the draft. Maintained by
    /// [`OrderedBlockList`](crate::block_list::OrderedBlockList); always
    /// contiguous `0..n-1`.
    pub order: usize,

    pub is_required: bool,

    #[serde(rename = "type")]
    pub block_type: BlockType,
}

impl Block {
    /// Create a block with a fresh id, default duration, and empty settings.
    ///
    /// Catalog-driven creation (defaults per type) goes through
    /// [`BlockDefinition::create_block`](crate::catalog::BlockDefinition::create_block);
    /// this constructor is the bare-bones path used by tests and template
    /// instantiation.
    pub fn new(block_type: BlockType, name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            template_id: None,
            name: name.into(),
            description: String::new(),
            estimated_duration_mins: MIN_BLOCK_DURATION_MINS,
            settings: serde_json::Map::new(),
            order: 0,
            is_required: true,
            block_type,
        }
    }

    /// Read a settings value by key.
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
