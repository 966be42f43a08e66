//! Block catalog: the declared registry of block definitions and
//! per-study-type structural rules.
//!
//! The catalog is built once (or fetched from the catalog service, whose
//! JSON shape the types here mirror) and injected into the validation
//! engine and builder session — tests substitute fixtures. Applicability
//! of block types to study types is a declared table, never inferred.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::block::{Block, BlockType};
use crate::error::CoreError;
use crate::types::StudyType;

// ---------------------------------------------------------------------------
// Complexity
// ---------------------------------------------------------------------------

/// How involved a block is to configure, shown alongside catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

impl Complexity {
    /// Human-readable label for display in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

// ---------------------------------------------------------------------------
// Block definition
// ---------------------------------------------------------------------------

/// Descriptive metadata for a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionMetadata {
    pub category: String,
    pub complexity: Complexity,
    /// Default completion estimate in minutes.
    #[serde(rename = "estimatedDuration")]
    pub estimated_duration_mins: u32,
    pub tags: Vec<String>,
    pub version: String,
}

/// Popularity counters and the declared study-type applicability table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionUsage {
    pub usage_count: u64,
    pub popularity: f64,
    pub rating: f64,
    pub study_types: Vec<StudyType>,
}

/// Which settings keys a UI may expose for editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionCustomization {
    pub allow_customization: bool,
    pub customizable_fields: Vec<String>,
}

/// Catalog entry for one block type: defaults, metadata, usage, and the
/// customization surface. Mirrors the catalog service's JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub block_type: BlockType,
    /// Settings a freshly created block starts with.
    pub default_settings: serde_json::Map<String, serde_json::Value>,
    pub metadata: DefinitionMetadata,
    pub usage: DefinitionUsage,
    pub customization: DefinitionCustomization,
}

impl BlockDefinition {
    /// Create a draft block from this definition with a fresh id.
    pub fn create_block(&self) -> Block {
        Block {
            id: uuid::Uuid::new_v4(),
            template_id: None,
            name: self.name.clone(),
            description: String::new(),
            estimated_duration_mins: self.metadata.estimated_duration_mins,
            settings: self.default_settings.clone(),
            order: 0,
            is_required: true,
            block_type: self.block_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-study-type structural rules
// ---------------------------------------------------------------------------

/// Structural constraints a study type declares for its drafts.
///
/// `opens_with` / `closes_with` are optional, catalog-declared ordering
/// rules; when `None`, no positional constraint is enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyTypeRules {
    pub study_type: StudyType,
    /// Block-count ceiling for drafts of this study type.
    pub max_blocks: usize,
    pub opens_with: Option<BlockType>,
    pub closes_with: Option<BlockType>,
}

/// Fallback ceiling for study types without a declared rule set.
pub const DEFAULT_MAX_BLOCKS: usize = 40;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable registry of block definitions and study-type rules.
#[derive(Debug, Clone)]
pub struct BlockCatalog {
    definitions: Vec<BlockDefinition>,
    rules: Vec<StudyTypeRules>,
}

impl BlockCatalog {
    /// Build a catalog from explicit definitions and rules.
    pub fn new(definitions: Vec<BlockDefinition>, rules: Vec<StudyTypeRules>) -> Self {
        Self { definitions, rules }
    }

    /// Look up the definition for a block type.
    ///
    /// Fails with [`CoreError::UnknownBlockType`] when the catalog carries
    /// no entry for the type.
    pub fn lookup(&self, block_type: BlockType) -> Result<&BlockDefinition, CoreError> {
        self.definitions
            .iter()
            .find(|d| d.block_type == block_type)
            .ok_or_else(|| CoreError::UnknownBlockType {
                type_name: block_type.as_str().to_string(),
            })
    }

    /// Parse a wire string and look up its definition in one step.
    pub fn lookup_str(&self, type_name: &str) -> Result<&BlockDefinition, CoreError> {
        self.lookup(BlockType::parse(type_name)?)
    }

    /// Definitions applicable to a study type, in catalog order.
    pub fn list_for_study_type(&self, study_type: StudyType) -> Vec<&BlockDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.usage.study_types.contains(&study_type))
            .collect()
    }

    /// Whether a block type may appear in drafts of a study type.
    pub fn is_applicable(&self, block_type: BlockType, study_type: StudyType) -> bool {
        self.lookup(block_type)
            .map(|d| d.usage.study_types.contains(&study_type))
            .unwrap_or(false)
    }

    /// Declared rules for a study type, if any.
    pub fn rules_for(&self, study_type: StudyType) -> Option<&StudyTypeRules> {
        self.rules.iter().find(|r| r.study_type == study_type)
    }

    /// Block-count ceiling for a study type ([`DEFAULT_MAX_BLOCKS`] when
    /// undeclared).
    pub fn max_blocks_for(&self, study_type: StudyType) -> usize {
        self.rules_for(study_type)
            .map(|r| r.max_blocks)
            .unwrap_or(DEFAULT_MAX_BLOCKS)
    }

    /// Gate for customization intents: editing a settings key outside the
    /// definition's customizable set is refused.
    pub fn ensure_customizable(&self, block_type: BlockType, key: &str) -> Result<(), CoreError> {
        let def = self.lookup(block_type)?;
        if !def.customization.allow_customization {
            return Err(CoreError::Validation(format!(
                "{} blocks do not support customization",
                block_type.as_str()
            )));
        }
        if def
            .customization
            .customizable_fields
            .iter()
            .any(|f| f == key)
        {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Setting '{key}' is not customizable for {} blocks",
                block_type.as_str()
            )))
        }
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        default_catalog()
    }
}

// ---------------------------------------------------------------------------
// Default catalog data
// ---------------------------------------------------------------------------

fn def(
    block_type: BlockType,
    category: &str,
    description: &str,
    default_settings: serde_json::Value,
    estimated_duration_mins: u32,
    complexity: Complexity,
    customizable_fields: &[&str],
    study_types: &[StudyType],
) -> BlockDefinition {
    let settings = match default_settings {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    BlockDefinition {
        id: format!("blk-{}", block_type.as_str()),
        name: block_type.label().to_string(),
        description: description.to_string(),
        category: category.to_string(),
        block_type,
        default_settings: settings,
        metadata: DefinitionMetadata {
            category: category.to_string(),
            complexity,
            estimated_duration_mins,
            tags: Vec::new(),
            version: "1.0.0".to_string(),
        },
        usage: DefinitionUsage {
            usage_count: 0,
            popularity: 0.0,
            rating: 0.0,
            study_types: study_types.to_vec(),
        },
        customization: DefinitionCustomization {
            allow_customization: !customizable_fields.is_empty(),
            customizable_fields: customizable_fields.iter().map(|s| s.to_string()).collect(),
        },
    }
}

/// The production catalog: every block type in the closed set, with the
/// study-type applicability table and per-study-type ceilings.
///
/// No study type currently declares an opening/closing block rule; the
/// fields exist so a catalog revision can turn the constraint on without
/// an engine change.
pub fn default_catalog() -> BlockCatalog {
    use StudyType::*;

    let screen_types: &[StudyType] = &[
        UsabilityTest,
        PrototypeTest,
        Survey,
        UserInterview,
        CardSorting,
        TreeTesting,
    ];
    let question_types: &[StudyType] = &[
        UsabilityTest,
        PrototypeTest,
        Survey,
        UserInterview,
        CardSorting,
        TreeTesting,
    ];
    let choice_types: &[StudyType] = &[
        UsabilityTest,
        PrototypeTest,
        Survey,
        CardSorting,
        TreeTesting,
    ];

    let definitions = vec![
        def(
            BlockType::Welcome,
            "screens",
            "Greets participants and sets expectations before the first task.",
            json!({"show_progress": true, "button_label": "Get started"}),
            1,
            Complexity::Basic,
            &["show_progress", "button_label"],
            screen_types,
        ),
        def(
            BlockType::OpenQuestion,
            "questions",
            "Free-text prompt for qualitative feedback.",
            json!({"question": "", "allow_long_answers": true}),
            2,
            Complexity::Basic,
            &["question", "allow_long_answers"],
            question_types,
        ),
        def(
            BlockType::OpinionScale,
            "questions",
            "Numeric scale rating with optional end labels.",
            json!({
                "question": "",
                "scale_min": 1,
                "scale_max": 5,
                "min_label": "Strongly disagree",
                "max_label": "Strongly agree"
            }),
            1,
            Complexity::Basic,
            &["question", "scale_min", "scale_max", "min_label", "max_label"],
            choice_types,
        ),
        def(
            BlockType::SimpleInput,
            "questions",
            "Single short answer: text, number, email, or date.",
            json!({"question": "", "input_kind": "text"}),
            1,
            Complexity::Basic,
            &["question", "input_kind"],
            &[Survey, UserInterview],
        ),
        def(
            BlockType::MultipleChoice,
            "questions",
            "Pick one or several from a fixed option list.",
            json!({"question": "", "options": [], "allow_multiple": false, "randomize": false}),
            1,
            Complexity::Basic,
            &["question", "options", "allow_multiple", "randomize"],
            choice_types,
        ),
        def(
            BlockType::ContextScreen,
            "screens",
            "Instructional interstitial shown between tasks.",
            json!({"button_label": "Continue"}),
            1,
            Complexity::Basic,
            &["button_label"],
            screen_types,
        ),
        def(
            BlockType::YesNo,
            "questions",
            "Binary question with optional follow-up prompt.",
            json!({"question": ""}),
            1,
            Complexity::Basic,
            &["question"],
            choice_types,
        ),
        def(
            BlockType::FiveSecondTest,
            "tasks",
            "Shows an image briefly, then asks recall questions.",
            json!({"image_url": "", "display_duration_secs": 5}),
            2,
            Complexity::Intermediate,
            &["image_url", "display_duration_secs"],
            &[UsabilityTest, PrototypeTest],
        ),
        def(
            BlockType::CardSort,
            "tasks",
            "Participants group cards into categories.",
            json!({"cards": [], "categories": [], "sort_kind": "open"}),
            8,
            Complexity::Advanced,
            &["cards", "categories", "sort_kind"],
            &[CardSorting],
        ),
        def(
            BlockType::TreeTest,
            "tasks",
            "Participants locate an item in a navigation tree.",
            json!({"tree": [], "task": ""}),
            6,
            Complexity::Advanced,
            &["tree", "task"],
            &[TreeTesting],
        ),
        def(
            BlockType::Screener,
            "questions",
            "Qualifying question that can disqualify participants early.",
            json!({"question": "", "options": [], "qualifying_options": []}),
            2,
            Complexity::Intermediate,
            &["question", "options", "qualifying_options"],
            &[UsabilityTest, PrototypeTest, Survey, CardSorting, TreeTesting],
        ),
        def(
            BlockType::PrototypeTest,
            "tasks",
            "Task against an interactive prototype with path tracking.",
            json!({"prototype_url": "", "task": "", "success_screens": []}),
            10,
            Complexity::Advanced,
            &["prototype_url", "task", "success_screens"],
            &[UsabilityTest, PrototypeTest],
        ),
        def(
            BlockType::LiveWebsiteTest,
            "tasks",
            "Task performed on a live website in an instrumented frame.",
            json!({"website_url": "", "task": ""}),
            10,
            Complexity::Advanced,
            &["website_url", "task"],
            &[UsabilityTest],
        ),
        def(
            BlockType::ThankYou,
            "screens",
            "Closing screen with optional redirect.",
            json!({"redirect_url": ""}),
            1,
            Complexity::Basic,
            &["redirect_url"],
            screen_types,
        ),
        def(
            BlockType::ImageUpload,
            "uploads",
            "Asks the participant to upload one or more images.",
            json!({"prompt": "", "max_files": 1}),
            3,
            Complexity::Intermediate,
            &["prompt", "max_files"],
            &[Survey, UserInterview],
        ),
        def(
            BlockType::FileUpload,
            "uploads",
            "Asks the participant to upload arbitrary files.",
            json!({"prompt": "", "max_files": 1, "allowed_extensions": []}),
            3,
            Complexity::Intermediate,
            &["prompt", "max_files", "allowed_extensions"],
            &[Survey, UserInterview],
        ),
    ];

    let rules = vec![
        StudyTypeRules {
            study_type: UsabilityTest,
            max_blocks: 30,
            opens_with: None,
            closes_with: None,
        },
        StudyTypeRules {
            study_type: PrototypeTest,
            max_blocks: 25,
            opens_with: None,
            closes_with: None,
        },
        StudyTypeRules {
            study_type: Survey,
            max_blocks: 50,
            opens_with: None,
            closes_with: None,
        },
        StudyTypeRules {
            study_type: UserInterview,
            max_blocks: 20,
            opens_with: None,
            closes_with: None,
        },
        StudyTypeRules {
            study_type: CardSorting,
            max_blocks: 15,
            opens_with: None,
            closes_with: None,
        },
        StudyTypeRules {
            study_type: TreeTesting,
            max_blocks: 15,
            opens_with: None,
            closes_with: None,
        },
    ];

    BlockCatalog::new(definitions, rules)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
