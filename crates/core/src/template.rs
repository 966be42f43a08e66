//! Study templates and their instantiation into concrete block lists.
//!
//! A template is an immutable, catalog-defined blueprint: an ordered list
//! of block definitions whose text and settings may reference declared
//! variables via `{key}` markers. Instantiation is a pure function of
//! `(template, bindings)` — textual substitution only, no expression
//! evaluation.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::block::BlockType;
use crate::block_list::OrderedBlockList;
use crate::catalog::Complexity;
use crate::error::CoreError;

/// Regex matching `{key}` variable markers in template text.
static MARKER_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\{(\w+)\}").expect("valid regex"));

// ---------------------------------------------------------------------------
// Template model
// ---------------------------------------------------------------------------

/// Input widget kind for a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Text,
    Number,
    Url,
}

/// A declared template variable. `key` is unique within the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub key: String,
    pub label: String,
    pub kind: VariableKind,
    pub required: bool,
    pub default_value: Option<String>,
    pub placeholder: Option<String>,
}

/// A block definition inside a template.
///
/// The block type is kept as the authored wire string; it is parsed at
/// instantiation time so a template carrying an unknown type fails closed
/// rather than silently dropping a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateBlock {
    pub block_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub estimated_duration_mins: u32,
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

fn default_true() -> bool {
    true
}

/// Duration, tagging, and versioning metadata for a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub estimated_duration_mins: u32,
    pub tags: Vec<String>,
    pub complexity: Complexity,
    pub version: String,
}

/// An immutable study blueprint from the template catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub variables: Vec<TemplateVariable>,
    pub blocks: Vec<TemplateBlock>,
    pub metadata: TemplateMetadata,
}

// ---------------------------------------------------------------------------
// Instantiation
// ---------------------------------------------------------------------------

impl StudyTemplate {
    /// Instantiate this template into a concrete block list.
    ///
    /// - Required variables with no binding fail with
    ///   [`CoreError::MissingRequiredVariable`] — a `default_value` on a
    ///   required variable is only a form prefill, never an implicit
    ///   binding.
    /// - Unset optional variables fall back to their `default_value`.
    /// - Every `{key}` marker in block names, descriptions, and string
    ///   settings values is replaced textually with the bound value.
    /// - Each instantiated block gets a fresh id (template block identity
    ///   is never reused — concurrent drafts from one template must not
    ///   collide) and `order` equal to its template position.
    ///
    /// Pure: neither the template nor the bindings are modified.
    pub fn instantiate(
        &self,
        bindings: &HashMap<String, String>,
    ) -> Result<OrderedBlockList, CoreError> {
        let resolved = self.resolve_bindings(bindings)?;

        let mut blocks = Vec::with_capacity(self.blocks.len());
        for (position, template_block) in self.blocks.iter().enumerate() {
            let block_type = BlockType::parse(&template_block.block_type)?;

            let mut settings = template_block.settings.clone();
            for value in settings.values_mut() {
                substitute_value(value, &resolved);
            }

            blocks.push(Block {
                id: uuid::Uuid::new_v4(),
                template_id: Some(self.id.clone()),
                name: substitute(&template_block.name, &resolved),
                description: substitute(&template_block.description, &resolved),
                estimated_duration_mins: template_block.estimated_duration_mins,
                settings,
                order: position,
                is_required: template_block.is_required,
                block_type,
            });
        }

        Ok(OrderedBlockList::from_blocks(blocks))
    }

    /// Merge caller bindings with variable defaults, failing on a missing
    /// required variable.
    fn resolve_bindings(
        &self,
        bindings: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>, CoreError> {
        let mut resolved = HashMap::with_capacity(self.variables.len());
        for variable in &self.variables {
            match bindings.get(&variable.key) {
                Some(value) => {
                    resolved.insert(variable.key.clone(), value.clone());
                }
                None if variable.required => {
                    return Err(CoreError::MissingRequiredVariable {
                        key: variable.key.clone(),
                    });
                }
                None => {
                    resolved.insert(
                        variable.key.clone(),
                        variable.default_value.clone().unwrap_or_default(),
                    );
                }
            }
        }
        Ok(resolved)
    }

    /// Bindings seeded from every variable's `default_value` — the form's
    /// initial state before the user edits anything.
    pub fn default_bindings(&self) -> HashMap<String, String> {
        self.variables
            .iter()
            .map(|v| {
                (
                    v.key.clone(),
                    v.default_value.clone().unwrap_or_default(),
                )
            })
            .collect()
    }
}

/// Replace `{key}` markers for declared variables. Markers referencing
/// undeclared keys are left in place.
fn substitute(text: &str, variables: &HashMap<String, String>) -> String {
    MARKER_RE
        .replace_all(text, |caps: &regex::Captures| {
            match variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Recursively substitute markers in every string inside a JSON value.
fn substitute_value(value: &mut serde_json::Value, variables: &HashMap<String, String>) {
    match value {
        serde_json::Value::String(s) => {
            *s = substitute(s, variables);
        }
        serde_json::Value::Array(items) => {
            for item in items {
                substitute_value(item, variables);
            }
        }
        serde_json::Value::Object(map) => {
            for nested in map.values_mut() {
                substitute_value(nested, variables);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
