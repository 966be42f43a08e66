use crate::types::BlockId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown block type '{type_name}'")]
    UnknownBlockType { type_name: String },

    #[error("Template variable '{key}' is required but has no binding")]
    MissingRequiredVariable { key: String },

    #[error("Block not found: {id}")]
    BlockNotFound { id: BlockId },

    #[error("Validation failed: {0}")]
    Validation(String),
}
