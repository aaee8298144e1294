// ABOUTME: Error types for template catalog construction
// ABOUTME: Reports inconsistencies in a catalog inventory before it is accepted

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate template id: {id}")]
    DuplicateTemplateId { id: String },

    #[error("Duplicate category: {id}")]
    DuplicateCategory { id: String },

    #[error("Template '{template}' references unknown category '{category}'")]
    UnknownCategory { template: String, category: String },

    #[error("Templates '{first}' and '{second}' share the bundle path '{path}'")]
    DuplicateBundlePath {
        path: String,
        first: String,
        second: String,
    },

    #[error("Invalid name '{name}' for '{id}': {reason}")]
    InvalidName {
        id: String,
        name: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
