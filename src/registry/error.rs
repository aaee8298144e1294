// ABOUTME: Error types for template registry and bundle operations
// ABOUTME: Separates fatal failures from per-entry errors collected during import

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unknown template id: {id}")]
    UnknownTemplateId { id: String },

    #[error("Invalid override key '{id}': no such template")]
    InvalidOverrideKey { id: String },

    #[error("Malformed bundle: {reason}")]
    MalformedBundle { reason: String },

    #[error("{path}: unmatched")]
    UnmatchedBundleEntry { path: String },

    #[error("{path}: path traversal rejected")]
    PathTraversal { path: String },

    #[error("{path}: content is not valid UTF-8")]
    InvalidEntryEncoding { path: String },

    #[error("{path}: larger than {limit} bytes")]
    OversizedEntry { path: String, limit: u64 },

    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),
}

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
