use thiserror::Error;

/// Errors surfaced by document field access and serialization.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("No field named '{path}'")]
    NoFieldNamed { path: String },

    #[error("Field '{path}' is not a {expected}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
    },

    #[error("Document root must be a mapping")]
    NotAMapping,

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Failed to serialize document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode document as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
