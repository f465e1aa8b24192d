//! Error types for bundle validation
//!
//! Per-document problems never surface here: they become
//! [`ValidationOutcome::Error`](crate::outcome::ValidationOutcome) values.
//! `BundleError` is reserved for failures that stop the whole run.

use thiserror::Error;

/// Result type for bundle operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Fatal bundle errors
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("schema not found: `{0}`")]
    MissingSchemaFile(String),

    #[error("failed to fetch schema `{url}`: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("schema `{url}` is neither valid JSON nor YAML: {reason}")]
    UnparsableSchema { url: String, reason: String },

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

/// Failure to walk a schema down a pointer path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("no schema definition for segment `{segment}` of `{pointer}`")]
    NotFound { pointer: String, segment: String },
}
