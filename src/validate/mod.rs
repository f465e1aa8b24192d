//! Per-unit validators
//!
//! Each validator turns every failure local to its unit into a
//! [`ValidationOutcome::Error`](crate::outcome::ValidationOutcome). Only the
//! schema validator can fail the whole run, when a meta-schema cannot be
//! fetched.

pub mod file;
pub mod reference;
pub mod resource;
pub mod schema;

pub use file::validate_file;
pub use reference::validate_ref;
pub use resource::{ResourceRules, ResourceStore, ResourceValidator, FsResourceStore};
pub use schema::validate_schema;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{JSONSchema, ValidationError};
use serde_json::Value;

/// Why an instance was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// The instance does not conform to the schema
    Invalid(String),
    /// A `$ref` inside the schema could not be resolved
    Unresolved(String),
}

/// Validate `instance`, collecting every violation into one message
pub(crate) fn check_instance(validator: &JSONSchema, instance: &Value) -> Result<(), Rejection> {
    let Err(errors) = validator.validate(instance) else {
        return Ok(());
    };

    let mut violations = Vec::new();
    let mut unresolved = Vec::new();
    for error in errors {
        match error.kind {
            ValidationErrorKind::Resolver { .. } => unresolved.push(error.to_string()),
            _ => violations.push(describe(&error)),
        }
    }

    if unresolved.is_empty() {
        Err(Rejection::Invalid(violations.join("\n")))
    } else {
        Err(Rejection::Unresolved(unresolved.join("\n")))
    }
}

/// Render an error with the instance location it applies to
pub(crate) fn describe(error: &ValidationError<'_>) -> String {
    let path = error.instance_path.to_string();
    if path.is_empty() {
        format!("(root): {}", error)
    } else {
        format!("{}: {}", path, error)
    }
}

/// `$schema` of a document, when it is a string
pub(crate) fn declared_schema(document: &Value) -> Option<&str> {
    document.get("$schema").and_then(Value::as_str)
}
