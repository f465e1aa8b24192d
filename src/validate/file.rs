//! Validation of data documents against their declared schemas

use serde_json::Value;
use tracing::{info, warn};

use super::{check_instance, Rejection};
use crate::bundle::SchemaBundle;
use crate::outcome::{ErrorContext, ErrorReason, ValidatedKind, ValidationOutcome};
use crate::resolver::compile;

const KIND: ValidatedKind = ValidatedKind::File;

/// Bundle key for a document's `$schema`: absolute as-is, otherwise rooted at `/`
pub fn normalize_schema_url(schema_url: &str) -> String {
    if schema_url.starts_with("http") || schema_url.starts_with('/') {
        schema_url.to_string()
    } else {
        format!("/{}", schema_url)
    }
}

/// Validate one data document against the bundled schema it declares
pub fn validate_file(bundle: &SchemaBundle, filename: &str, data: &Value) -> ValidationOutcome {
    info!("validating file: {}", filename);

    let schema_url = match data.get("$schema") {
        None => {
            return ValidationOutcome::error(
                KIND,
                filename,
                ErrorReason::MissingSchemaUrl,
                "missing `$schema` key",
                ErrorContext::default(),
            )
        }
        Some(Value::String(url)) => normalize_schema_url(url),
        Some(other) => {
            return ValidationOutcome::error(
                KIND,
                filename,
                ErrorReason::SchemaTypeError,
                format!("`$schema` must be a string, got {}", other),
                ErrorContext::default(),
            )
        }
    };

    let failed = |reason, message: String| {
        warn!("file {} failed: {}", filename, reason);
        let context = ErrorContext::schema_url(&schema_url);
        ValidationOutcome::error(KIND, filename, reason, message, context)
    };

    let Some(schema) = bundle.get(&schema_url) else {
        return failed(
            ErrorReason::SchemaNotFound,
            format!("schema not found: `{}`", schema_url),
        );
    };

    if !(schema.is_object() || schema.is_boolean()) {
        return failed(
            ErrorReason::SchemaTypeError,
            format!("schema must be an object, got {}", json_type(&schema)),
        );
    }

    let validator = match compile(&schema, &schema_url, bundle) {
        Ok(validator) => validator,
        Err(e) => return failed(ErrorReason::SchemaError, e),
    };

    match check_instance(&validator, data) {
        Ok(()) => ValidationOutcome::ok(KIND, filename, schema_url.as_str()),
        Err(Rejection::Invalid(message)) => failed(ErrorReason::ValidationError, message),
        Err(Rejection::Unresolved(message)) => failed(ErrorReason::SchemaError, message),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
