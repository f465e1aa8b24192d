//! Cross-document `$ref` validation
//!
//! A `$ref` at some pointer inside document A is valid when the document it
//! names exists and fits what A's schema expects at that pointer. The
//! expectation is the optional `$schemaRef` annotation on the schema node:
//! either a schema identifier that the target's `$schema` must equal, or an
//! inline schema the target must satisfy.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{check_instance, declared_schema, Rejection};
use crate::bundle::{DataBundle, SchemaBundle};
use crate::outcome::{ErrorContext, ErrorReason, ValidatedKind, ValidationOutcome};
use crate::pointer::resolve_schema_at_pointer;
use crate::resolver::{compile, schema_base};

const KIND: ValidatedKind = ValidatedKind::Ref;

/// Annotation naming what a reference at this schema node must point to
pub const SCHEMA_REF_KEY: &str = "$schemaRef";

/// Validate the `$ref` object found at `pointer` inside `data`
pub fn validate_ref(
    schemas: &SchemaBundle,
    documents: &DataBundle,
    filename: &str,
    data: &Value,
    pointer: &str,
    ref_object: &Map<String, Value>,
) -> ValidationOutcome {
    let reference = match ref_object.get("$ref") {
        Some(Value::String(target)) => target.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    debug!("validating ref: {} -> {} at {:?}", filename, reference, pointer);

    let failed = |reason, message: String| {
        warn!("ref {} -> {} failed: {}", filename, reference, reason);
        let context = ErrorContext::reference(&reference);
        ValidationOutcome::error(KIND, filename, reason, message, context)
    };

    let Some(target) = documents.get(&reference) else {
        return failed(
            ErrorReason::FileNotFound,
            format!("file not found: `{}`", reference),
        );
    };

    let schema_url = declared_schema(data);
    let Some(schema) = schema_url.and_then(|url| schemas.get(url)) else {
        let message = match schema_url {
            Some(url) => format!("schema not found: `{}`", url),
            None => "referencing document declares no `$schema`".to_string(),
        };
        return failed(ErrorReason::SchemaNotFound, message);
    };

    let schema_info = match resolve_schema_at_pointer(&schema, pointer) {
        Ok(info) => info,
        Err(e) => return failed(ErrorReason::SchemaDefinitionNotFound, e.to_string()),
    };

    match schema_info.get(SCHEMA_REF_KEY) {
        None => {}
        Some(Value::String(expected)) => {
            let got = declared_schema(target);
            if got != Some(expected.as_str()) {
                return failed(
                    ErrorReason::IncorrectSchema,
                    format!(
                        "incorrect schema: got `{}`, expecting `{}`",
                        got.unwrap_or("None"),
                        expected
                    ),
                );
            }
        }
        Some(expected_schema) => {
            let base = schema_url
                .and_then(|url| schema_base(url, &schema).ok())
                .map(String::from)
                .unwrap_or_default();
            let validator = match compile(expected_schema, &base, schemas) {
                Ok(validator) => validator,
                Err(e) => return failed(ErrorReason::SchemaRefValidationError, e),
            };
            match check_instance(&validator, target) {
                Ok(()) => {}
                Err(Rejection::Invalid(message)) | Err(Rejection::Unresolved(message)) => {
                    return failed(ErrorReason::SchemaRefValidationError, message)
                }
            }
        }
    }

    ValidationOutcome::ref_ok(
        KIND,
        filename,
        reference.as_str(),
        schema_url.map(String::from),
    )
}
