//! Validation of bundled schemas against their meta-schemas

use serde_json::Value;
use tracing::{info, warn};

use super::{check_instance, Rejection};
use crate::bundle::SchemaBundle;
use crate::error::Result;
use crate::outcome::{ErrorContext, ErrorReason, ValidatedKind, ValidationOutcome};
use crate::resolver::compile;

const KIND: ValidatedKind = ValidatedKind::Schema;

/// Validate one schema document against the meta-schema it declares
///
/// The meta-schema is taken from the bundle or fetched into it. A fetch
/// failure is returned as `Err` because every schema declaring the same
/// meta-schema would fail the same way.
pub fn validate_schema(
    bundle: &SchemaBundle,
    filename: &str,
    schema: &Value,
) -> Result<ValidationOutcome> {
    info!("validating schema: {}", filename);

    let meta_schema_url = match schema.get("$schema") {
        None => {
            return Ok(ValidationOutcome::error(
                KIND,
                filename,
                ErrorReason::MissingSchemaUrl,
                "missing `$schema` key",
                ErrorContext::default(),
            ))
        }
        Some(Value::String(url)) => url.as_str(),
        Some(other) => {
            return Ok(ValidationOutcome::error(
                KIND,
                filename,
                ErrorReason::SchemaError,
                format!("`$schema` must be a string, got {}", other),
                ErrorContext::default(),
            ))
        }
    };

    let meta_schema = bundle.get_or_fetch(meta_schema_url)?;
    let failed = |reason, message: String| {
        warn!("schema {} failed: {}", filename, reason);
        let context = ErrorContext::meta_schema_url(meta_schema_url);
        ValidationOutcome::error(KIND, filename, reason, message, context)
    };

    // The schema itself must be a well-formed Draft 4 schema.
    if let Err(e) = compile(schema, filename, bundle) {
        return Ok(failed(ErrorReason::SchemaError, e));
    }

    let validator = match compile(&meta_schema, meta_schema_url, bundle) {
        Ok(validator) => validator,
        Err(e) => {
            let message = format!("invalid meta-schema: {}", e);
            return Ok(failed(ErrorReason::SchemaError, message));
        }
    };

    Ok(match check_instance(&validator, schema) {
        Ok(()) => ValidationOutcome::ok(KIND, filename, meta_schema_url),
        Err(Rejection::Invalid(message)) => failed(ErrorReason::ValidationError, message),
        Err(Rejection::Unresolved(message)) => failed(ErrorReason::SchemaError, message),
    })
}
