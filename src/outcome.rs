//! Validation outcomes and their report records
//!
//! Every validated unit (a schema, a data file, a `$ref`, a resource path)
//! yields exactly one [`ValidationOutcome`]. Outcomes serialize to the
//! record shape consumed downstream:
//!
//! ```text
//! {"filename": ..., "kind": ..., "ref"?: ...,
//!  "result": {"summary", "status", "reason"?, "error"?, "schema_url"?, "ref"?, ...}}
//! ```

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// What kind of unit was validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidatedKind {
    #[serde(rename = "SCHEMA")]
    Schema,
    #[serde(rename = "FILE")]
    File,
    #[serde(rename = "REF")]
    Ref,
    #[serde(rename = "RESOURCE_PATH")]
    ResourcePath,
}

impl ValidatedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidatedKind::Schema => "SCHEMA",
            ValidatedKind::File => "FILE",
            ValidatedKind::Ref => "REF",
            ValidatedKind::ResourcePath => "RESOURCE_PATH",
        }
    }
}

impl fmt::Display for ValidatedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable reason codes carried by error outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorReason {
    MissingSchemaUrl,
    SchemaNotFound,
    ValidationError,
    SchemaError,
    SchemaTypeError,
    FileNotFound,
    SchemaDefinitionNotFound,
    IncorrectSchema,
    SchemaRefValidationError,
    MissingExtension,
    InvalidYaml,
    InvalidJson,
    InvalidObject,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReason::MissingSchemaUrl => "MISSING_SCHEMA_URL",
            ErrorReason::SchemaNotFound => "SCHEMA_NOT_FOUND",
            ErrorReason::ValidationError => "VALIDATION_ERROR",
            ErrorReason::SchemaError => "SCHEMA_ERROR",
            ErrorReason::SchemaTypeError => "SCHEMA_TYPE_ERROR",
            ErrorReason::FileNotFound => "FILE_NOT_FOUND",
            ErrorReason::SchemaDefinitionNotFound => "SCHEMA_DEFINITION_NOT_FOUND",
            ErrorReason::IncorrectSchema => "INCORRECT_SCHEMA",
            ErrorReason::SchemaRefValidationError => "SCHEMA_REF_VALIDATION_ERROR",
            ErrorReason::MissingExtension => "MISSING_EXTENSION",
            ErrorReason::InvalidYaml => "INVALID_YAML",
            ErrorReason::InvalidJson => "INVALID_JSON",
            ErrorReason::InvalidObject => "INVALID_OBJECT",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra fields attached to an error record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub meta_schema_url: Option<String>,
    pub schema_url: Option<String>,
    pub reference: Option<String>,
    pub resource: Option<String>,
}

impl ErrorContext {
    pub fn meta_schema_url(url: impl Into<String>) -> Self {
        Self {
            meta_schema_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn schema_url(url: impl Into<String>) -> Self {
        Self {
            schema_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    pub fn resource(path: impl Into<String>) -> Self {
        Self {
            resource: Some(path.into()),
            ..Default::default()
        }
    }
}

/// Result of validating one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Ok {
        kind: ValidatedKind,
        filename: String,
        schema_url: String,
    },
    RefOk {
        kind: ValidatedKind,
        filename: String,
        reference: String,
        /// `$schema` of the referencing document, absent if it declares none
        schema_url: Option<String>,
    },
    Error {
        kind: ValidatedKind,
        filename: String,
        reason: ErrorReason,
        message: String,
        context: ErrorContext,
    },
}

impl ValidationOutcome {
    pub fn ok(
        kind: ValidatedKind,
        filename: impl Into<String>,
        schema_url: impl Into<String>,
    ) -> Self {
        ValidationOutcome::Ok {
            kind,
            filename: filename.into(),
            schema_url: schema_url.into(),
        }
    }

    pub fn ref_ok(
        kind: ValidatedKind,
        filename: impl Into<String>,
        reference: impl Into<String>,
        schema_url: Option<String>,
    ) -> Self {
        ValidationOutcome::RefOk {
            kind,
            filename: filename.into(),
            reference: reference.into(),
            schema_url,
        }
    }

    pub fn error(
        kind: ValidatedKind,
        filename: impl Into<String>,
        reason: ErrorReason,
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        ValidationOutcome::Error {
            kind,
            filename: filename.into(),
            reason,
            message: message.into(),
            context,
        }
    }

    pub fn kind(&self) -> ValidatedKind {
        match self {
            ValidationOutcome::Ok { kind, .. }
            | ValidationOutcome::RefOk { kind, .. }
            | ValidationOutcome::Error { kind, .. } => *kind,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            ValidationOutcome::Ok { filename, .. }
            | ValidationOutcome::RefOk { filename, .. }
            | ValidationOutcome::Error { filename, .. } => filename,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationOutcome::Error { .. })
    }

    pub fn reason(&self) -> Option<ErrorReason> {
        match self {
            ValidationOutcome::Error { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// One-line, loggable description
    pub fn summary(&self) -> String {
        match self {
            ValidationOutcome::Ok { filename, schema_url, .. } => {
                format!("OK: {} ({})", filename, schema_url)
            }
            ValidationOutcome::RefOk { filename, reference, schema_url, .. } => match schema_url {
                Some(url) => format!("OK: {} ({}) ({})", filename, reference, url),
                None => format!("OK: {} ({})", filename, reference),
            },
            ValidationOutcome::Error { filename, .. } => format!("ERROR: {}", filename),
        }
    }

    /// The serializable record for this outcome
    pub fn record(&self) -> OutcomeRecord<'_> {
        let summary = self.summary();
        match self {
            ValidationOutcome::Ok { kind, filename, schema_url } => OutcomeRecord {
                filename,
                reference: None,
                kind: *kind,
                result: ResultRecord {
                    summary,
                    status: Status::Ok,
                    schema_url: Some(schema_url.as_str()),
                    ..Default::default()
                },
            },
            ValidationOutcome::RefOk { kind, filename, reference, schema_url } => OutcomeRecord {
                filename,
                reference: Some(reference.as_str()),
                kind: *kind,
                result: ResultRecord {
                    summary,
                    status: Status::Ok,
                    schema_url: schema_url.as_deref(),
                    reference: Some(reference.as_str()),
                    ..Default::default()
                },
            },
            ValidationOutcome::Error { kind, filename, reason, message, context } => OutcomeRecord {
                filename,
                reference: None,
                kind: *kind,
                result: ResultRecord {
                    summary,
                    status: Status::Error,
                    reason: Some(*reason),
                    error: Some(message.as_str()),
                    meta_schema_url: context.meta_schema_url.as_deref(),
                    schema_url: context.schema_url.as_deref(),
                    reference: context.reference.as_deref(),
                    resource: context.resource.as_deref(),
                },
            },
        }
    }
}

impl Serialize for ValidationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record().serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Ok,
    Error,
}

/// Top-level report record for one outcome
#[derive(Debug, Serialize)]
pub struct OutcomeRecord<'a> {
    pub filename: &'a str,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<&'a str>,
    pub kind: ValidatedKind,
    pub result: ResultRecord<'a>,
}

/// The `result` object of a report record
#[derive(Debug, Default, Serialize)]
pub struct ResultRecord<'a> {
    pub summary: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_schema_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<&'a str>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<&'a str>,
    #[serde(rename = "res", skip_serializing_if = "Option::is_none")]
    pub resource: Option<&'a str>,
}
