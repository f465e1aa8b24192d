//! Whole-bundle validation
//!
//! Runs every validator over the bundle and collects the outcomes in a
//! fixed order: schemas, data files, `$ref`s, then resource paths. Within
//! each group the bundle's own order is kept.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::bundle::{BundleEnvelope, DataBundle, SchemaBundle};
use crate::config::OutputFormat;
use crate::discovery::{find_refs, find_resource_paths};
use crate::error::Result;
use crate::fetch::SchemaFetcher;
use crate::outcome::ValidationOutcome;
use crate::validate::{validate_file, validate_ref, validate_schema, ResourceValidator};

/// Validates one schema bundle and one data bundle together
pub struct BundleValidator {
    schemas: SchemaBundle,
    documents: DataBundle,
    resources: ResourceValidator,
}

impl BundleValidator {
    pub fn new(schemas: SchemaBundle, documents: DataBundle, resources: ResourceValidator) -> Self {
        Self {
            schemas,
            documents,
            resources,
        }
    }

    /// Build a validator straight from a parsed envelope
    pub fn from_envelope(
        envelope: BundleEnvelope,
        fetcher: Arc<dyn SchemaFetcher>,
        resources: ResourceValidator,
    ) -> Self {
        Self::new(
            SchemaBundle::new(envelope.schemas, fetcher),
            DataBundle::new(envelope.data),
            resources,
        )
    }

    pub fn schemas(&self) -> &SchemaBundle {
        &self.schemas
    }

    pub fn documents(&self) -> &DataBundle {
        &self.documents
    }

    /// Validate everything
    ///
    /// Fails only when a meta-schema can be neither found nor fetched.
    pub fn run(&self) -> Result<ValidationReport> {
        info!(
            "validating bundle: {} schemas, {} documents",
            self.schemas.len(),
            self.documents.len()
        );

        let mut outcomes = Vec::new();

        for id in self.schemas.identifiers() {
            if let Some(schema) = self.schemas.get(&id) {
                outcomes.push(validate_schema(&self.schemas, &id, &schema)?);
            }
        }

        for (filename, data) in self.documents.iter() {
            outcomes.push(validate_file(&self.schemas, filename, data));
        }

        for (filename, data) in self.documents.iter() {
            for found in find_refs(data) {
                outcomes.push(validate_ref(
                    &self.schemas,
                    &self.documents,
                    filename,
                    data,
                    &found.pointer,
                    found.object,
                ));
            }
        }

        for (filename, data) in self.documents.iter() {
            for found in find_resource_paths(data) {
                outcomes.push(self.resources.validate_resource_path(
                    filename,
                    data,
                    &found.pointer,
                    found.object,
                ));
            }
        }

        let report = ValidationReport { outcomes };
        info!(
            "validated {} units, {} errors",
            report.outcomes.len(),
            report.error_count()
        );
        Ok(report)
    }
}

/// Ordered outcomes of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    outcomes: Vec<ValidationOutcome>,
}

impl ValidationReport {
    pub fn outcomes(&self) -> &[ValidationOutcome] {
        &self.outcomes
    }

    /// Error outcomes, in report order
    pub fn errors(&self) -> Vec<&ValidationOutcome> {
        self.outcomes.iter().filter(|o| o.is_error()).collect()
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(ValidationOutcome::is_error)
    }

    /// Process exit status: non-zero iff any outcome is an error
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            1
        } else {
            0
        }
    }

    /// Records of all outcomes, or of the errors only
    pub fn to_value(&self, only_errors: bool) -> Result<Value> {
        let records = self
            .outcomes
            .iter()
            .filter(|o| !only_errors || o.is_error())
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Value::Array(records))
    }

    /// Render the report as JSON text
    pub fn to_json(&self, only_errors: bool, format: OutputFormat) -> Result<String> {
        let value = self.to_value(only_errors)?;
        let text = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(&value)?,
            OutputFormat::Compact => serde_json::to_string(&value)?,
        };
        Ok(text)
    }
}
