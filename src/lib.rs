//! Bundle Validator
//!
//! Validates a bundle of data documents against a bundle of JSON schemas,
//! then checks what plain schema validation cannot express: that `$ref`s
//! between documents point at documents of the expected schema, and that
//! referenced resource files are well-formed Kubernetes objects.
//!
//! ## Validation passes
//!
//! ```text
//! bundle.json
//! ├── schemas/   ── SCHEMA         each schema against its meta-schema
//! └── data/      ── FILE           each document against its `$schema`
//!                ── REF            each {"$ref": ...} against `$schemaRef`
//!                ── RESOURCE_PATH  each {"provider": "resource", "path": ...}
//! ```
//!
//! Every unit yields one [`ValidationOutcome`]; the [`ValidationReport`]
//! keeps them in pass order.

pub mod bundle;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod outcome;
pub mod pointer;
pub mod report;
pub mod resolver;
pub mod validate;

pub use bundle::{BundleEnvelope, DataBundle, SchemaBundle};
pub use config::{OutputFormat, ValidatorConfig};
pub use discovery::{find_refs, find_resource_paths, Located};
pub use error::{BundleError, PointerError, Result};
pub use fetch::{HttpSchemaFetcher, OfflineSchemaFetcher, SchemaFetcher};
pub use outcome::{ErrorContext, ErrorReason, ValidatedKind, ValidationOutcome};
pub use pointer::resolve_schema_at_pointer;
pub use report::{BundleValidator, ValidationReport};
pub use resolver::BundleResolver;
pub use validate::{
    validate_file, validate_ref, validate_schema, FsResourceStore, ResourceRules, ResourceStore,
    ResourceValidator,
};
