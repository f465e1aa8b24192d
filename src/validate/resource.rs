//! Validation of externally stored resource files
//!
//! Resource descriptors (`{"provider": "resource", "path": ...}`) name a
//! JSON or YAML file under the resources root. The file must parse and
//! look like a Kubernetes object; some kinds must also carry `data`.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::declared_schema;
use crate::outcome::{ErrorContext, ErrorReason, ValidatedKind, ValidationOutcome};

const KIND: ValidatedKind = ValidatedKind::ResourcePath;

const JSON_EXTENSIONS: &[&str] = &["json"];
const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Raw access to resource files
pub trait ResourceStore: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads resources from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResourceStore;

impl ResourceStore for FsResourceStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Structural rules a resource file must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRules {
    /// Directory resource paths are relative to
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Top-level keys every resource must have
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,

    /// Kinds that must also carry a `data` key
    #[serde(default = "default_data_required_kinds")]
    pub data_required_kinds: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from("resources")
}

fn default_required_fields() -> Vec<String> {
    vec!["apiVersion".to_string(), "metadata".to_string(), "kind".to_string()]
}

fn default_data_required_kinds() -> Vec<String> {
    vec!["ConfigMap".to_string(), "Secret".to_string()]
}

impl Default for ResourceRules {
    fn default() -> Self {
        Self {
            root: default_root(),
            required_fields: default_required_fields(),
            data_required_kinds: default_data_required_kinds(),
        }
    }
}

impl ResourceRules {
    /// Location of a resource path under the root
    pub fn real_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path).extension()?.to_str()?;
        if JSON_EXTENSIONS.contains(&extension) {
            Some(Format::Json)
        } else if YAML_EXTENSIONS.contains(&extension) {
            Some(Format::Yaml)
        } else {
            None
        }
    }
}

/// Validates resource descriptors against files in a [`ResourceStore`]
pub struct ResourceValidator {
    store: Box<dyn ResourceStore>,
    rules: ResourceRules,
}

impl ResourceValidator {
    pub fn new(store: Box<dyn ResourceStore>, rules: ResourceRules) -> Self {
        Self { store, rules }
    }

    /// Filesystem-backed validator
    pub fn from_rules(rules: ResourceRules) -> Self {
        Self::new(Box::new(FsResourceStore), rules)
    }

    pub fn rules(&self) -> &ResourceRules {
        &self.rules
    }

    /// Validate the resource descriptor found at `pointer` inside `data`
    pub fn validate_resource_path(
        &self,
        filename: &str,
        data: &Value,
        pointer: &str,
        resource: &Map<String, Value>,
    ) -> ValidationOutcome {
        let path = match resource.get("path") {
            Some(Value::String(path)) => path.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        info!("validating resource path: {}", path);

        let failed = |reason, message: String| {
            warn!("resource {} in {} at {:?} failed: {}", path, filename, pointer, reason);
            let context = ErrorContext::resource(&path);
            ValidationOutcome::error(KIND, filename, reason, message, context)
        };

        let Some(format) = Format::from_path(&path) else {
            let valid: Vec<String> = JSON_EXTENSIONS
                .iter()
                .chain(YAML_EXTENSIONS)
                .map(|ext| format!(".{}", ext))
                .collect();
            return failed(
                ErrorReason::MissingExtension,
                format!(
                    "The resource file extension should end in one of the following: {}",
                    valid.join(", ")
                ),
            );
        };

        let real_path = self.rules.real_path(&path);
        let shown = real_path.display();

        let raw = match self.store.read(&real_path) {
            Ok(raw) => raw,
            Err(_) => {
                return failed(
                    ErrorReason::FileNotFound,
                    format!("Resource file could not be found: {}", shown),
                )
            }
        };

        let parsed = match format {
            Format::Json => serde_json::from_slice::<Value>(&raw).map_err(|_| {
                (
                    ErrorReason::InvalidJson,
                    format!("Resource file could not be parsed as valid JSON: {}", shown),
                )
            }),
            Format::Yaml => serde_yaml::from_slice::<Value>(&raw).map_err(|_| {
                (
                    ErrorReason::InvalidYaml,
                    format!("Resource file could not be parsed as valid YAML: {}", shown),
                )
            }),
        };
        let object = match parsed {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                return failed(
                    ErrorReason::InvalidObject,
                    format!("Resource file is not a valid kubernetes object: {}", shown),
                )
            }
            Err((reason, message)) => return failed(reason, message),
        };

        if !self.rules.required_fields.iter().all(|field| object.contains_key(field)) {
            return failed(
                ErrorReason::InvalidObject,
                format!("Resource file is not a valid kubernetes object: {}", shown),
            );
        }

        let kind = object.get("kind").and_then(Value::as_str).unwrap_or_default();
        let requires_data = self.rules.data_required_kinds.iter().any(|k| k == kind);
        if requires_data && !object.contains_key("data") {
            return failed(
                ErrorReason::InvalidObject,
                format!("{} resource file is missing a data field: {}", kind, shown),
            );
        }

        ValidationOutcome::ref_ok(
            KIND,
            filename,
            path.as_str(),
            declared_schema(data).map(String::from),
        )
    }
}
