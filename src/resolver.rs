//! Bundle-backed `$ref` resolution for the JSON-Schema engine
//!
//! The engine joins every reference onto its default `json-schema:///`
//! scope before asking the resolver. A reference written relative to the
//! schema (`"$ref": "common-1.json"`) is joined again here, onto the base
//! of the schema being compiled: its bundle identifier, or its own `id`
//! when it declares one. Path references are answered from the bundle;
//! network references go through the bundle's read-through cache.

use std::sync::Arc;

use jsonschema::{Draft, JSONSchema, SchemaResolver, SchemaResolverError};
use serde_json::Value;
use url::Url;

use crate::bundle::SchemaBundle;
use crate::fetch::is_network_url;

/// Scope the engine joins references onto
const DEFAULT_BASE: &str = "json-schema:///";

/// Resolves every external `$ref` against a [`SchemaBundle`]
#[derive(Debug, Clone)]
pub struct BundleResolver {
    bundle: SchemaBundle,
    base: Url,
}

impl BundleResolver {
    /// Resolver for a schema whose relative references start at `base`
    pub fn new(bundle: SchemaBundle, base: Url) -> Self {
        Self { bundle, base }
    }

    fn lookup(&self, candidates: &[String]) -> Option<Arc<Value>> {
        candidates.iter().find_map(|id| self.bundle.get(id))
    }

    /// The document a reference names, without its fragment
    ///
    /// When the engine joined the reference onto its default scope, the
    /// schema's own base is used instead.
    fn document_url(&self, url: &Url, original_reference: &str) -> Result<Url, url::ParseError> {
        let engine_default = Url::parse(DEFAULT_BASE)?.join(original_reference)?;
        let mut document = if same_document(&engine_default, url) {
            self.base.join(original_reference)?
        } else {
            url.clone()
        };
        document.set_fragment(None);
        Ok(document)
    }
}

impl SchemaResolver for BundleResolver {
    fn resolve(
        &self,
        _root_schema: &Value,
        url: &Url,
        original_reference: &str,
    ) -> Result<Arc<Value>, SchemaResolverError> {
        let document_url = self.document_url(url, original_reference)?;

        if is_network_url(document_url.scheme()) {
            let id = document_url.as_str();
            if let Some(schema) = self.lookup(&[id.to_string(), format!("{}#", id)]) {
                return Ok(schema);
            }
            return self.bundle.get_or_fetch(id).map_err(anyhow::Error::from);
        }

        let path = document_url.path();
        let reference = original_reference.split('#').next().unwrap_or_default();
        let candidates = [
            path.to_string(),
            path.trim_start_matches('/').to_string(),
            reference.to_string(),
        ];
        self.lookup(&candidates)
            .ok_or_else(|| anyhow::anyhow!("schema not found in bundle: `{}`", path))
    }
}

fn same_document(a: &Url, b: &Url) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b
}

/// Base URL for the relative references of the schema bundled under `key`
///
/// Bundle paths are rooted at `json-schema:///`; a declared `id` is joined
/// onto that and takes precedence.
pub fn schema_base(key: &str, schema: &Value) -> Result<Url, url::ParseError> {
    let base = Url::parse(DEFAULT_BASE)?.join(key)?;
    match schema.get("id").and_then(Value::as_str) {
        Some(id) => base.join(id),
        None => Ok(base),
    }
}

/// Compile `schema`, bundled under `key`, as Draft 4 with `$ref`s answered
/// from `bundle`
///
/// Compilation also checks `schema` against the Draft 4 meta-schema.
pub(crate) fn compile(
    schema: &Value,
    key: &str,
    bundle: &SchemaBundle,
) -> Result<JSONSchema, String> {
    let base = schema_base(key, schema)
        .map_err(|e| format!("invalid base for `{}`: {}", key, e))?;
    let rooted = with_absolute_id(schema, &base);
    JSONSchema::options()
        .with_draft(Draft::Draft4)
        .with_resolver(BundleResolver::new(bundle.clone(), base))
        .compile(rooted.as_ref().unwrap_or(schema))
        .map_err(|e| e.to_string())
}

/// Copy of `schema` with a relative `id` replaced by its absolute `base`
fn with_absolute_id(schema: &Value, base: &Url) -> Option<Value> {
    let id = schema.get("id")?.as_str()?;
    if Url::parse(id).is_ok() {
        return None;
    }
    let mut rooted = schema.clone();
    rooted["id"] = Value::String(base.to_string());
    Some(rooted)
}
