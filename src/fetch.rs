//! Retrieval of schemas that are not shipped inside the bundle
//!
//! Only network identifiers (anything starting with `http`) can be fetched.
//! Every other identifier must already be present in the bundle.

use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::error::{BundleError, Result};

/// Source of schemas missing from the bundle
pub trait SchemaFetcher: Send + Sync {
    /// Fetch and parse the schema published at `url`
    fn fetch(&self, url: &str) -> Result<Value>;
}

/// Fetches schemas over HTTP(S) with a blocking client
pub struct HttpSchemaFetcher {
    client: reqwest::blocking::Client,
}

impl HttpSchemaFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| BundleError::Fetch {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl SchemaFetcher for HttpSchemaFetcher {
    fn fetch(&self, url: &str) -> Result<Value> {
        if !is_network_url(url) {
            return Err(BundleError::MissingSchemaFile(url.to_string()));
        }

        info!("fetching schema: {}", url);

        let fetch_err = |source| BundleError::Fetch {
            url: url.to_string(),
            source,
        };
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(fetch_err)?;

        parse_schema_text(url, &body)
    }
}

/// Refuses every identifier; used when network access is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSchemaFetcher;

impl SchemaFetcher for OfflineSchemaFetcher {
    fn fetch(&self, url: &str) -> Result<Value> {
        Err(BundleError::MissingSchemaFile(url.to_string()))
    }
}

/// Whether `url` names something the fetcher may retrieve
pub fn is_network_url(url: &str) -> bool {
    url.starts_with("http")
}

/// Parse a fetched schema body, accepting JSON first and YAML second
pub fn parse_schema_text(url: &str, text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    serde_yaml::from_str(text).map_err(|e| BundleError::UnparsableSchema {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_body() {
        let value = parse_schema_text("http://x", r#"{"type": "object"}"#).unwrap();
        assert_eq!(value, json!({"type": "object"}));
    }

    #[test]
    fn test_parse_yaml_body() {
        let value = parse_schema_text("http://x", "type: object\nrequired:\n  - name\n").unwrap();
        assert_eq!(value, json!({"type": "object", "required": ["name"]}));
    }

    #[test]
    fn test_parse_garbage_body() {
        let err = parse_schema_text("http://x", "{ not: [valid").unwrap_err();
        assert!(matches!(err, BundleError::UnparsableSchema { .. }));
    }

    #[test]
    fn test_non_network_url_is_missing() {
        let fetcher = HttpSchemaFetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch("/metaschema-1.json").unwrap_err();
        assert!(
            matches!(err, BundleError::MissingSchemaFile(ref url) if url == "/metaschema-1.json")
        );
    }

    #[test]
    fn test_offline_fetcher_refuses_everything() {
        let err = OfflineSchemaFetcher
            .fetch("http://json-schema.org/draft-04/schema#")
            .unwrap_err();
        assert!(matches!(err, BundleError::MissingSchemaFile(_)));
    }
}
