//! End-to-end tests for whole-bundle validation
//!
//! Meta-schemas are served by an in-memory fetcher; resource files live in
//! a temporary directory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bundle_validator::{
    BundleEnvelope, BundleError, BundleValidator, ErrorReason, ResourceRules, ResourceValidator,
    SchemaFetcher, ValidatedKind, ValidationOutcome, ValidationReport,
};
use serde_json::{json, Value};

const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

const CONFIGMAP: &str =
    "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: billing\ndata:\n  LOG_LEVEL: info\n";
const CONFIGMAP_NO_DATA: &str = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: billing\n";

struct StaticFetcher {
    schemas: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    fn draft_04() -> Arc<Self> {
        let meta: Value =
            serde_json::from_str(include_str!("fixtures/draft-04-schema.json")).unwrap();
        Arc::new(Self {
            schemas: HashMap::from([(DRAFT_04.to_string(), meta)]),
            calls: AtomicUsize::new(0),
        })
    }
}

impl SchemaFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> bundle_validator::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.schemas
            .get(url)
            .cloned()
            .ok_or_else(|| BundleError::MissingSchemaFile(url.to_string()))
    }
}

fn resources_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }
    dir
}

fn resources(root: &Path) -> ResourceValidator {
    ResourceValidator::from_rules(ResourceRules {
        root: root.to_path_buf(),
        ..ResourceRules::default()
    })
}

fn validator(envelope: Value, fetcher: Arc<StaticFetcher>, root: &Path) -> BundleValidator {
    let envelope: BundleEnvelope = serde_json::from_value(envelope).unwrap();
    BundleValidator::from_envelope(envelope, fetcher, resources(root))
}

fn run(envelope: Value, root: &Path) -> ValidationReport {
    validator(envelope, StaticFetcher::draft_04(), root)
        .run()
        .unwrap()
}

fn fixture_bundle() -> Value {
    serde_json::from_str(include_str!("fixtures/bundle.json")).unwrap()
}

fn fixture_resources() -> tempfile::TempDir {
    resources_dir(&[
        ("billing/cm.yml", CONFIGMAP),
        ("billing/cm-nodata.yml", CONFIGMAP_NO_DATA),
    ])
}

fn summary(outcome: &ValidationOutcome) -> (ValidatedKind, String, Option<ErrorReason>) {
    (outcome.kind(), outcome.filename().to_string(), outcome.reason())
}

// =============================================================================
// Minimal bundles
// =============================================================================

#[test]
fn test_conforming_document_is_clean() {
    let dir = resources_dir(&[]);
    let fetcher = StaticFetcher::draft_04();
    let envelope = json!({
        "schemas": {
            "/s-1.json": {
                "$schema": DRAFT_04,
                "type": "object",
                "required": ["name"],
                "properties": {"name": {"type": "string"}}
            }
        },
        "data": {
            "/d.yml": {"$schema": "/s-1.json", "name": "d"}
        }
    });

    let report = validator(envelope, fetcher.clone(), dir.path())
        .run()
        .unwrap();

    assert_eq!(
        report.outcomes(),
        &[
            ValidationOutcome::ok(ValidatedKind::Schema, "/s-1.json", DRAFT_04),
            ValidationOutcome::ok(ValidatedKind::File, "/d.yml", "/s-1.json"),
        ]
    );
    assert!(report.errors().is_empty());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dangling_ref_is_file_not_found() {
    let dir = resources_dir(&[]);
    let envelope = json!({
        "schemas": {"/s-1.json": {"$schema": DRAFT_04, "type": "object"}},
        "data": {"/d.yml": {"$schema": "/s-1.json", "link": {"$ref": "E"}}}
    });

    let report = run(envelope, dir.path());

    let errors = report.errors();
    assert_eq!(errors.len(), 1);
    match errors[0] {
        ValidationOutcome::Error { kind, reason, context, .. } => {
            assert_eq!(*kind, ValidatedKind::Ref);
            assert_eq!(*reason, ErrorReason::FileNotFound);
            assert_eq!(context.reference.as_deref(), Some("E"));
        }
        other => panic!("Expected Error, got {:?}", other),
    }
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_missing_schema_url_everywhere() {
    let dir = resources_dir(&[]);
    let envelope = json!({
        "schemas": {"/s-1.json": {"type": "object"}},
        "data": {
            "/a.yml": {"name": "a"},
            "/b.yml": {"items": [1, 2, 3], "$ref": "/a.yml"}
        }
    });

    let report = run(envelope, dir.path());

    let missing: Vec<_> = report
        .outcomes()
        .iter()
        .filter(|o| o.kind() != ValidatedKind::Ref)
        .map(ValidationOutcome::reason)
        .collect();
    assert_eq!(missing, vec![Some(ErrorReason::MissingSchemaUrl); 3]);
}

#[test]
fn test_unfetchable_meta_schema_aborts_the_run() {
    let dir = resources_dir(&[]);
    let envelope = json!({
        "schemas": {
            "/s-1.json": {"$schema": "https://example.invalid/meta.json", "type": "object"}
        },
        "data": {}
    });

    let err = validator(envelope, StaticFetcher::draft_04(), dir.path())
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        BundleError::MissingSchemaFile(ref url) if url == "https://example.invalid/meta.json"
    ));
}

#[test]
fn test_configmap_data_of_any_shape_passes() {
    let dir = resources_dir(&[
        ("cm/list.yml", "apiVersion: v1\nkind: ConfigMap\nmetadata: {}\ndata: [1, 2]\n"),
        (
            "cm/string.json",
            r#"{"apiVersion": "v1", "kind": "ConfigMap", "metadata": {}, "data": "x"}"#,
        ),
        ("cm/none.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata: {}\n"),
    ]);
    let envelope = json!({
        "schemas": {},
        "data": {
            "/ns.yml": {
                "$schema": "/namespace-1.yml",
                "resources": [
                    {"provider": "resource", "path": "/cm/list.yml"},
                    {"provider": "resource", "path": "/cm/string.json"},
                    {"provider": "resource", "path": "/cm/none.yaml"}
                ]
            }
        }
    });

    let report = run(envelope, dir.path());

    let resource_reasons: Vec<_> = report
        .outcomes()
        .iter()
        .filter(|o| o.kind() == ValidatedKind::ResourcePath)
        .map(ValidationOutcome::reason)
        .collect();
    assert_eq!(resource_reasons, vec![None, None, Some(ErrorReason::InvalidObject)]);
}

// =============================================================================
// Full fixture bundle
// =============================================================================

#[test]
fn test_fixture_bundle_outcomes_in_pass_order() {
    let dir = fixture_resources();
    let report = run(fixture_bundle(), dir.path());

    let summaries: Vec<_> = report.outcomes().iter().map(summary).collect();
    let ns = "/namespaces/billing-prod.yml";
    let expected = vec![
        (ValidatedKind::Schema, "/metaschema-1.json", None),
        (ValidatedKind::Schema, "/common-1.json", None),
        (ValidatedKind::Schema, "/app-1.yml", None),
        (ValidatedKind::Schema, "/team-1.yml", None),
        (ValidatedKind::Schema, "/namespace-1.yml", None),
        (ValidatedKind::File, "/teams/sre.yml", None),
        (ValidatedKind::File, "/apps/billing.yml", None),
        (ValidatedKind::File, "/namespaces/billing-prod.yml", None),
        (ValidatedKind::File, "/apps/orphan.yml", Some(ErrorReason::MissingSchemaUrl)),
        (ValidatedKind::File, "/apps/ghost.yml", None),
        (ValidatedKind::Ref, "/apps/billing.yml", None),
        (ValidatedKind::Ref, "/apps/billing.yml", None),
        (ValidatedKind::Ref, "/apps/billing.yml", Some(ErrorReason::IncorrectSchema)),
        (ValidatedKind::Ref, "/apps/ghost.yml", Some(ErrorReason::FileNotFound)),
        (ValidatedKind::ResourcePath, ns, None),
        (ValidatedKind::ResourcePath, ns, Some(ErrorReason::InvalidObject)),
        (ValidatedKind::ResourcePath, ns, Some(ErrorReason::MissingExtension)),
    ];
    let expected: Vec<_> = expected
        .into_iter()
        .map(|(kind, filename, reason)| (kind, filename.to_string(), reason))
        .collect();

    assert_eq!(summaries, expected);
    assert_eq!(report.errors().len(), 5);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_fixture_bundle_records() {
    let dir = fixture_resources();
    let report = run(fixture_bundle(), dir.path());
    let records = report.to_value(false).unwrap();

    assert_eq!(
        records[0],
        json!({
            "filename": "/metaschema-1.json",
            "kind": "SCHEMA",
            "result": {
                "summary": format!("OK: /metaschema-1.json ({})", DRAFT_04),
                "status": "OK",
                "schema_url": DRAFT_04
            }
        })
    );
    assert_eq!(
        records[10],
        json!({
            "filename": "/apps/billing.yml",
            "ref": "/teams/sre.yml",
            "kind": "REF",
            "result": {
                "summary": "OK: /apps/billing.yml (/teams/sre.yml) (/app-1.yml)",
                "status": "OK",
                "schema_url": "/app-1.yml",
                "ref": "/teams/sre.yml"
            }
        })
    );
    assert_eq!(records[12]["result"]["reason"], "INCORRECT_SCHEMA");
    assert_eq!(records[12]["result"]["ref"], "/teams/sre.yml");
    assert_eq!(
        records[12]["result"]["error"],
        "incorrect schema: got `/team-1.yml`, expecting `/namespace-1.yml`"
    );
    assert_eq!(records[15]["result"]["res"], "/billing/cm-nodata.yml");

    let errors = report.to_value(true).unwrap();
    assert_eq!(errors.as_array().map(Vec::len), Some(5));
    assert!(errors.as_array().unwrap().iter().all(|r| r["result"]["status"] == "ERROR"));
}

#[test]
fn test_runs_are_idempotent() {
    let dir = fixture_resources();
    let fetcher = StaticFetcher::draft_04();
    let validator = validator(fixture_bundle(), fetcher.clone(), dir.path());

    let first = validator.run().unwrap();
    let second = validator.run().unwrap();

    assert_eq!(first, second);
    // The fetched meta-schema stays cached for the second run.
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_fetched_meta_schema_is_not_validated_as_bundle_schema() {
    let dir = fixture_resources();
    let validator = validator(fixture_bundle(), StaticFetcher::draft_04(), dir.path());

    let report = validator.run().unwrap();

    assert!(validator.schemas().contains(DRAFT_04));
    assert_eq!(validator.schemas().fetched(), vec![DRAFT_04]);
    assert!(report.outcomes().iter().all(|o| o.filename() != DRAFT_04));
}
