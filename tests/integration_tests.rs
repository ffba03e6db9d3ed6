//! Integration tests that drive settings files and the CLI end to end

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use typespec_clientgen::settings::{FluentMode, SyncMethods, UnionPolicy};
use typespec_clientgen::{map_code_model, CodeModel, DefaultMapperFactory, MapperError, Settings};

const CODE_MODEL: &str = r#"{
    "name": "PetStoreClient",
    "schemas": [
        { "name": "string", "type": "primitive", "primitive": "string" },
        { "name": "int32", "type": "primitive", "primitive": "int32" },
        {
            "name": "Pet",
            "type": "object",
            "usage": ["input", "output"],
            "properties": [
                { "name": "name", "schema": 0, "required": true },
                { "name": "age", "schema": 1 },
                { "name": "apiKey", "schema": 0, "required": true }
            ]
        }
    ],
    "operation-groups": [
        {
            "name": "pets",
            "operations": [
                {
                    "name": "get",
                    "method": "get",
                    "path": "/pets/{name}",
                    "parameters": [
                        { "name": "endpoint", "schema": 0, "required": true, "location": "uri", "implementation": "client", "origin": "endpoint" },
                        { "name": "name", "schema": 0, "required": true, "location": "path" }
                    ],
                    "responses": [{ "status-codes": ["200"], "schema": 2 }]
                }
            ]
        }
    ]
}"#;

// ============================================================================
// Helper Functions
// ============================================================================

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsp-clientgen"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run tsp-clientgen")
}

fn read_document(path: &Path) -> Value {
    let source = fs::read_to_string(path).unwrap();
    serde_json::from_str(&source).unwrap()
}

// ============================================================================
// Settings File Tests
// ============================================================================

#[test]
fn test_settings_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "settings.json",
        r#"{
            "namespace": "com.example.petstore",
            "sync-methods": "all",
            "fluent": "lite",
            "union-policy": "binary-data",
            "custom-types": ["Pet"],
            "custom-types-subpackage": "custom"
        }"#,
    );

    let settings = Settings::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(settings.namespace, "com.example.petstore");
    assert_eq!(settings.sync_methods, SyncMethods::All);
    assert_eq!(settings.fluent, FluentMode::Lite);
    assert_eq!(settings.union_policy, UnionPolicy::BinaryData);
    assert!(settings.is_custom_type("Pet"));
    // Unset keys keep their defaults.
    assert_eq!(settings.models_subpackage, "models");
    assert!(settings.branded);
}

#[test]
fn test_settings_without_namespace() {
    let result = Settings::from_json(r#"{ "data-plane": true }"#);
    assert!(matches!(result, Err(MapperError::MissingSetting { setting, .. }) if setting == "namespace"));
}

#[test]
fn test_settings_with_unknown_value() {
    let result = Settings::from_json(r#"{ "namespace": "com.example", "sync-methods": "sometimes" }"#);
    assert!(matches!(result, Err(MapperError::Json(_))));
}

#[test]
fn test_custom_types_package() {
    let temp_dir = TempDir::new().unwrap();
    let model_path = write_file(temp_dir.path(), "codemodel.json", CODE_MODEL);
    let code_model = CodeModel::from_json(&fs::read_to_string(&model_path).unwrap()).unwrap();

    let settings = Settings {
        custom_types: ["Pet".to_string()].into_iter().collect(),
        custom_types_subpackage: "custom".to_string(),
        ..Settings::with_namespace("com.example.petstore")
    };
    let client = map_code_model(&code_model, &settings, &DefaultMapperFactory).unwrap();
    assert_eq!(client.model_by_name("Pet").unwrap().package, "com.example.petstore.custom");
}

#[test]
fn test_malformed_code_model() {
    let result = CodeModel::from_json(r#"{ "name": "Broken", "schemas": [ { "type": "object" "#);
    assert!(matches!(result, Err(MapperError::Json(_))));
}

// ============================================================================
// CLI Tests
// ============================================================================

#[test]
fn test_cli_writes_client_model() {
    let temp_dir = TempDir::new().unwrap();
    let model_path = write_file(temp_dir.path(), "codemodel.json", CODE_MODEL);
    let settings_path = write_file(
        temp_dir.path(),
        "settings.json",
        r#"{ "namespace": "com.example.petstore" }"#,
    );
    let output_path = temp_dir.path().join("client.json");

    let output = run_cli(&[
        model_path.to_str().unwrap(),
        "--settings",
        settings_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
        "--examples",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_document(&output_path);
    assert_eq!(document["client"]["client_name"], "PetStoreClient");
    assert_eq!(document["client"]["models"][0]["name"], "Pet");

    let pet = &document["examples"]["Pet"];
    assert!(pet["name"].is_string());
    assert_eq!(pet["apiKey"], "fakeSecretPlaceholder");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Mapped PetStoreClient: 1 models"));
}

#[test]
fn test_cli_namespace_override() {
    let temp_dir = TempDir::new().unwrap();
    let model_path = write_file(temp_dir.path(), "codemodel.json", CODE_MODEL);
    let output_path = temp_dir.path().join("client.json");

    let output = run_cli(&[
        model_path.to_str().unwrap(),
        "--namespace",
        "com.example.cli",
        "--output",
        output_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_document(&output_path);
    assert_eq!(document["client"]["models"][0]["package"], "com.example.cli.models");
    assert!(document.get("examples").is_none());
}

#[test]
fn test_cli_fluent_flavor() {
    let temp_dir = TempDir::new().unwrap();
    let model_path = write_file(temp_dir.path(), "codemodel.json", CODE_MODEL);
    let settings_path = write_file(
        temp_dir.path(),
        "settings.json",
        r#"{ "namespace": "com.example.petstore", "fluent": "lite" }"#,
    );
    let output_path = temp_dir.path().join("client.json");

    let output = run_cli(&[
        model_path.to_str().unwrap(),
        "--settings",
        settings_path.to_str().unwrap(),
        "--flavor",
        "fluent",
        "--output",
        output_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_document(&output_path);
    assert_eq!(document["client"]["models"][0]["name"], "PetInner");
}

#[test]
fn test_cli_missing_namespace_fails() {
    let temp_dir = TempDir::new().unwrap();
    let model_path = write_file(temp_dir.path(), "codemodel.json", CODE_MODEL);

    let output = run_cli(&[model_path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("namespace"), "{}", stderr);
}

#[test]
fn test_cli_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.json");

    let output = run_cli(&[missing.to_str().unwrap(), "--namespace", "com.example"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read"), "{}", stderr);
}
