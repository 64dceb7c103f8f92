//! Integration tests for config loading from fixture files.
//!
//! These tests verify that the sample config file stays valid and keeps the
//! expected shape.

use std::fs;
use std::path::Path;

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/modelsort.json");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/modelsort.json");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_json() {
    let config_content = read_sample_config();
    let result: Result<serde_json::Value, _> = serde_json::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid JSON: {:?}", result.err());
}

#[test]
fn sample_config_has_all_keys() {
    let config_content = read_sample_config();
    let value: serde_json::Value = serde_json::from_str(&config_content).expect("should parse");

    let object = value.as_object().expect("should be an object");

    let expected_keys = ["ignore_extensions", "ignore_folders", "ignore_groups", "ignore_files"];
    for key in expected_keys {
        assert!(object.contains_key(key), "Config should have \"{key}\" key");
    }
}

#[test]
fn sample_config_keys_are_string_arrays() {
    let config_content = read_sample_config();
    let value: serde_json::Value = serde_json::from_str(&config_content).expect("should parse");
    let object = value.as_object().expect("should be an object");

    for (key, entry) in object {
        let array = entry.as_array().unwrap_or_else(|| panic!("\"{key}\" should be an array"));
        assert!(
            array.iter().all(serde_json::Value::is_string),
            "\"{key}\" should contain only strings"
        );
    }
}

#[test]
fn sample_config_extensions_start_with_a_dot() {
    let config_content = read_sample_config();
    let value: serde_json::Value = serde_json::from_str(&config_content).expect("should parse");

    let extensions = value
        .get("ignore_extensions")
        .and_then(serde_json::Value::as_array)
        .expect("should have ignore_extensions");
    for extension in extensions {
        let extension = extension.as_str().expect("should be a string");
        assert!(
            extension.starts_with('.'),
            "Extension \"{extension}\" should start with a dot"
        );
    }
}
