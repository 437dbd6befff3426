//! Integration tests for loading configuration files from disk.

use std::io::Write;

use cellpack_mcp::config::load_config;
use cellpack_mcp::mcp::ServerSettings;
use cellpack_mcp::pack::{CapacityUnit, SearchBounds};
use cellpack_mcp::ConfigError;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"{
            "_comment": "workshop bench packs",
            "defaults": { "loss_percent": 10.0, "capacity_unit": "Ah" },
            "search": { "max_series": 40, "max_parallel": 8 },
            "schematic": { "max_width": 60, "max_height": 12 },
            "logging": { "level": "info" }
        }"#,
    );

    let config = load_config(Some(file.path())).unwrap();
    assert!((config.defaults.loss_percent - 10.0).abs() < f64::EPSILON);
    assert!((config.defaults.variation_percent - 100.0).abs() < f64::EPSILON);
    assert_eq!(config.defaults.capacity_unit, CapacityUnit::AmpHours);
    assert_eq!(config.search.bounds(), SearchBounds::new(40, 8));
    assert_eq!(config.logging.level, "info");

    let settings = ServerSettings::from_config(&config);
    assert_eq!(settings.sizer.bounds(), SearchBounds::new(40, 8));
    assert_eq!(settings.schematic.max_width, 60);
    assert_eq!(settings.schematic.max_height, 12);
}

#[test]
fn test_empty_object_uses_defaults() {
    let file = write_config("{}");

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.search.bounds(), SearchBounds::default());
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_malformed_json_is_parse_error() {
    let file = write_config(r#"{ "search": { "max_series": 20, }"#);

    let result = load_config(Some(file.path()));
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_unknown_field_is_parse_error() {
    let file = write_config(r#"{ "search": { "max_series": 20, "max_depth": 4 } }"#);

    let result = load_config(Some(file.path()));
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_out_of_range_bound_is_validation_error() {
    let file = write_config(r#"{ "search": { "max_parallel": 5000 } }"#);

    let err = load_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains("max_parallel"));
}

#[test]
fn test_invalid_default_loss_is_validation_error() {
    let file = write_config(r#"{ "defaults": { "loss_percent": -5 } }"#);

    let result = load_config(Some(file.path()));
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn test_missing_explicit_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let result = load_config(Some(&path));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn test_unknown_capacity_unit_is_parse_error() {
    let file = write_config(r#"{ "defaults": { "capacity_unit": "Wh" } }"#);

    let result = load_config(Some(file.path()));
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_oversized_schematic_is_validation_error() {
    let file = write_config(r#"{ "schematic": { "max_width": 1000000000 } }"#);

    let err = load_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains("max_width"));
}
