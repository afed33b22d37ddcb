//! Unit tests for loading rule documents from disk

use conform::{load_rule_file, CompileError, CompilerConfig, LoaderError, RuleLoader};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod rule_files {
    use super::*;

    #[test]
    fn test_load_json_rule() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("point.json");
        fs::write(
            &path,
            r#"{
                "type": "array",
                "minLength": 2,
                "maxLength": 3,
                "all": {"type": "number"}
            }"#,
        )
        .unwrap();

        let validator = load_rule_file(&path).unwrap();
        assert!(validator.validate(&json!([1, 2])).is_ok());
        assert!(validator.validate(&json!([1, 2, 3, 4])).is_err());
    }

    #[test]
    fn test_load_yaml_union() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("id.yml");
        fs::write(
            &path,
            r#"
- type: string
  match: "^[0-9a-f]{8}$"
- type: number
"#,
        )
        .unwrap();

        let validator = load_rule_file(&path).unwrap();
        assert!(validator.validate(&json!("deadbeef")).is_ok());
        assert!(validator.validate(&json!(17)).is_ok());

        let err = validator.validate(&json!("xyz")).unwrap_err().into_invalid().unwrap();
        assert_eq!(err.path, "{validator[0]}");
    }

    #[test]
    fn test_yaml_pattern_with_markers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("row.yaml");
        fs::write(
            &path,
            r#"
type: array
pattern:
  - type: string
  - "?"
  - type: number
  - "+"
"#,
        )
        .unwrap();

        let validator = load_rule_file(&path).unwrap();
        assert!(validator.validate(&json!(["label", 1, 2])).is_ok());
        assert!(validator.validate(&json!([1])).is_ok());
        assert!(validator.validate(&json!(["label"])).is_err());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        assert!(matches!(load_rule_file(&path), Err(LoaderError::IoError { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rule.toml");
        fs::write(&path, "type = \"number\"").unwrap();

        assert!(matches!(
            load_rule_file(&path),
            Err(LoaderError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_compile_errors_carry_the_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, r#"{"type": "array", "pattern": ["+"]}"#).unwrap();

        match load_rule_file(&path) {
            Err(LoaderError::InvalidRule { path: reported, source }) => {
                assert_eq!(reported, path);
                assert!(matches!(source, CompileError::DanglingQuantifier { .. }));
            }
            other => panic!("expected an invalid rule error, got {:?}", other.map(|v| v.describe())),
        }
    }

    #[test]
    fn test_strict_loader_rejects_unknown_options() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("typo.json");
        fs::write(&path, r#"{"type": "object", "mandatroy": {}}"#).unwrap();

        assert!(load_rule_file(&path).is_ok());
        assert!(matches!(
            RuleLoader::with_config(CompilerConfig::strict()).load(&path),
            Err(LoaderError::InvalidRule {
                source: CompileError::UnknownOption { .. },
                ..
            })
        ));
    }
}
