//! Loading rule documents from YAML and JSON files
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::compiler::{Compiler, CompilerConfig};
use crate::error::CompileError;
use crate::rule::RuleInput;
use crate::validator::Validator;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised while loading a rule document
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The document parsed but is not a valid rule
    #[error("Invalid rule in '{path}': {source}")]
    InvalidRule {
        path: PathBuf,
        source: CompileError,
    },
}

/// Supported rule document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Reads rule documents and compiles them
#[derive(Debug, Clone, Default)]
pub struct RuleLoader {
    compiler: Compiler,
}

impl RuleLoader {
    /// Create a loader with default compiler configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            compiler: Compiler::with_config(config),
        }
    }

    /// Load and compile a rule file, detecting format from its extension
    pub fn load(&self, path: &Path) -> LoaderResult<Validator> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| LoaderError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), ?format, "loading rule document");
        self.load_str(&content, format, path)
    }

    /// Compile rule document content; `path` is only used in errors
    pub fn load_str(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Validator> {
        let document = parse_content(content, format, path)?;

        RuleInput::from_json(&document)
            .and_then(|rule| self.compiler.compile(rule))
            .map_err(|source| LoaderError::InvalidRule {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Parse document content into a JSON value
pub fn parse_content(content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
    match format {
        Format::Yaml => {
            let yaml_value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|source| LoaderError::YamlParseError {
                    path: path.to_path_buf(),
                    source,
                })?;

            // Convert to JSON Value for consistent handling
            serde_json::to_value(yaml_value).map_err(|source| LoaderError::JsonParseError {
                path: path.to_path_buf(),
                source,
            })
        }
        Format::Json => serde_json::from_str(content).map_err(|source| LoaderError::JsonParseError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load and compile a rule file with the default configuration
pub fn load_rule_file(path: &Path) -> LoaderResult<Validator> {
    RuleLoader::new().load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("rules.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("rules.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("rules.json")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("rules.toml")).is_err());
        assert!(Format::from_path(Path::new("rules")).is_err());
    }

    #[test]
    fn test_yaml_document() {
        let content = r#"
type: object
required:
  id: { type: number }
props:
  tags:
    type: array
    all: { type: string }
"#;
        let validator = RuleLoader::new()
            .load_str(content, Format::Yaml, Path::new("inline.yaml"))
            .unwrap();

        assert!(validator.validate(&json!({"id": 1, "tags": ["a", "b"]})).is_ok());
        let err = validator
            .validate(&json!({"id": 1, "tags": ["a", 2]}))
            .unwrap_err()
            .into_invalid()
            .unwrap();
        assert_eq!(err.path, ".tags[1]");
    }

    #[test]
    fn test_invalid_documents() {
        let loader = RuleLoader::new();
        let path = Path::new("inline.json");

        assert!(matches!(
            loader.load_str("{not json", Format::Json, path),
            Err(LoaderError::JsonParseError { .. })
        ));
        assert!(matches!(
            loader.load_str("\"number\"", Format::Json, path),
            Err(LoaderError::InvalidRule { .. })
        ));
        assert!(matches!(
            loader.load_str("key: [unclosed", Format::Yaml, Path::new("inline.yaml")),
            Err(LoaderError::YamlParseError { .. })
        ));
    }
}
