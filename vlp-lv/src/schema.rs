//! JSON Schema checking of lesson files
//!
//! Wraps a compiled `jsonschema` validator. The bundled lesson schema is used
//! unless an external schema document is configured.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lesson schema shipped with the validator
pub const BUNDLED_SCHEMA: &str = include_str!("../schema/lesson.schema.json");

/// Unusable schema document
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSON Schema: {0}")]
    Invalid(String),
}

/// Compiled lesson schema
pub struct SchemaChecker {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaChecker").finish_non_exhaustive()
    }
}

impl SchemaChecker {
    /// Compile a schema document
    pub fn from_value(schema: &Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| SchemaError::Invalid(e.to_string()))?;
        Ok(Self { validator })
    }

    /// The bundled lesson schema
    pub fn bundled() -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(BUNDLED_SCHEMA).map_err(|source| SchemaError::Parse {
                path: PathBuf::from("lesson.schema.json"),
                source,
            })?;
        Self::from_value(&schema)
    }

    /// Load and compile a schema document from disk
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: Value = serde_json::from_str(&text).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(schema = %path.display(), "Compiled external lesson schema");
        Self::from_value(&schema)
    }

    /// External schema when configured, bundled otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, SchemaError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Every schema violation of `instance`, as `<instance path>: <message>`
    pub fn check(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|error| {
                let location = error.instance_path.to_string();
                let location = if location.is_empty() { "/" } else { &location };
                format!("{}: {}", location, error)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn valid_lesson() -> Value {
        json!({
            "lessonId": "lesson-01-respiratory-anatomy",
            "title": "Respiratory Anatomy",
            "sections": [
                { "id": "intro", "title": "Introduction", "order": 1, "type": "introduction", "content": "Airways" }
            ]
        })
    }

    #[test]
    fn test_bundled_schema_accepts_valid_lesson() {
        let checker = SchemaChecker::bundled().unwrap();
        assert!(checker.check(&valid_lesson()).is_empty());
    }

    #[test]
    fn test_bundled_schema_accepts_empty_sections() {
        let checker = SchemaChecker::bundled().unwrap();
        let lesson = json!({ "lessonId": "a", "title": "A", "sections": [] });
        assert!(checker.check(&lesson).is_empty());
    }

    #[test]
    fn test_bundled_schema_reports_every_violation() {
        let checker = SchemaChecker::bundled().unwrap();
        let lesson = json!({
            "lessonId": "",
            "sections": [{ "id": "intro", "title": "Intro", "order": 0, "type": "introduction" }]
        });

        let errors = checker.check(&lesson);
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("title")));
        assert!(errors.iter().any(|e| e.starts_with("/sections/0/order")));
    }

    #[test]
    fn test_external_schema_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lesson.schema.json");
        std::fs::write(
            &path,
            r#"{ "type": "object", "required": ["moduleId"] }"#,
        )
        .unwrap();

        let checker = SchemaChecker::load(Some(&path)).unwrap();
        let errors = checker.check(&valid_lesson());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("/: "));
    }

    #[test]
    fn test_unusable_schema_documents() {
        let temp_dir = TempDir::new().unwrap();

        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            SchemaChecker::from_file(&missing),
            Err(SchemaError::Read { .. })
        ));

        let garbage = temp_dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            SchemaChecker::from_file(&garbage),
            Err(SchemaError::Parse { .. })
        ));

        assert!(matches!(
            SchemaChecker::from_value(&json!({ "type": "no-such-type" })),
            Err(SchemaError::Invalid(_))
        ));
    }
}
