//! Canonical lesson content model
//!
//! Every loader path produces a [`LessonDocument`] in this shape, whatever
//! historical JSON layout the source file used. Unknown fields are kept in the
//! flattened `extra` maps so a canonical document survives a serialize /
//! deserialize round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Section-level metadata key marking intentionally reused template content
pub const SECTION_TEMPLATE_KEY: &str = "sectionTemplate";

/// One unit of educational content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDocument {
    #[serde(default)]
    pub lesson_id: String,
    #[serde(default)]
    pub module_id: String,
    #[serde(default)]
    pub title: String,
    /// Page list for lessons authored in the flat sections layout
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub content: LessonContent,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Top-level fields outside the canonical model (difficulty, duration, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Structured lesson body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonContent {
    #[serde(default)]
    pub introduction: Introduction,
    #[serde(default)]
    pub theory: Theory,
    #[serde(default)]
    pub visual_elements: Vec<Value>,
    #[serde(default)]
    pub practical_cases: Vec<Value>,
    #[serde(default)]
    pub key_points: Vec<Value>,
    #[serde(default)]
    pub assessment: Assessment,
    #[serde(default)]
    pub references: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Introduction {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub objectives: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theory {
    #[serde(default)]
    pub sections: Vec<Value>,
    #[serde(default)]
    pub examples: Vec<Value>,
    #[serde(default)]
    pub analogies: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(default)]
    pub questions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of lesson content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: u32,
    /// Rendering kind (free-form, not validated)
    #[serde(rename = "type", default)]
    pub section_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub media: Value,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Section {
    /// Build a section from arbitrary JSON without failing
    ///
    /// Fields of the wrong type degrade to their defaults; an `order` that is
    /// not a non-negative integer becomes 0.
    pub fn from_value_lossy(value: &Value) -> Self {
        if let Ok(section) = serde_json::from_value::<Section>(value.clone()) {
            return section;
        }

        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id: text("id"),
            title: text("title"),
            order: obj
                .get("order")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            section_type: text("type"),
            content: obj.get("content").cloned().unwrap_or(Value::Null),
            media: obj.get("media").cloned().unwrap_or(Value::Null),
            metadata: obj
                .get("metadata")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// True when a raw section is flagged as an intentionally reused template
///
/// Only a literal `true` under `metadata.sectionTemplate` counts.
pub fn is_template_section(section: &Value) -> bool {
    matches!(
        section.get("metadata").and_then(|m| m.get(SECTION_TEMPLATE_KEY)),
        Some(Value::Bool(true))
    )
}
