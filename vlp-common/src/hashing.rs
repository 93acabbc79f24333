//! Content-identity hashing of lesson sections
//!
//! Computes a SHA-256 digest over a section's semantic content. Object keys are
//! sorted recursively before serialization so two sections that differ only in
//! key order hash identically. Array element order is significant.
//!
//! **Hashed fields:** `id`, `title`, `type`, `content`, `media`, `order`, plus
//! `metadata` when it is non-empty after removing `sectionTemplate`.

use crate::lesson::SECTION_TEMPLATE_KEY;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

const HASHED_FIELDS: [&str; 6] = ["id", "title", "type", "content", "media", "order"];

/// Digest of a section given as a JSON object
///
/// Fields absent from the section are absent from the hashed body. Non-object
/// input hashes as an empty body.
pub fn content_digest(section: &Value) -> String {
    let body = digest_body(section);
    let serialized = canonical_json(&body);

    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Select the hashed fields of a section
fn digest_body(section: &Value) -> Value {
    let mut body = Map::new();
    let Some(obj) = section.as_object() else {
        return Value::Object(body);
    };

    for field in HASHED_FIELDS {
        if let Some(value) = obj.get(field) {
            body.insert(field.to_string(), value.clone());
        }
    }

    if let Some(Value::Object(metadata)) = obj.get("metadata") {
        let mut metadata = metadata.clone();
        metadata.remove(SECTION_TEMPLATE_KEY);
        if !metadata.is_empty() {
            body.insert("metadata".to_string(), Value::Object(metadata));
        }
    }

    Value::Object(body)
}

/// Serialize JSON with object keys sorted at every depth
///
/// Independent of the map ordering serde_json was compiled with.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
