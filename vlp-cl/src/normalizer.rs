//! Legacy lesson format normalizer
//!
//! Lesson JSON exists in three historical layouts. Each is detected once by
//! discriminant checks and mapped by its own pure function into the canonical
//! [`LessonDocument`]:
//!
//! - **Canonical**: has `lessonId` and `content.introduction`; kept as-is
//! - **Flat sections**: has a `sections` array of typed pages
//! - **Legacy**: pre-schema documents with Spanish-keyed top-level fields
//!
//! Normalization never fails. Missing or mistyped fields degrade to empty
//! strings, lists or objects.

use serde_json::{json, Map, Value};
use tracing::debug;
use vlp_common::lesson::{Assessment, Introduction, LessonContent, LessonDocument, Section, Theory};

/// Markers that open a key point line in summary text
const BULLET_MARKERS: [char; 4] = ['-', '*', '•', '·'];

/// Image file extensions recognized in media references
const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

static NULL: Value = Value::Null;

/// Top-level keys consumed by the flat sections mapping
const FLAT_KNOWN_KEYS: [&str; 5] = ["lessonId", "moduleId", "title", "sections", "metadata"];

// ============================================================================
// Shape detection
// ============================================================================

/// Historical layout of a raw lesson document
#[derive(Debug, Clone, Copy)]
pub enum LessonShape<'a> {
    Canonical(&'a Map<String, Value>),
    FlatSections {
        root: &'a Map<String, Value>,
        sections: &'a [Value],
    },
    Legacy(&'a Map<String, Value>),
}

impl<'a> LessonShape<'a> {
    /// Classify a raw lesson object, checking the shapes in priority order
    pub fn detect(root: &'a Map<String, Value>) -> Self {
        let has_introduction = root
            .get("content")
            .and_then(|c| c.get("introduction"))
            .is_some();

        if root.contains_key("lessonId") && has_introduction {
            return LessonShape::Canonical(root);
        }

        if let Some(Value::Array(sections)) = root.get("sections") {
            return LessonShape::FlatSections { root, sections };
        }

        LessonShape::Legacy(root)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LessonShape::Canonical(_) => "canonical",
            LessonShape::FlatSections { .. } => "flat-sections",
            LessonShape::Legacy(_) => "legacy",
        }
    }
}

/// Normalize any raw lesson JSON into the canonical document
///
/// Non-object input yields an empty canonical document.
pub fn normalize(raw: &Value) -> LessonDocument {
    let Some(root) = raw.as_object() else {
        debug!("Lesson data is not an object, producing empty document");
        return LessonDocument::default();
    };

    let shape = LessonShape::detect(root);
    debug!(shape = shape.name(), "Normalizing lesson");

    match shape {
        LessonShape::Canonical(root) => from_canonical(root),
        LessonShape::FlatSections { root, sections } => from_flat_sections(root, sections),
        LessonShape::Legacy(root) => from_legacy(root),
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// First non-empty string among candidate keys
fn first_str(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .map(|k| str_field(obj, k))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn list_field(obj: &Map<String, Value>, key: &str) -> Vec<Value> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// First non-empty list among candidate keys; a lone object counts as one item
fn first_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<Value> {
    for key in keys {
        match obj.get(*key) {
            Some(Value::Array(items)) if !items.is_empty() => return items.clone(),
            Some(item @ Value::Object(_)) => return vec![item.clone()],
            _ => {}
        }
    }
    Vec::new()
}

fn first_obj<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_object))
}

fn obj_field(obj: &Map<String, Value>, key: &str) -> Map<String, Value> {
    obj.get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Readable text of a content body
///
/// Strings are used as-is, objects yield their first text-like field, arrays
/// of strings are joined line by line.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => first_str(obj, &["text", "body", "content", "texto", "contenido"]),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Gather every array stored under `key` anywhere inside `value`
fn collect_nested(value: &Value, key: &str, out: &mut Vec<Value>) {
    match value {
        Value::Object(obj) => {
            for (k, v) in obj {
                if k == key {
                    match v {
                        Value::Array(items) => out.extend(items.iter().cloned()),
                        other => collect_nested(other, key, out),
                    }
                } else {
                    collect_nested(v, key, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_nested(item, key, out);
            }
        }
        _ => {}
    }
}

/// Lines of text that start with a bullet marker, marker stripped
fn bullet_points(text: &str) -> Vec<Value> {
    text.lines()
        .map(str::trim_start)
        .filter_map(|line| line.strip_prefix(&BULLET_MARKERS[..]))
        .map(str::trim)
        .filter(|point| !point.is_empty())
        .map(|point| Value::String(point.to_string()))
        .collect()
}

fn is_image_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// True for media entries that reference an image
fn is_image_media(item: &Value) -> bool {
    match item {
        Value::String(path) => is_image_path(path),
        Value::Object(obj) => {
            let tagged = matches!(
                obj.get("type").and_then(Value::as_str),
                Some("image") | Some("diagram") | Some("illustration")
            );
            tagged
                || obj.contains_key("image")
                || ["src", "url", "path"]
                    .iter()
                    .any(|k| obj.get(*k).and_then(Value::as_str).is_some_and(is_image_path))
        }
        _ => false,
    }
}

/// Image-bearing entries of a section's media field
fn image_media(media: &Value) -> Vec<Value> {
    match media {
        Value::Array(items) => items.iter().filter(|i| is_image_media(i)).cloned().collect(),
        Value::Object(obj) => {
            if let Some(Value::Array(images)) = obj.get("images") {
                images.clone()
            } else if is_image_media(media) {
                vec![media.clone()]
            } else {
                Vec::new()
            }
        }
        other if is_image_media(other) => vec![other.clone()],
        _ => Vec::new(),
    }
}

fn fill_if_empty(target: &mut Vec<Value>, fallback: Vec<Value>) {
    if target.is_empty() {
        *target = fallback;
    }
}

fn split_extra(root: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    root.iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

// ============================================================================
// Canonical
// ============================================================================

fn from_canonical(root: &Map<String, Value>) -> LessonDocument {
    match serde_json::from_value::<LessonDocument>(Value::Object(root.clone())) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "Canonical lesson has mistyped fields, mapping leniently");
            lenient_canonical(root)
        }
    }
}

fn lenient_canonical(root: &Map<String, Value>) -> LessonDocument {
    let content = obj_field(root, "content");
    let introduction = obj_field(&content, "introduction");
    let theory = obj_field(&content, "theory");
    let assessment = obj_field(&content, "assessment");

    LessonDocument {
        lesson_id: str_field(root, "lessonId"),
        module_id: str_field(root, "moduleId"),
        title: str_field(root, "title"),
        sections: list_field(root, "sections")
            .iter()
            .map(Section::from_value_lossy)
            .collect(),
        content: LessonContent {
            introduction: Introduction {
                text: text_of(introduction.get("text").unwrap_or(&NULL)),
                objectives: list_field(&introduction, "objectives"),
                extra: split_extra(&introduction, &["text", "objectives"]),
            },
            theory: Theory {
                sections: list_field(&theory, "sections"),
                examples: list_field(&theory, "examples"),
                analogies: list_field(&theory, "analogies"),
                extra: split_extra(&theory, &["sections", "examples", "analogies"]),
            },
            visual_elements: list_field(&content, "visualElements"),
            practical_cases: list_field(&content, "practicalCases"),
            key_points: list_field(&content, "keyPoints"),
            assessment: Assessment {
                questions: list_field(&assessment, "questions"),
                extra: split_extra(&assessment, &["questions"]),
            },
            references: list_field(&content, "references"),
            extra: split_extra(
                &content,
                &[
                    "introduction",
                    "theory",
                    "visualElements",
                    "practicalCases",
                    "keyPoints",
                    "assessment",
                    "references",
                ],
            ),
        },
        metadata: obj_field(root, "metadata"),
        extra: split_extra(root, &["lessonId", "moduleId", "title", "sections", "content", "metadata"]),
    }
}

// ============================================================================
// Flat sections
// ============================================================================

/// What a flat section contributes to the canonical content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionRole {
    Introduction,
    Theory,
    Practical,
    Summary,
    Assessment,
    Other,
}

fn role_of(section_type: &str) -> SectionRole {
    match section_type.to_ascii_lowercase().as_str() {
        "introduction" | "intro" => SectionRole::Introduction,
        "theory" | "procedure" | "concept" | "concepts" => SectionRole::Theory,
        "case" | "practical" | "case-study" | "clinical-case" | "practical-case" => {
            SectionRole::Practical
        }
        "summary" | "conclusion" => SectionRole::Summary,
        "assessment" | "quiz" | "evaluation" => SectionRole::Assessment,
        _ => SectionRole::Other,
    }
}

fn from_flat_sections(root: &Map<String, Value>, raw_sections: &[Value]) -> LessonDocument {
    let empty = Map::new();
    let mut content = LessonContent::default();

    for raw in raw_sections {
        let section = raw.as_object().unwrap_or(&empty);
        let body = section.get("content").unwrap_or(&NULL);
        let body_obj = body.as_object().unwrap_or(&empty);
        let title = str_field(section, "title");

        match role_of(&str_field(section, "type")) {
            SectionRole::Introduction => {
                if content.introduction.text.is_empty() {
                    content.introduction.text = text_of(body);
                }
                if content.introduction.objectives.is_empty() {
                    content.introduction.objectives =
                        first_list(body_obj, &["objectives"]);
                }
                if content.introduction.objectives.is_empty() {
                    content.introduction.objectives = list_field(section, "objectives");
                }
            }
            SectionRole::Theory => {
                let mut entry = json!({ "title": title, "content": text_of(body) });
                if let Some(media) = section.get("media").filter(|m| !m.is_null()) {
                    entry["media"] = media.clone();
                }
                content.theory.sections.push(entry);
                content.theory.examples.extend(list_field(body_obj, "examples"));
                content.theory.analogies.extend(list_field(body_obj, "analogies"));
            }
            SectionRole::Practical => {
                let mut entry = json!({ "title": title, "description": text_of(body) });
                for key in ["patientData", "questions"] {
                    if let Some(value) = body_obj.get(key).or_else(|| section.get(key)) {
                        entry[key] = value.clone();
                    }
                }
                content.practical_cases.push(entry);
            }
            SectionRole::Summary => {
                content.key_points.extend(bullet_points(&text_of(body)));
                content.key_points.extend(list_field(body_obj, "keyPoints"));
            }
            SectionRole::Assessment | SectionRole::Other => {}
        }

        if let Some(media) = section.get("media") {
            content.visual_elements.extend(image_media(media));
        }
    }

    let all_sections = Value::Array(raw_sections.to_vec());
    collect_nested(&all_sections, "questions", &mut content.assessment.questions);
    collect_nested(&all_sections, "references", &mut content.references);

    // Fall back to equivalent top-level fields for anything still empty, then
    // to a stray pre-canonical `content` object
    let raw_content = root.get("content").and_then(Value::as_object);
    for source in std::iter::once(root).chain(raw_content) {
        fill_from_top_level(&mut content, source);
    }

    let mut consumed: Vec<&str> = FLAT_KNOWN_KEYS.to_vec();
    consumed.extend([
        "introduction",
        "description",
        "objectives",
        "theory",
        "visualElements",
        "practicalCases",
        "keyPoints",
        "references",
        "questions",
        "assessment",
        "quiz",
        "content",
    ]);

    LessonDocument {
        lesson_id: first_str(root, &["lessonId", "id"]),
        module_id: str_field(root, "moduleId"),
        title: str_field(root, "title"),
        sections: raw_sections.iter().map(Section::from_value_lossy).collect(),
        content,
        metadata: obj_field(root, "metadata"),
        extra: split_extra(root, &consumed),
    }
}

/// Fill still-empty canonical content fields from top-level style keys of `source`
fn fill_from_top_level(content: &mut LessonContent, source: &Map<String, Value>) {
    let top_intro = source.get("introduction").unwrap_or(&NULL);
    if content.introduction.text.is_empty() {
        content.introduction.text = text_of(top_intro);
    }
    if content.introduction.text.is_empty() {
        content.introduction.text = str_field(source, "description");
    }
    fill_if_empty(&mut content.introduction.objectives, list_field(source, "objectives"));
    if let Some(intro) = top_intro.as_object() {
        fill_if_empty(&mut content.introduction.objectives, list_field(intro, "objectives"));
    }
    if let Some(theory) = source.get("theory").and_then(Value::as_object) {
        fill_if_empty(&mut content.theory.sections, list_field(theory, "sections"));
        fill_if_empty(&mut content.theory.examples, list_field(theory, "examples"));
        fill_if_empty(&mut content.theory.analogies, list_field(theory, "analogies"));
    }
    fill_if_empty(&mut content.visual_elements, list_field(source, "visualElements"));
    fill_if_empty(&mut content.practical_cases, list_field(source, "practicalCases"));
    fill_if_empty(&mut content.key_points, list_field(source, "keyPoints"));
    fill_if_empty(&mut content.references, list_field(source, "references"));
    fill_if_empty(&mut content.assessment.questions, list_field(source, "questions"));
    if let Some(assessment) = first_obj(source, &["assessment", "quiz"]) {
        fill_if_empty(&mut content.assessment.questions, list_field(assessment, "questions"));
    }
}

// ============================================================================
// Legacy (Spanish-keyed)
// ============================================================================

const LEGACY_TITLE: [&str; 5] = ["titulo", "título", "Titulo", "Título", "title"];
const LEGACY_INTRO: [&str; 5] = [
    "introduccion",
    "introducción",
    "Introduccion",
    "Introducción",
    "introduction",
];
const LEGACY_THEORY: [&str; 5] = [
    "conceptosTeoricos",
    "conceptosTeóricos",
    "conceptos_teoricos",
    "Conceptos Teóricos",
    "marcoTeorico",
];
const LEGACY_THEORY_TITLE: &str = "Conceptos Teóricos";

fn from_legacy(root: &Map<String, Value>) -> LessonDocument {
    let mut content = LessonContent::default();

    // Introduction: object with localized keys, or plain text
    match LEGACY_INTRO.iter().find_map(|k| root.get(*k)) {
        Some(Value::Object(intro)) => {
            content.introduction.text = first_str(intro, &["texto", "text", "contenido"]);
            content.introduction.objectives = first_list(intro, &["objetivos", "objectives"]);
        }
        Some(other) => content.introduction.text = text_of(other),
        None => {}
    }
    fill_if_empty(
        &mut content.introduction.objectives,
        first_list(root, &["objetivos", "objectives"]),
    );

    // Theoretical concepts become the single theory section
    if let Some(theory) = LEGACY_THEORY.iter().find_map(|k| root.get(*k)) {
        let text = text_of(theory);
        if !text.is_empty() {
            content.theory.sections.push(json!({
                "title": LEGACY_THEORY_TITLE,
                "content": text,
            }));
        }
        if let Some(theory) = theory.as_object() {
            content.theory.examples = first_list(theory, &["ejemplos", "examples"]);
            content.theory.analogies = first_list(theory, &["analogias", "analogías", "analogies"]);
        }
    }
    fill_if_empty(&mut content.theory.examples, first_list(root, &["ejemplos"]));
    fill_if_empty(
        &mut content.theory.analogies,
        first_list(root, &["analogias", "analogías"]),
    );

    content.visual_elements = first_list(root, &["elementosVisuales", "recursosVisuales"]);
    content.practical_cases = first_list(
        root,
        &["casosPracticos", "casosPrácticos", "casosClinicos", "casosClínicos", "casoClinico"],
    );

    content.key_points = first_list(root, &["puntosClave", "puntos_clave"]);
    if content.key_points.is_empty() {
        content.key_points = bullet_points(&first_str(root, &["resumen"]));
    }

    content.assessment.questions = match first_obj(root, &["evaluacion", "evaluación"]) {
        Some(evaluation) => first_list(evaluation, &["preguntas", "questions"]),
        None => first_list(root, &["evaluacion", "evaluación"]),
    };
    fill_if_empty(&mut content.assessment.questions, first_list(root, &["preguntas"]));

    content.references = first_list(root, &["referencias", "bibliografia", "bibliografía"]);

    LessonDocument {
        lesson_id: first_str(root, &["lessonId", "id", "leccionId"]),
        module_id: first_str(root, &["moduleId", "modulo", "módulo"]),
        title: first_str(root, &LEGACY_TITLE),
        sections: Vec::new(),
        content,
        metadata: obj_field(root, "metadata"),
        extra: Map::new(),
    }
}
