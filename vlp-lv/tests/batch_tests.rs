//! Integration tests for the batch lesson validator
//!
//! Builds small lesson corpora on disk and runs the full scan → validate →
//! lint pipeline over them.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vlp_lv::report::{render, ReportFormat};
use vlp_lv::{BatchValidator, IssueKind, LessonScanner, SchemaChecker, WarningKind};

fn validator() -> BatchValidator {
    BatchValidator::new(
        LessonScanner::new(vec![
            "schema".to_string(),
            "metadata".to_string(),
            "index".to_string(),
        ]),
        Some(SchemaChecker::bundled().unwrap()),
    )
}

fn write_lesson(root: &Path, relative: &str, lesson: &Value) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(lesson).unwrap()).unwrap();
}

fn lesson(lesson_id: &str, difficulty: &str, sections: Vec<Value>) -> Value {
    json!({
        "lessonId": lesson_id,
        "title": lesson_id,
        "difficulty": difficulty,
        "sections": sections
    })
}

fn page(id: &str, title: &str, order: u32, content: &str) -> Value {
    json!({ "id": id, "title": title, "order": order, "type": "theory", "content": content })
}

#[test]
fn test_three_file_corpus() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write_lesson(
        root,
        "module-01/a.json",
        &lesson(
            "lesson-a",
            "basic",
            vec![
                page("s1", "Airways", 1, "Upper and lower airways"),
                page("s2", "Alveoli", 2, "Gas exchange surface"),
                page("s3", "Pleura", 3, "Visceral and parietal"),
            ],
        ),
    );
    write_lesson(root, "module-01/b.json", &lesson("lesson-b", "basic", Vec::new()));
    write_lesson(
        root,
        "module-01/c.json",
        &lesson(
            "lesson-c",
            "basic",
            vec![
                page("s1", "Airways", 1, "Upper and lower airways"),
                page("s2", "Compliance", 1, "Volume per pressure"),
                page("s3", "Resistance", 2, "Pressure per flow"),
            ],
        ),
    );
    fs::write(root.join("module-01/metadata.json"), "not even json").unwrap();

    let report = validator().validate_root(root).unwrap();

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.blocking_count(), 2);
    assert_eq!(report.exit_code(), 1);
    assert!(!report.passed());

    let grouped = report.issues_by_kind();
    assert_eq!(
        grouped[&IssueKind::ZeroPages].keys().copied().collect::<Vec<_>>(),
        vec!["module-01/b.json"]
    );
    assert_eq!(
        grouped[&IssueKind::SectionOrder].keys().copied().collect::<Vec<_>>(),
        vec!["module-01/c.json"]
    );

    // Only A was linted, so C's identical "Airways" page raises nothing
    assert_eq!(report.files_valid, 1);
    assert!(report.lint.warnings.is_empty());
    assert_eq!(report.lint.summary_by_level["basic"].total_sections, 3);
}

#[test]
fn test_clean_corpus_with_warnings_passes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let safety = json!({
        "id": "safety", "title": "Safety Checklist", "order": 2, "type": "checklist",
        "content": "Verify alarms", "metadata": { "sectionTemplate": true }
    });

    write_lesson(
        root,
        "module-02/lesson-01-modes.json",
        &lesson(
            "lesson-01-modes",
            "intermediate",
            vec![page("intro", "Introduction", 1, "Ventilation modes"), safety.clone()],
        ),
    );
    write_lesson(
        root,
        "module-03/lesson-01-ards.json",
        &json!({
            "lessonId": "lesson-01-ards",
            "title": "ARDS",
            "metadata": { "difficulty": "advanced" },
            "sections": [page("intro", "Introduction", 1, "ARDS protocols"), safety]
        }),
    );

    let report = validator().validate_root(root).unwrap();

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.files_valid, 2);
    assert_eq!(report.lint.warnings.len(), 1);
    assert_eq!(report.lint.warnings[0].kind, WarningKind::TitleCollision);
    assert_eq!(report.lint.warnings[0].title, "Introduction");

    let summary = &report.lint.summary_by_level;
    assert_eq!(summary["intermediate"].suggestion_warnings, 1);
    assert_eq!(summary["advanced"].suggestion_warnings, 1);
    assert_eq!(summary["advanced"].template_sections, 1);

    let text = render(&report, ReportFormat::Text).unwrap();
    assert!(text.contains("No blocking issues found."));
    assert!(text.contains("[title-collision]"));
    assert!(text.trim_end().ends_with("Result: PASSED"));
}

#[test]
fn test_parse_and_schema_issues_do_not_stop_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::write(root.join("broken.json"), "{ \"lessonId\": ").unwrap();
    write_lesson(root, "no-title.json", &json!({ "lessonId": "x", "sections": [page("s1", "A", 1, "a")] }));
    write_lesson(root, "ok.json", &lesson("ok", "basic", vec![page("s1", "A", 1, "a")]));

    let report = validator().validate_root(root).unwrap();

    let kinds: Vec<_> = report.issues.iter().map(|i| (i.kind, i.file.as_str())).collect();
    assert_eq!(
        kinds,
        vec![(IssueKind::Parse, "broken.json"), (IssueKind::Schema, "no-title.json")]
    );
    assert_eq!(report.files_valid, 1);

    let json = render(&report, ReportFormat::Json).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["issues"][0]["kind"], "parse");
    assert_eq!(value["issues"][1]["kind"], "schema");
}

#[test]
fn test_missing_root_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(validator()
        .validate_root(&temp_dir.path().join("absent"))
        .is_err());
}

#[test]
fn test_unreadable_file_is_a_parse_issue() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::write(root.join("latin1.json"), [0x7b, 0xe9, 0xff, 0x7d]).unwrap();
    write_lesson(root, "ok.json", &lesson("ok", "basic", vec![page("s1", "A", 1, "a")]));

    let report = validator().validate_root(root).unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.files_valid, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::Parse);
    assert_eq!(report.issues[0].file, "latin1.json");
    assert!(report.issues[0].message.starts_with("Failed to read file:"));
}
