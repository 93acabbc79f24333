//! Batch validation of a lesson corpus
//!
//! Every lesson file under the root is processed sequentially in sorted path
//! order:
//!
//! 1. Parse JSON (failure → Parse issue, file skipped)
//! 2. Schema check (each violation → Schema issue)
//! 3. Zero-page check (no sections → ZeroPages issue)
//! 4. Section order check (each defect → SectionOrder issue)
//!
//! Issues are collected across the whole corpus before anything is reported.
//! Files that produced no issue at all are then handed to the semantic linter.

use crate::linter::{lint, LintDocument, LintReport};
use crate::order::validate_section_order;
use crate::scanner::{LessonScanner, ScanError};
use crate::schema::SchemaChecker;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Level assigned to lessons without a difficulty
pub const UNKNOWN_LEVEL: &str = "unknown";

/// Blocking issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Parse,
    Schema,
    SectionOrder,
    ZeroPages,
}

impl IssueKind {
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::Parse => "parse",
            IssueKind::Schema => "schema",
            IssueKind::SectionOrder => "section-order",
            IssueKind::ZeroPages => "zero-pages",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One blocking defect in one lesson file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub file: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(kind: IssueKind, file: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.to_string(),
            message: message.into(),
        }
    }
}

/// Result of one batch run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub root: String,
    pub schema_checked: bool,
    pub files_scanned: usize,
    pub files_valid: usize,
    pub issues: Vec<ValidationIssue>,
    pub lint: LintReport,
}

impl BatchReport {
    pub fn blocking_count(&self) -> usize {
        self.issues.len()
    }

    /// Linter warnings never influence this
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    /// Process exit code: 0 without blocking issues, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    /// Issues grouped by kind, then by file
    pub fn issues_by_kind(&self) -> BTreeMap<IssueKind, BTreeMap<&str, Vec<&ValidationIssue>>> {
        let mut grouped: BTreeMap<IssueKind, BTreeMap<&str, Vec<&ValidationIssue>>> =
            BTreeMap::new();
        for issue in &self.issues {
            grouped
                .entry(issue.kind)
                .or_default()
                .entry(issue.file.as_str())
                .or_default()
                .push(issue);
        }
        grouped
    }
}

/// Outcome of validating one file
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub issues: Vec<ValidationIssue>,
    /// Present only when the file had no issue
    pub lint_input: Option<LintDocument>,
}

/// Corpus validator
#[derive(Debug)]
pub struct BatchValidator {
    scanner: LessonScanner,
    schema: Option<SchemaChecker>,
}

impl BatchValidator {
    /// `schema` of `None` skips schema checks
    pub fn new(scanner: LessonScanner, schema: Option<SchemaChecker>) -> Self {
        Self { scanner, schema }
    }

    /// Validate every lesson file under `root`
    ///
    /// Only an unusable root is an error; per-file problems become issues.
    pub fn validate_root(&self, root: &Path) -> Result<BatchReport, ScanError> {
        let files = self.scanner.scan(root)?;
        info!(root = %root.display(), files = files.len(), "Validating lesson corpus");

        let mut issues = Vec::new();
        let mut lint_inputs = Vec::new();

        for path in &files {
            let file_label = display_path(root, path);
            let outcome = match std::fs::read_to_string(path) {
                Ok(text) => self.validate_text(&file_label, &text),
                Err(e) => {
                    warn!(file = %file_label, error = %e, "Failed to read lesson file");
                    FileOutcome {
                        issues: vec![ValidationIssue::new(
                            IssueKind::Parse,
                            &file_label,
                            format!("Failed to read file: {}", e),
                        )],
                        lint_input: None,
                    }
                }
            };

            issues.extend(outcome.issues);
            lint_inputs.extend(outcome.lint_input);
        }

        let lint_report = lint(&lint_inputs);
        info!(
            files = files.len(),
            blocking = issues.len(),
            warnings = lint_report.warnings.len(),
            "Lesson validation complete"
        );

        Ok(BatchReport {
            generated_at: Utc::now(),
            root: root.display().to_string(),
            schema_checked: self.schema.is_some(),
            files_scanned: files.len(),
            files_valid: lint_inputs.len(),
            issues,
            lint: lint_report,
        })
    }

    /// Validate the contents of one lesson file
    pub fn validate_text(&self, file: &str, text: &str) -> FileOutcome {
        let lesson: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                debug!(file, error = %e, "Lesson file is not valid JSON");
                return FileOutcome {
                    issues: vec![ValidationIssue::new(
                        IssueKind::Parse,
                        file,
                        format!("Invalid JSON: {}", e),
                    )],
                    lint_input: None,
                };
            }
        };

        let mut issues = Vec::new();

        if let Some(schema) = &self.schema {
            issues.extend(
                schema
                    .check(&lesson)
                    .into_iter()
                    .map(|message| ValidationIssue::new(IssueKind::Schema, file, message)),
            );
        }

        let sections = lesson.get("sections");
        let zero_pages = match sections {
            None | Some(Value::Null) => true,
            Some(Value::Array(list)) => list.is_empty(),
            Some(_) => false,
        };

        if zero_pages {
            issues.push(ValidationIssue::new(
                IssueKind::ZeroPages,
                file,
                "Lesson has no sections (0 pages)",
            ));
        } else if let Some(sections) = sections {
            issues.extend(
                validate_section_order(sections)
                    .errors
                    .into_iter()
                    .map(|message| ValidationIssue::new(IssueKind::SectionOrder, file, message)),
            );
        }

        if !issues.is_empty() {
            debug!(file, issues = issues.len(), "Lesson file has blocking issues");
            return FileOutcome {
                issues,
                lint_input: None,
            };
        }

        let lesson_id = lesson
            .get("lessonId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(file));

        FileOutcome {
            issues,
            lint_input: Some(LintDocument {
                file: file.to_string(),
                lesson_id,
                level: difficulty_level(&lesson),
                sections: sections
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            }),
        }
    }
}

/// Difficulty level of a lesson
///
/// First non-empty string among `metadata.difficulty`, `difficulty`, `level`
/// and `metadata.level`.
pub fn difficulty_level(lesson: &Value) -> String {
    ["/metadata/difficulty", "/difficulty", "/level", "/metadata/level"]
        .iter()
        .filter_map(|pointer| lesson.pointer(pointer).and_then(Value::as_str))
        .map(str::trim)
        .find(|level| !level.is_empty())
        .unwrap_or(UNKNOWN_LEVEL)
        .to_string()
}

/// Path relative to the root with `/` separators
fn display_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}
