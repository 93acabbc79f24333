//! Semantic collision linter
//!
//! Cross-lesson analysis over structurally valid lessons. Sections are grouped
//! by title; within a title group, content digests separate reused content
//! from same-title-different-content collisions. Sections flagged with
//! `metadata.sectionTemplate: true` are intentional reuse.
//!
//! Findings are advisory and never affect the batch exit code.
//!
//! A lesson is identified by `(file, lesson_id)`, so the same lessonId in two
//! files counts as two lessons.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use vlp_common::content_digest;
use vlp_common::lesson::is_template_section;

/// One lesson handed to the linter
#[derive(Debug, Clone)]
pub struct LintDocument {
    pub file: String,
    pub lesson_id: String,
    pub level: String,
    /// Raw section objects as found in the lesson file
    pub sections: Vec<Value>,
}

/// Kind of collision finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Identical content under one title in more than one lesson
    DuplicateContent,
    /// Same title, different content, in more than one lesson
    TitleCollision,
}

impl WarningKind {
    pub fn label(&self) -> &'static str {
        match self {
            WarningKind::DuplicateContent => "duplicate-content",
            WarningKind::TitleCollision => "title-collision",
        }
    }
}

/// Provenance of one section contributing to a warning
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRef {
    pub file: String,
    pub lesson_id: String,
    pub section_id: String,
    pub level: String,
    pub template: bool,
}

/// One advisory finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionWarning {
    pub kind: WarningKind,
    pub title: String,
    pub contributors: Vec<SectionRef>,
    pub any_template: bool,
    pub message: String,
}

impl CollisionWarning {
    /// Distinct `(file, lesson_id)` pairs among the contributors
    pub fn lessons(&self) -> BTreeSet<(&str, &str)> {
        self.contributors
            .iter()
            .map(|c| (c.file.as_str(), c.lesson_id.as_str()))
            .collect()
    }
}

/// Per-difficulty-level tallies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStats {
    pub total_sections: usize,
    pub template_sections: usize,
    /// Duplicate-content warnings touching this level
    pub collision_warnings: usize,
    /// Title-collision (rename suggestion) warnings touching this level
    pub suggestion_warnings: usize,
}

/// Linter output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub warnings: Vec<CollisionWarning>,
    pub summary_by_level: BTreeMap<String, LevelStats>,
}

#[derive(Debug)]
struct Contribution {
    section: SectionRef,
    digest: String,
}

/// Lint a batch of lessons
///
/// Deterministic for a given input: groups are kept in ordered maps and
/// contributors are sorted, so repeated runs yield identical reports.
pub fn lint(documents: &[LintDocument]) -> LintReport {
    let mut by_title: BTreeMap<&str, Vec<Contribution>> = BTreeMap::new();
    let mut summary: BTreeMap<String, LevelStats> = BTreeMap::new();
    let mut counted: BTreeSet<(&str, &str, String)> = BTreeSet::new();

    // Step 1: Group every section by title, tallying sections per level
    for document in documents {
        for (index, section) in document.sections.iter().enumerate() {
            let section_id = section
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index));
            let template = is_template_section(section);

            let key = (
                document.file.as_str(),
                document.lesson_id.as_str(),
                section_id.clone(),
            );
            if counted.insert(key) {
                let stats = summary.entry(document.level.clone()).or_default();
                stats.total_sections += 1;
                if template {
                    stats.template_sections += 1;
                }
            }

            let Some(title) = section.get("title").and_then(Value::as_str) else {
                continue;
            };
            if title.trim().is_empty() {
                continue;
            }

            by_title.entry(title).or_default().push(Contribution {
                section: SectionRef {
                    file: document.file.clone(),
                    lesson_id: document.lesson_id.clone(),
                    section_id,
                    level: document.level.clone(),
                    template,
                },
                digest: content_digest(section),
            });
        }
    }

    // Steps 2-4: Per-title digest analysis
    let mut warnings = Vec::new();
    for (title, contributions) in &by_title {
        if contributions.len() < 2 {
            continue;
        }
        warnings.extend(title_warnings(title, contributions));
    }

    // Step 5: Attribute warnings to every level they touch
    for warning in &warnings {
        let levels: BTreeSet<&str> = warning
            .contributors
            .iter()
            .map(|c| c.level.as_str())
            .collect();
        for level in levels {
            let stats = summary.entry(level.to_string()).or_default();
            match warning.kind {
                WarningKind::DuplicateContent => stats.collision_warnings += 1,
                WarningKind::TitleCollision => stats.suggestion_warnings += 1,
            }
        }
    }

    tracing::debug!(
        lessons = documents.len(),
        titles = by_title.len(),
        warnings = warnings.len(),
        "Semantic lint complete"
    );

    LintReport {
        warnings,
        summary_by_level: summary,
    }
}

fn title_warnings(title: &str, contributions: &[Contribution]) -> Vec<CollisionWarning> {
    let mut warnings = Vec::new();

    let mut by_digest: BTreeMap<&str, Vec<&Contribution>> = BTreeMap::new();
    for contribution in contributions {
        by_digest
            .entry(contribution.digest.as_str())
            .or_default()
            .push(contribution);
    }

    for group in by_digest.values() {
        if group.len() < 2 || group.iter().all(|c| c.section.template) {
            continue;
        }

        if distinct_lessons(group.iter().copied()) > 1 {
            let contributors = sorted_refs(group.iter().copied());
            let any_template = contributors.iter().any(|c| c.template);
            let message = format!(
                "Identical content for \"{}\" appears in {}{}",
                title,
                lesson_list(&contributors),
                if any_template {
                    " (some contributors are marked sectionTemplate)"
                } else {
                    ""
                }
            );
            warnings.push(CollisionWarning {
                kind: WarningKind::DuplicateContent,
                title: title.to_string(),
                contributors,
                any_template,
                message,
            });
        }
    }

    if by_digest.len() > 1 {
        let non_template: Vec<&Contribution> =
            contributions.iter().filter(|c| !c.section.template).collect();

        if distinct_lessons(non_template.iter().copied()) > 1 {
            let contributors = sorted_refs(non_template.iter().copied());
            let message = format!(
                "Title \"{}\" has different content in {}; consider renaming to reflect each lesson's focus",
                title,
                lesson_list(&contributors)
            );
            warnings.push(CollisionWarning {
                kind: WarningKind::TitleCollision,
                title: title.to_string(),
                contributors,
                any_template: false,
                message,
            });
        }
    }

    warnings
}

fn distinct_lessons<'a>(contributions: impl Iterator<Item = &'a Contribution>) -> usize {
    contributions
        .map(|c| (c.section.file.as_str(), c.section.lesson_id.as_str()))
        .collect::<BTreeSet<_>>()
        .len()
}

fn sorted_refs<'a>(contributions: impl Iterator<Item = &'a Contribution>) -> Vec<SectionRef> {
    let mut refs: Vec<SectionRef> = contributions.map(|c| c.section.clone()).collect();
    refs.sort();
    refs
}

fn lesson_list(contributors: &[SectionRef]) -> String {
    let lessons: BTreeSet<String> = contributors
        .iter()
        .map(|c| format!("{} ({})", c.lesson_id, c.file))
        .collect();
    lessons.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(id: &str, title: &str, content: &str, template: bool) -> Value {
        let mut section = json!({
            "id": id,
            "title": title,
            "order": 1,
            "type": "theory",
            "content": content
        });
        if template {
            section["metadata"] = json!({ "sectionTemplate": true });
        }
        section
    }

    fn document(file: &str, lesson_id: &str, level: &str, sections: Vec<Value>) -> LintDocument {
        LintDocument {
            file: file.to_string(),
            lesson_id: lesson_id.to_string(),
            level: level.to_string(),
            sections,
        }
    }

    #[test]
    fn test_template_pair_is_exempt() {
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![section("safety", "Safety", "Check alarms", true)]),
            document("b.json", "lesson-b", "basic", vec![section("safety", "Safety", "Check alarms", true)]),
        ];

        let report = lint(&docs);
        assert!(report.warnings.is_empty());
        assert_eq!(report.summary_by_level["basic"].template_sections, 2);
    }

    #[test]
    fn test_template_flag_must_be_literal_true() {
        let mut a = section("safety", "Safety", "Check alarms", false);
        a["metadata"] = json!({ "sectionTemplate": "true" });
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![a]),
            document("b.json", "lesson-b", "basic", vec![section("safety", "Safety", "Check alarms", false)]),
        ];

        let report = lint(&docs);
        assert_eq!(report.summary_by_level["basic"].template_sections, 0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::DuplicateContent);
        assert!(!report.warnings[0].any_template);
    }

    #[test]
    fn test_duplicate_content_across_lessons() {
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![section("peep", "PEEP", "Keeps alveoli open", false)]),
            document("b.json", "lesson-b", "advanced", vec![section("peep", "PEEP", "Keeps alveoli open", false)]),
        ];

        let report = lint(&docs);
        assert_eq!(report.warnings.len(), 1);

        let warning = &report.warnings[0];
        assert_eq!(warning.kind, WarningKind::DuplicateContent);
        assert_eq!(warning.title, "PEEP");
        assert!(!warning.any_template);
        assert!(warning.message.contains("lesson-a"));
        assert!(warning.message.contains("lesson-b"));
        assert_eq!(warning.lessons().len(), 2);

        assert_eq!(report.summary_by_level["basic"].collision_warnings, 1);
        assert_eq!(report.summary_by_level["advanced"].collision_warnings, 1);
        assert_eq!(report.summary_by_level["basic"].suggestion_warnings, 0);
    }

    #[test]
    fn test_duplicate_with_one_template_contributor_notes_it() {
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![section("peep", "PEEP", "Same", true)]),
            document("b.json", "lesson-b", "basic", vec![section("peep", "PEEP", "Same", false)]),
        ];

        let report = lint(&docs);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].any_template);
        assert!(report.warnings[0].message.contains("sectionTemplate"));
    }

    #[test]
    fn test_duplicate_within_one_lesson_is_not_reported() {
        let docs = vec![document(
            "a.json",
            "lesson-a",
            "basic",
            vec![
                section("peep", "PEEP", "Same", false),
                section("peep", "PEEP", "Same", false),
            ],
        )];

        let report = lint(&docs);
        assert!(report.warnings.is_empty());
        // Same file + lesson + section id counts once
        assert_eq!(report.summary_by_level["basic"].total_sections, 1);
    }

    #[test]
    fn test_title_collision_across_lessons() {
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![section("intro", "Introduction", "Airway anatomy", false)]),
            document("b.json", "lesson-b", "basic", vec![section("intro", "Introduction", "Ventilator modes", false)]),
        ];

        let report = lint(&docs);
        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.kind, WarningKind::TitleCollision);
        assert!(warning.message.contains("consider renaming"));
        assert_eq!(report.summary_by_level["basic"].suggestion_warnings, 1);
        assert_eq!(report.summary_by_level["basic"].collision_warnings, 0);
    }

    #[test]
    fn test_title_collision_names_only_non_template_contributors() {
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![section("intro", "Introduction", "One", false)]),
            document("b.json", "lesson-b", "basic", vec![section("intro", "Introduction", "Two", false)]),
            document("c.json", "lesson-c", "basic", vec![section("intro", "Introduction", "Three", true)]),
        ];

        let report = lint(&docs);
        assert_eq!(report.warnings.len(), 1);
        let lessons: Vec<_> = report.warnings[0]
            .contributors
            .iter()
            .map(|c| c.lesson_id.as_str())
            .collect();
        assert_eq!(lessons, vec!["lesson-a", "lesson-b"]);
    }

    #[test]
    fn test_title_collision_needs_two_non_template_lessons() {
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![section("intro", "Introduction", "One", false)]),
            document("b.json", "lesson-b", "basic", vec![section("intro", "Introduction", "Two", true)]),
        ];

        assert!(lint(&docs).warnings.is_empty());
    }

    #[test]
    fn test_same_lesson_id_in_two_files_is_two_lessons() {
        let docs = vec![
            document("a.json", "lesson-a", "basic", vec![section("peep", "PEEP", "Same", false)]),
            document("copy/a.json", "lesson-a", "basic", vec![section("peep", "PEEP", "Same", false)]),
        ];

        assert_eq!(lint(&docs).warnings.len(), 1);
    }

    #[test]
    fn test_lint_is_deterministic() {
        let docs = vec![
            document("b.json", "lesson-b", "advanced", vec![
                section("intro", "Introduction", "Two", false),
                section("peep", "PEEP", "Same", false),
            ]),
            document("a.json", "lesson-a", "basic", vec![
                section("intro", "Introduction", "One", false),
                section("peep", "PEEP", "Same", false),
            ]),
        ];

        let first = lint(&docs);
        let second = lint(&docs);
        assert_eq!(first, second);
        assert_eq!(first.warnings.len(), 2);
        assert_eq!(first.warnings[0].contributors[0].lesson_id, "lesson-a");
    }

    #[test]
    fn test_empty_input() {
        let report = lint(&[]);
        assert!(report.warnings.is_empty());
        assert!(report.summary_by_level.is_empty());
    }
}
