//! Batch report rendering
//!
//! Text output groups blocking issues by kind, then by file, followed by the
//! linter warnings and the per-level summary. JSON output is the serialized
//! [`BatchReport`].

use crate::batch::BatchReport;
use std::fmt::Write;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub fn render(report: &BatchReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
    }
}

pub fn render_json(report: &BatchReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn render_text(report: &BatchReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &BatchReport) -> std::fmt::Result {
    writeln!(out, "Lesson validation report")?;
    writeln!(out, "Generated: {}", report.generated_at.to_rfc3339())?;
    writeln!(out, "Root: {}", report.root)?;
    writeln!(
        out,
        "Files scanned: {}  valid: {}  schema: {}",
        report.files_scanned,
        report.files_valid,
        if report.schema_checked { "checked" } else { "skipped" }
    )?;
    writeln!(out)?;

    if report.issues.is_empty() {
        writeln!(out, "No blocking issues found.")?;
    } else {
        writeln!(out, "Blocking issues ({}):", report.blocking_count())?;
        for (kind, files) in report.issues_by_kind() {
            writeln!(out, "  [{}]", kind)?;
            for (file, issues) in files {
                writeln!(out, "    {}", file)?;
                for issue in issues {
                    writeln!(out, "      - {}", issue.message)?;
                }
            }
        }
    }
    writeln!(out)?;

    let warnings = &report.lint.warnings;
    if warnings.is_empty() {
        writeln!(out, "No semantic warnings.")?;
    } else {
        writeln!(out, "Semantic warnings ({}):", warnings.len())?;
        for warning in warnings {
            writeln!(out, "  [{}] {}", warning.kind.label(), warning.message)?;
            for contributor in &warning.contributors {
                writeln!(
                    out,
                    "      {} / {} ({}){}",
                    contributor.file,
                    contributor.section_id,
                    contributor.level,
                    if contributor.template { " [template]" } else { "" }
                )?;
            }
        }
    }

    if !report.lint.summary_by_level.is_empty() {
        writeln!(out)?;
        writeln!(out, "Summary by level:")?;
        writeln!(
            out,
            "  {:<16} {:>9} {:>10} {:>11} {:>12}",
            "level", "sections", "templates", "collisions", "suggestions"
        )?;
        for (level, stats) in &report.lint.summary_by_level {
            writeln!(
                out,
                "  {:<16} {:>9} {:>10} {:>11} {:>12}",
                level,
                stats.total_sections,
                stats.template_sections,
                stats.collision_warnings,
                stats.suggestion_warnings
            )?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Result: {}",
        if report.passed() { "PASSED" } else { "FAILED" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{IssueKind, ValidationIssue};
    use crate::linter::{CollisionWarning, LevelStats, LintReport, SectionRef, WarningKind};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn report(issues: Vec<ValidationIssue>) -> BatchReport {
        let contributor = |file: &str, lesson: &str| SectionRef {
            file: file.to_string(),
            lesson_id: lesson.to_string(),
            section_id: "peep".to_string(),
            level: "basic".to_string(),
            template: false,
        };

        let mut summary_by_level = BTreeMap::new();
        summary_by_level.insert(
            "basic".to_string(),
            LevelStats {
                total_sections: 4,
                template_sections: 1,
                collision_warnings: 1,
                suggestion_warnings: 0,
            },
        );

        BatchReport {
            generated_at: Utc::now(),
            root: "data/lessons".to_string(),
            schema_checked: true,
            files_scanned: 3,
            files_valid: 2,
            issues,
            lint: LintReport {
                warnings: vec![CollisionWarning {
                    kind: WarningKind::DuplicateContent,
                    title: "PEEP".to_string(),
                    contributors: vec![contributor("a.json", "lesson-a"), contributor("b.json", "lesson-b")],
                    any_template: false,
                    message: "Identical content for \"PEEP\" appears in lesson-a (a.json), lesson-b (b.json)".to_string(),
                }],
                summary_by_level,
            },
        }
    }

    #[test]
    fn test_text_groups_issues_by_kind_and_file() {
        let text = render_text(&report(vec![
            ValidationIssue {
                kind: IssueKind::ZeroPages,
                file: "b.json".to_string(),
                message: "Lesson has no sections (0 pages)".to_string(),
            },
            ValidationIssue {
                kind: IssueKind::Parse,
                file: "c.json".to_string(),
                message: "Invalid JSON: EOF".to_string(),
            },
        ]));

        assert!(text.contains("Blocking issues (2):"));
        let parse = text.find("[parse]").unwrap();
        let zero = text.find("[zero-pages]").unwrap();
        assert!(parse < zero);
        assert!(text.contains("    c.json\n      - Invalid JSON: EOF"));
        assert!(text.contains("[duplicate-content]"));
        assert!(text.contains("basic"));
        assert!(text.trim_end().ends_with("Result: FAILED"));
    }

    #[test]
    fn test_text_clean_run() {
        let text = render_text(&report(Vec::new()));
        assert!(text.contains("No blocking issues found."));
        // Warnings alone do not fail the run
        assert!(text.trim_end().ends_with("Result: PASSED"));
    }

    #[test]
    fn test_json_report_shape() {
        let json = render(&report(Vec::new()), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["generatedAt"].is_string());
        assert_eq!(value["filesScanned"], 3);
        assert_eq!(value["lint"]["warnings"][0]["kind"], "duplicate-content");
        assert_eq!(value["lint"]["summaryByLevel"]["basic"]["collisionWarnings"], 1);
    }
}
