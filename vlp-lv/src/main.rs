//! validate-lessons - Lesson corpus validator
//!
//! Scans the lessons root, runs schema, zero-page and section order checks on
//! every lesson file, lints structurally valid lessons for semantic
//! collisions, and prints a grouped report.
//!
//! Exit code is 0 when no blocking issue was found, 1 otherwise. Semantic
//! warnings never change the exit code.
//!
//! **Usage:**
//! ```bash
//! validate-lessons [--root <dir>] [--config <file>] [--schema <file>]
//!                  [--format text|json] [--no-schema]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use vlp_common::config::{self, LESSONS_ROOT_ENV_VAR};
use vlp_lv::report::{self, ReportFormat};
use vlp_lv::{BatchValidator, LessonScanner, SchemaChecker};

/// Lesson corpus validator
#[derive(Parser, Debug)]
#[command(name = "validate-lessons", version)]
#[command(about = "Validate lesson JSON files and lint them for semantic collisions")]
struct Args {
    /// Directory containing lesson JSON files
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// External JSON Schema for lesson files
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Skip JSON Schema validation
    #[arg(long, conflicts_with = "schema")]
    no_schema: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = config::load_or_default(args.config.as_deref())?;
    vlp_common::logging::init_tracing(&config.logging);

    let root = config::resolve_dir(
        args.root.as_deref(),
        LESSONS_ROOT_ENV_VAR,
        config.validation.lessons_root.as_deref(),
        "./data/lessons",
    );
    info!("Lessons root: {}", root.display());

    let schema = if args.no_schema {
        info!("Schema validation disabled");
        None
    } else {
        let schema_path = args.schema.or(config.validation.schema_path);
        Some(SchemaChecker::load(schema_path.as_deref()).context("Failed to load lesson schema")?)
    };

    let validator = BatchValidator::new(LessonScanner::new(config.validation.exclude), schema);
    let report = validator
        .validate_root(&root)
        .with_context(|| format!("Failed to scan lessons root {}", root.display()))?;

    println!("{}", report::render(&report, args.format)?);

    Ok(ExitCode::from(report.exit_code() as u8))
}
