//! vlp-lv library interface
//!
//! Lesson Validator: batch structural validation of a lesson corpus plus
//! cross-lesson semantic linting.
//!
//! - [`scanner`]: lesson file discovery
//! - [`order`]: section order validation
//! - [`schema`]: JSON Schema checks
//! - [`linter`]: duplicate-content and title-collision detection
//! - [`batch`]: the corpus run and its report
//! - [`report`]: text and JSON rendering

pub mod batch;
pub mod linter;
pub mod order;
pub mod report;
pub mod scanner;
pub mod schema;

pub use crate::batch::{BatchReport, BatchValidator, IssueKind, ValidationIssue};
pub use crate::linter::{lint, CollisionWarning, LevelStats, LintDocument, LintReport, WarningKind};
pub use crate::order::{validate_section_order, OrderReport};
pub use crate::report::ReportFormat;
pub use crate::scanner::{LessonScanner, ScanError};
pub use crate::schema::{SchemaChecker, SchemaError};
