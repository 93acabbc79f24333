//! # VLP Common Library
//!
//! Shared code for the lesson content pipeline crates including:
//! - Canonical lesson data model (LessonDocument, Section, LessonContent)
//! - Content-identity hashing of sections
//! - Configuration loading (TOML bootstrap)
//! - Logging bootstrap
//! - Common error type

pub mod config;
pub mod error;
pub mod hashing;
pub mod lesson;
pub mod logging;

pub use error::{Error, Result};
pub use hashing::content_digest;
pub use lesson::{LessonContent, LessonDocument, Section};
