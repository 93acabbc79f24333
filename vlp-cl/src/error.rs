//! Error types for vlp-cl
//!
//! Individual source failures and failed attempts stay internal to the loader;
//! callers only ever see [`LoadError`], raised once the retry budget is spent.

use thiserror::Error;

/// Failure of one content source to deliver a lesson document
#[derive(Debug, Error)]
pub enum SourceError {
    /// No document at the resolved path
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Reading bundled content failed
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    /// Content is not valid JSON
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// Transport-level failure talking to the network source
    #[error("Network error: {0}")]
    Network(String),

    /// Network source answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },
}

/// Failure of one Fetch → Validate → Normalize attempt
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every configured source failed for the path
    #[error("all content sources failed for {path}: {}", describe(.errors))]
    AllSourcesFailed {
        path: String,
        errors: Vec<SourceError>,
    },

    /// The loader was built without any content source
    #[error("no content sources configured")]
    NoSources,

    /// Fetched data violates the minimal lesson contract
    #[error("invalid lesson data: {0}")]
    Validation(String),
}

fn describe(errors: &[SourceError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Final loader failure after the retry budget was exhausted
#[derive(Debug, Error)]
#[error("Failed to load lesson '{lesson_id}' after {attempts} attempts: {source}")]
pub struct LoadError {
    pub lesson_id: String,
    pub attempts: u32,
    #[source]
    pub source: FetchError,
}
