//! Lesson file scanner
//!
//! Recursive discovery of lesson JSON files under the lessons root. Files whose
//! name starts with an excluded prefix (schema, metadata and index documents
//! by default) are skipped. Results are sorted so batch runs are reproducible.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Lesson scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Lesson JSON file scanner
#[derive(Debug, Clone)]
pub struct LessonScanner {
    exclude_prefixes: Vec<String>,
}

impl LessonScanner {
    pub fn new(exclude_prefixes: Vec<String>) -> Self {
        Self { exclude_prefixes }
    }

    /// Scan `root_path` for lesson files, sorted by path
    pub fn scan(&self, root_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_lesson_file(entry.path()) {
                        files.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                }
            }
        }

        files.sort();
        tracing::debug!(root = %root_path.display(), files = files.len(), "Lesson scan complete");

        Ok(files)
    }

    /// `*.json` files not matching an excluded prefix
    pub fn is_lesson_file(&self, path: &Path) -> bool {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            return false;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        !self
            .exclude_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(&prefix.to_lowercase()))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
