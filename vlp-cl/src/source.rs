//! Content sources
//!
//! A [`ContentSource`] fetches the raw JSON of a lesson by its resolved path.
//! Two implementations exist:
//! - [`BundledSource`]: lesson assets shipped with the application, read from disk
//! - [`NetworkSource`]: lesson documents served over HTTP
//!
//! Which sources a loader uses, and in what order, comes from configuration.

use crate::error::SourceError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vlp_common::config::{ContentConfig, SourceKind};

const USER_AGENT: &str = concat!("vlp-cl/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Capability to fetch raw lesson JSON by resolved path
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Fetch and parse the document at `path`
    async fn fetch(&self, path: &str) -> Result<Value, SourceError>;
}

/// Lesson assets bundled on the local filesystem
#[derive(Debug, Clone)]
pub struct BundledSource {
    root: PathBuf,
}

impl BundledSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ContentSource for BundledSource {
    fn name(&self) -> &str {
        "bundled"
    }

    async fn fetch(&self, path: &str) -> Result<Value, SourceError> {
        // Resolved paths are relative; anything escaping the root is refused
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(SourceError::Io {
                path: path.to_string(),
                message: "path escapes content root".to_string(),
            });
        }

        let full_path = self.root.join(relative);
        tracing::debug!(path = %full_path.display(), "Reading bundled lesson");

        let text = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SourceError::NotFound(path.to_string()),
                _ => SourceError::Io {
                    path: path.to_string(),
                    message: e.to_string(),
                },
            })?;

        serde_json::from_str(&text).map_err(|e| SourceError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Lesson documents served over HTTP
#[derive(Debug, Clone)]
pub struct NetworkSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl NetworkSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ContentSource for NetworkSource {
    fn name(&self) -> &str {
        "network"
    }

    async fn fetch(&self, path: &str) -> Result<Value, SourceError> {
        let url = self.url_for(path);
        tracing::debug!(url = %url, "Fetching lesson over network");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| SourceError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Build the configured source chain
///
/// The network source is skipped with a warning when no base URL is set.
pub fn build_sources(
    config: &ContentConfig,
    content_root: &Path,
) -> Result<Vec<Arc<dyn ContentSource>>, SourceError> {
    let mut sources: Vec<Arc<dyn ContentSource>> = Vec::new();

    for kind in &config.sources {
        match kind {
            SourceKind::Bundled => {
                sources.push(Arc::new(BundledSource::new(content_root)));
            }
            SourceKind::Network => match &config.base_url {
                Some(base_url) => sources.push(Arc::new(NetworkSource::new(base_url)?)),
                None => {
                    tracing::warn!("Network source configured without base_url, skipping");
                }
            },
        }
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_bundled_reads_json() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("lessons/module-01-fundamentals");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("lesson-01-intro.json"), r#"{"lessonId":"lesson-01-intro"}"#).unwrap();

        let source = BundledSource::new(temp_dir.path());
        let value = source
            .fetch("lessons/module-01-fundamentals/lesson-01-intro.json")
            .await
            .unwrap();
        assert_eq!(value["lessonId"], "lesson-01-intro");
    }

    #[tokio::test]
    async fn test_bundled_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let source = BundledSource::new(temp_dir.path());
        match source.fetch("lessons/nope.json").await {
            Err(SourceError::NotFound(path)) => assert_eq!(path, "lessons/nope.json"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bundled_invalid_json_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let source = BundledSource::new(temp_dir.path());
        assert!(matches!(
            source.fetch("broken.json").await,
            Err(SourceError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_bundled_refuses_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = BundledSource::new(temp_dir.path());
        assert!(matches!(
            source.fetch("../secrets.json").await,
            Err(SourceError::Io { .. })
        ));
    }

    #[test]
    fn test_network_url_joining() {
        let source = NetworkSource::new("https://cdn.example.org/content/").unwrap();
        assert_eq!(
            source.url_for("/lessons/module-01/lesson-01.json"),
            "https://cdn.example.org/content/lessons/module-01/lesson-01.json"
        );
    }

    #[test]
    fn test_build_sources_skips_network_without_url() {
        let config = ContentConfig::default();
        let sources = build_sources(&config, Path::new("public")).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["bundled"]);

        let config = ContentConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            sources: vec![SourceKind::Network, SourceKind::Bundled],
            ..Default::default()
        };
        let sources = build_sources(&config, Path::new("public")).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["network", "bundled"]);
    }
}
