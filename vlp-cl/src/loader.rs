//! Retrying lesson loader
//!
//! Orchestrates one lesson load:
//!
//! ```text
//! CacheCheck ─HIT──────────────────────────────────────────────▶ return
//!     │
//!    MISS
//!     ▼
//! Resolve ─▶ [ Fetch ─▶ Validate ─▶ Normalize ] ─▶ CacheInsert ─▶ return
//!              └──── retried as a unit with linear backoff ────┘
//! ```
//!
//! Within one attempt every configured source is tried in order before the
//! attempt counts as failed. Concurrent loads of the same uncached lesson are
//! not coalesced; the last cache insert wins.

use crate::cache::LessonCache;
use crate::error::{FetchError, LoadError, SourceError};
use crate::normalizer::normalize;
use crate::resolver::{LessonPathResolver, PathTables};
use crate::retry::RetryPolicy;
use crate::source::{build_sources, ContentSource};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vlp_common::config::TomlConfig;
use vlp_common::LessonDocument;

/// Lesson loader with cache, source fallback and retry
pub struct LessonLoader {
    resolver: LessonPathResolver,
    sources: Vec<Arc<dyn ContentSource>>,
    cache: LessonCache,
    policy: RetryPolicy,
}

impl LessonLoader {
    pub fn new(
        resolver: LessonPathResolver,
        sources: Vec<Arc<dyn ContentSource>>,
        cache: LessonCache,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            resolver,
            sources,
            cache,
            policy,
        }
    }

    /// Build a loader from bootstrap configuration
    ///
    /// The cache is passed in so several loaders can share one instance.
    pub fn from_config(
        config: &TomlConfig,
        content_root: &Path,
        cache: LessonCache,
    ) -> Result<Self, SourceError> {
        let tables = PathTables::snapshot().with_overrides(&config.paths);
        let sources = build_sources(&config.content, content_root)?;

        info!(
            sources = sources.len(),
            cache_capacity = cache.capacity(),
            max_attempts = config.loader.max_attempts,
            "Lesson loader configured"
        );

        Ok(Self::new(
            LessonPathResolver::new(tables),
            sources,
            cache,
            RetryPolicy::from_config(&config.loader),
        ))
    }

    pub fn cache(&self) -> &LessonCache {
        &self.cache
    }

    /// Drop every cached lesson so the next load goes to the sources
    pub fn clear_cache(&self) {
        debug!("Clearing lesson cache");
        self.cache.clear();
    }

    pub fn resolve_path(&self, lesson_id: &str, module_id: &str) -> String {
        self.resolver.resolve(lesson_id, module_id)
    }

    /// Load a lesson as a canonical document
    ///
    /// The returned document always carries the requested `lesson_id`, even
    /// when the source file embeds a different one. Its `module_id` is taken
    /// from the request only when the document has none.
    pub async fn load(
        &self,
        lesson_id: &str,
        module_id: &str,
    ) -> Result<Arc<LessonDocument>, LoadError> {
        // Step 1: Cache check
        if let Some(document) = self.cache.get(lesson_id) {
            debug!(lesson_id, "Lesson cache hit");
            return Ok(document);
        }

        // Step 2: Resolve
        let path = self.resolver.resolve(lesson_id, module_id);
        debug!(lesson_id, module_id, path = %path, "Lesson cache miss, loading");

        // Step 3: Fetch → Validate → Normalize under the retry policy
        let this = self;
        let path_ref = path.as_str();
        let outcome = self
            .policy
            .execute("lesson load", move |attempt| this.attempt(path_ref, attempt))
            .await;

        let mut document = outcome.map_err(|exhausted| LoadError {
            lesson_id: lesson_id.to_string(),
            attempts: exhausted.attempts,
            source: exhausted.last_error,
        })?;

        document.lesson_id = lesson_id.to_string();
        if document.module_id.is_empty() {
            document.module_id = module_id.to_string();
        }

        // Step 4: Cache insert
        let document = Arc::new(document);
        self.cache.set(lesson_id, Arc::clone(&document));
        info!(lesson_id, path = %path, "Lesson loaded");

        Ok(document)
    }

    /// One Fetch → Validate → Normalize pass
    async fn attempt(&self, path: &str, attempt: u32) -> Result<LessonDocument, FetchError> {
        debug!(path, attempt, "Load attempt");
        let raw = self.fetch(path).await?;
        validate_raw(&raw)?;
        Ok(normalize(&raw))
    }

    /// Try every source in order; fail only when all of them fail
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        if self.sources.is_empty() {
            return Err(FetchError::NoSources);
        }

        let mut errors = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.fetch(path).await {
                Ok(value) => {
                    debug!(source = source.name(), path, "Lesson fetched");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(source = source.name(), path, error = %e, "Content source failed");
                    errors.push(e);
                }
            }
        }

        Err(FetchError::AllSourcesFailed {
            path: path.to_string(),
            errors,
        })
    }
}

/// Minimal structural contract of fetched lesson data
///
/// The data must be an object. Canonical-looking documents (with `lessonId`
/// and `content`) must also carry `moduleId`, `title` and an object `content`.
pub fn validate_raw(raw: &Value) -> Result<(), FetchError> {
    let Some(obj) = raw.as_object() else {
        return Err(FetchError::Validation(
            "lesson data must be a JSON object".to_string(),
        ));
    };

    if obj.contains_key("lessonId") && obj.contains_key("content") {
        for field in ["moduleId", "title"] {
            if obj.get(field).map_or(true, Value::is_null) {
                return Err(FetchError::Validation(format!(
                    "canonical lesson is missing required field '{}'",
                    field
                )));
            }
        }

        if !obj.get("content").is_some_and(Value::is_object) {
            return Err(FetchError::Validation(
                "canonical lesson 'content' must be an object".to_string(),
            ));
        }
    }

    Ok(())
}
