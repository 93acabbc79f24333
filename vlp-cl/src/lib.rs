//! vlp-cl library interface
//!
//! Content Loader: turns a `(lessonId, moduleId)` request into a canonical
//! [`vlp_common::LessonDocument`], whatever historical layout its JSON uses.
//!
//! Components, leaf-first:
//! - [`resolver`]: lesson id → storage path
//! - [`normalizer`]: legacy layouts → canonical document
//! - [`cache`]: bounded LRU cache of loaded documents
//! - [`retry`]: bounded retry with linear backoff
//! - [`source`]: bundled and network content sources
//! - [`loader`]: the orchestrating [`LessonLoader`]

pub mod cache;
pub mod error;
pub mod loader;
pub mod normalizer;
pub mod resolver;
pub mod retry;
pub mod source;

pub use crate::cache::{LessonCache, LruCache, MAX_CACHE_SIZE};
pub use crate::error::{FetchError, LoadError, SourceError};
pub use crate::loader::LessonLoader;
pub use crate::normalizer::normalize;
pub use crate::resolver::{LessonPathResolver, PathTables};
pub use crate::retry::RetryPolicy;
pub use crate::source::{BundledSource, ContentSource, NetworkSource};
