// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod profile;
pub mod relevance;

pub use crate::api::router;
pub use crate::bootstrap::FeedRuntime;
pub use crate::ingest::types::{ContentItem, ContentKind, FetchError, SourceProvider};
pub use crate::pipeline::{FeedOutcome, FeedStatus, Pipeline, SourceReport};
pub use crate::profile::{InMemoryProfileStore, ProfileStore, ViewerPreferences};
