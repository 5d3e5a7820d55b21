// src/profile.rs
//! Viewer preferences and the store they live in.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Outlet lean the viewer prefers. Descriptive only; never used to filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsPreference {
    #[default]
    All,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerPreferences {
    /// Free text, usually a state name ("Texas").
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default)]
    pub news_preference: NewsPreference,
}

impl ViewerPreferences {
    pub fn with_interests<I, S>(interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interests: interests.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn location(&self) -> Option<&str> {
        let loc = self.location.trim();
        (!loc.is_empty()).then_some(loc)
    }
}

/// Identity/profile collaborator. Read once per pipeline run.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_preferences(&self, viewer_id: &str) -> Option<ViewerPreferences>;
    async fn set_preferences(&self, viewer_id: &str, prefs: ViewerPreferences);
}

pub type DynProfileStore = Arc<dyn ProfileStore>;

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryProfileStore {
    inner: RwLock<HashMap<String, ViewerPreferences>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_preferences(&self, viewer_id: &str) -> Option<ViewerPreferences> {
        self.inner.read().await.get(viewer_id).cloned()
    }

    async fn set_preferences(&self, viewer_id: &str, prefs: ViewerPreferences) {
        self.inner
            .write()
            .await
            .insert(viewer_id.to_string(), prefs);
    }
}
