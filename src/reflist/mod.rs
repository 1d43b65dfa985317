//! Reference list building and title resolution.
//!
//! The only asynchronous stage of the engine. Title lookups for the
//! distinct cited entities of one text are independent, so they fan out
//! concurrently and join before the list is assembled. Lookup results are
//! cached in a caller-owned [`TitleCache`]; a partially-populated cache is
//! fine — only missing keys are re-resolved.

use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::config::FallbackPolicy;
use crate::errors::{ResolveError, ResolveResult};
use crate::numbering::NumberingTable;

/// External collaborator mapping a cited entity to a display title.
///
/// Implementations typically call an HTTP API. Failures are recovered by
/// the list builder according to [`FallbackPolicy`] and never propagate
/// to the `annotate` caller.
pub trait TitleResolver: Send + Sync {
    fn resolve_title(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> impl Future<Output = ResolveResult<String>> + Send;
}

impl<T: TitleResolver> TitleResolver for &T {
    fn resolve_title(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> impl Future<Output = ResolveResult<String>> + Send {
        (*self).resolve_title(entity_type, entity_id)
    }
}

impl<T: TitleResolver> TitleResolver for Arc<T> {
    fn resolve_title(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> impl Future<Output = ResolveResult<String>> + Send {
        self.as_ref().resolve_title(entity_type, entity_id)
    }
}

/// In-memory resolver backed by a fixed `"type:id" -> title` map. Used by
/// the CLI (titles loaded from JSON) and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTitles {
    titles: HashMap<String, String>,
}

impl StaticTitles {
    pub fn new(titles: HashMap<String, String>) -> Self {
        Self { titles }
    }

    pub fn insert(&mut self, key: impl Into<String>, title: impl Into<String>) {
        self.titles.insert(key.into(), title.into());
    }
}

impl TitleResolver for StaticTitles {
    fn resolve_title(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> impl Future<Output = ResolveResult<String>> + Send {
        let key = format!("{entity_type}:{entity_id}");
        ready(
            self.titles
                .get(&key)
                .cloned()
                .ok_or(ResolveError::NotFound { key }),
        )
    }
}

/// Caller-owned, thread-safe title cache keyed by `"type:id"`.
///
/// Inserts are idempotent: the same key always resolves to the same
/// title, so concurrent writers cannot disagree. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct TitleCache {
    inner: Arc<DashMap<String, String>>,
}

impl TitleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: impl Into<String>, title: impl Into<String>) {
        self.inner.insert(key.into(), title.into());
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// One entry of the visible reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceListItem {
    pub number: u32,
    pub entity_type: String,
    pub entity_id: String,
    /// `None` never appears in builder output; failed lookups are either
    /// omitted or given the key as title, per [`FallbackPolicy`].
    pub title: Option<String>,
}

/// Build the ordered reference list for one numbering table.
///
/// Resolves every key missing from `cache` concurrently, then assembles
/// items in ascending number order. Lookup failures are logged and
/// handled per `policy`; they never abort the build.
pub async fn build_reference_list<R: TitleResolver>(
    table: &NumberingTable,
    resolver: &R,
    cache: &TitleCache,
    policy: FallbackPolicy,
) -> Vec<ReferenceListItem> {
    let lookups = table.iter().map(|(number, key)| {
        let cache_key = key.to_string();
        async move {
            if let Some(title) = cache.get(&cache_key) {
                return (number, key, Some(title));
            }
            match resolver
                .resolve_title(key.entity_type(), key.entity_id())
                .await
            {
                Ok(title) => {
                    cache.insert(cache_key, title.clone());
                    (number, key, Some(title))
                }
                Err(err) => {
                    tracing::warn!(key = %cache_key, error = %err, "title lookup failed");
                    (number, key, None)
                }
            }
        }
    });

    // Table iteration is already number-ordered and join_all preserves
    // input order, so no re-sort is needed.
    let resolved = futures::future::join_all(lookups).await;

    resolved
        .into_iter()
        .filter_map(|(number, key, title)| {
            let title = match (title, policy) {
                (Some(title), _) => title,
                (None, FallbackPolicy::KeyAsTitle) => key.to_string(),
                (None, FallbackPolicy::OmitEntry) => return None,
            };
            Some(ReferenceListItem {
                number,
                entity_type: key.entity_type().to_string(),
                entity_id: key.entity_id().to_string(),
                title: Some(title),
            })
        })
        .collect()
}
