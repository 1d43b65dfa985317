//! Configuration for the citation annotation engine.
//!
//! `AnnotateConfig` controls the token grammar (which entity types are
//! recognized, minimum id length) and the reference-list fallback policy
//! applied when a title lookup fails.

use serde::{Deserialize, Serialize};

/// What the reference list builder does with an entity whose title lookup
/// failed. The in-text citation number stays valid either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Drop the entity from the visible reference list.
    #[default]
    OmitEntry,
    /// Keep the entity, using its `entityType:entityId` key as the title.
    KeyAsTitle,
}

/// Configuration for one [`Annotator`](crate::engine::Annotator).
///
/// **INVARIANT:** `min_id_len >= 1`. A zero minimum would let the scanner
/// match ordinary bracketed text like `[a:b]`; `with_min_id_len` clamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateConfig {
    pub(crate) entity_types: Vec<String>,
    pub(crate) min_id_len: usize,
    pub(crate) fallback: FallbackPolicy,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            // Only `source` is emitted by the upstream generator today.
            entity_types: vec!["source".to_string()],
            // Ids shorter than 6 chars are too likely to collide with
            // ordinary bracketed numbers in prose.
            min_id_len: 6,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl AnnotateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recognized entity-type set.
    pub fn with_entity_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the minimum entity-id length (clamped to at least 1).
    pub fn with_min_id_len(mut self, len: usize) -> Self {
        self.min_id_len = len.max(1);
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn entity_types(&self) -> &[String] {
        &self.entity_types
    }

    pub fn min_id_len(&self) -> usize {
        self.min_id_len
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Whether a scanned `(type, id)` pair satisfies this grammar.
    pub(crate) fn recognizes(&self, entity_type: &str, entity_id: &str) -> bool {
        entity_id.len() >= self.min_id_len
            && self.entity_types.iter().any(|t| t == entity_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grammar_recognizes_source_tokens() {
        let config = AnnotateConfig::default();
        assert!(config.recognizes("source", "abc123def"));
        assert!(!config.recognizes("source", "abc12")); // too short
        assert!(!config.recognizes("doc", "abc123def")); // unknown type
    }

    #[test]
    fn min_id_len_is_clamped() {
        let config = AnnotateConfig::new().with_min_id_len(0);
        assert_eq!(config.min_id_len(), 1);
    }

    #[test]
    fn custom_entity_types() {
        let config = AnnotateConfig::new().with_entity_types(["source", "note"]);
        assert!(config.recognizes("note", "abcdef"));
        assert!(!config.recognizes("page", "abcdef"));
    }
}
