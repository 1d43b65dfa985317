//! Citation token scanner.
//!
//! The upstream content generator embeds citations in its markdown as raw
//! `[entityType:entityId]` tokens. This module finds every such token and
//! records its byte offsets so the rewriter can replace the spans in
//! reverse order without invalidating the remaining offsets.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnnotateConfig;

/// Matches a raw citation token.
///
/// Pattern breakdown:
/// - `\[` - literal opening bracket
/// - `([a-z][a-z0-9_]*)` - capture group: entity type, short lowercase identifier
/// - `:` - separator
/// - `([A-Za-z0-9_]+)` - capture group: opaque entity id
/// - `\]` - literal closing bracket
///
/// The configurable entity-type set and minimum id length are enforced
/// after matching, so the compiled pattern can stay static. Unterminated
/// brackets simply never match.
static RAW_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([a-z][a-z0-9_]*):([A-Za-z0-9_]+)\]")
        .expect("RAW_TOKEN: hardcoded regex is valid")
});

/// A raw citation token occurrence with its byte offsets in the source
/// text. Offsets cover the whole token including both brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceToken {
    pub entity_type: String,
    pub entity_id: String,
    pub start: usize,
    pub end: usize,
}

impl ReferenceToken {
    pub fn key(&self) -> ReferenceKey {
        ReferenceKey::new(&self.entity_type, &self.entity_id)
    }
}

/// The `(entityType, entityId)` pair identifying a cited entity. Two
/// tokens with the same key always resolve to the same citation number
/// within one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceKey {
    entity_type: String,
    entity_id: String,
}

impl ReferenceKey {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

impl fmt::Display for ReferenceKey {
    /// Renders the canonical cache key form, `entityType:entityId`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)
    }
}

/// Scan `text` for citation tokens recognized by `config`.
///
/// Returns tokens ordered by `start` ascending. Pure function: never
/// mutates the input and never panics, whatever the text contains.
/// Tokens with an unknown entity type or a too-short id are skipped and
/// remain ordinary text.
pub fn scan(text: &str, config: &AnnotateConfig) -> Vec<ReferenceToken> {
    RAW_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let entity_type = caps.get(1)?.as_str();
            let entity_id = caps.get(2)?.as_str();
            if !config.recognizes(entity_type, entity_id) {
                return None;
            }
            Some(ReferenceToken {
                entity_type: entity_type.to_string(),
                entity_id: entity_id.to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}
