//! Top-level annotation pipeline.
//!
//! `scan -> number -> rewrite -> merge (fixed point) -> cleanup`, with
//! reference-list building fanned out over the title resolver. The
//! pipeline never fails over its input text: text with no recognizable
//! tokens passes through unchanged with an empty reference list.

use serde::{Deserialize, Serialize};

use crate::cleanup::cleanup_citations;
use crate::config::AnnotateConfig;
use crate::merger::merge_citations;
use crate::numbering::NumberingTable;
use crate::reflist::{ReferenceListItem, TitleCache, TitleResolver, build_reference_list};
use crate::rewriter::rewrite_tokens;
use crate::token::scan;

/// Output of one annotation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotated {
    /// The rewritten markdown with numbered citation markers.
    pub text: String,
    /// Ordered, de-duplicated reference list.
    pub references: Vec<ReferenceListItem>,
}

/// The citation annotation engine. Cheap to construct and to clone;
/// holds only configuration. All per-text state lives inside one call.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: AnnotateConfig,
}

impl Annotator {
    pub fn new(config: AnnotateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnnotateConfig {
        &self.config
    }

    /// The synchronous text stages only: returns the rewritten text and
    /// the numbering table feeding the reference list.
    ///
    /// Exposed separately so a UI can display the rewritten text
    /// immediately and let title lookups trail behind (or be cancelled)
    /// without holding the text hostage.
    pub fn annotate_text(&self, text: &str) -> (String, NumberingTable) {
        let tokens = scan(text, &self.config);
        if tokens.is_empty() {
            return (text.to_string(), NumberingTable::default());
        }

        let table = NumberingTable::from_tokens(&tokens);
        let rewritten = rewrite_tokens(text, &tokens, &table);
        let merged = merge_citations(&rewritten);
        let cleaned = cleanup_citations(&merged, &table, &self.config);

        tracing::debug!(
            tokens = tokens.len(),
            distinct = table.len(),
            "citation annotation complete"
        );
        (cleaned, table)
    }

    /// Full pipeline: rewrite the text and build the reference list.
    ///
    /// `cache` is caller-owned and survives across calls; only keys
    /// missing from it are resolved. Dropping the returned future
    /// abandons in-flight lookups.
    pub async fn annotate<R: TitleResolver>(
        &self,
        text: &str,
        resolver: &R,
        cache: &TitleCache,
    ) -> Annotated {
        let (text, table) = self.annotate_text(text);
        if table.is_empty() {
            return Annotated {
                text,
                references: Vec::new(),
            };
        }

        let references =
            build_reference_list(&table, resolver, cache, self.config.fallback()).await;
        Annotated { text, references }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        let annotator = Annotator::default();
        let text = "No citations, just **markdown** and a [link](https://example.com).";
        let (out, table) = annotator.annotate_text(text);
        assert_eq!(out, text);
        assert!(table.is_empty());
    }

    #[test]
    fn end_to_end_text_stages() {
        let annotator = Annotator::default();
        let (out, table) =
            annotator.annotate_text("Fakta [source:abc123def] [source:xyz789ghi] juga.");
        assert_eq!(out, "Fakta [1, 2](#ref-combined) juga.");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn annotated_output_is_stable_under_reannotation() {
        let annotator = Annotator::default();
        let (once, _) = annotator.annotate_text("Lihat [source:abc123def], [source:xyz789ghi].");
        let (twice, table) = annotator.annotate_text(&once);
        assert_eq!(twice, once);
        assert!(table.is_empty());
    }
}
