//! citemark: citation annotation engine for AI-generated markdown.
//!
//! Rewrites raw `[source:ID]` citation tokens into numbered, clickable
//! markers, merges adjacent markers into grouped spans, prunes invalid
//! leftovers, and builds an ordered reference list with titles resolved
//! through a caller-supplied [`TitleResolver`].
//!
//! ```no_run
//! # async fn demo() {
//! use citemark::{Annotator, StaticTitles, TitleCache};
//!
//! let mut titles = StaticTitles::default();
//! titles.insert("source:abc123def", "Risk Factors in Adults");
//!
//! let annotator = Annotator::default();
//! let cache = TitleCache::new();
//! let out = annotator
//!     .annotate("High risk [source:abc123def].", &titles, &cache)
//!     .await;
//!
//! assert_eq!(out.text, "High risk [1](#ref-source-abc123def).");
//! assert_eq!(out.references[0].title.as_deref(), Some("Risk Factors in Adults"));
//! # }
//! ```

pub mod cleanup;
pub mod config;
pub mod engine;
pub mod errors;
pub mod marker;
pub mod merger;
pub mod numbering;
pub mod reflist;
pub mod rewriter;
pub mod token;

pub use config::{AnnotateConfig, FallbackPolicy};
pub use engine::{Annotated, Annotator};
pub use errors::{ResolveError, ResolveResult};
pub use numbering::NumberingTable;
pub use reflist::{ReferenceListItem, StaticTitles, TitleCache, TitleResolver};
pub use token::{ReferenceKey, ReferenceToken};

/// Annotate `text` with the default configuration.
pub async fn annotate<R: TitleResolver>(
    text: &str,
    resolver: &R,
    cache: &TitleCache,
) -> Annotated {
    Annotator::default().annotate(text, resolver, cache).await
}
