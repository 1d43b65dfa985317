//! Defensive cleanup of the merged text.
//!
//! Three narrowly-scoped repairs run after merging:
//!
//! 1. leftover raw tokens (complete or unterminated) of the recognized
//!    grammar are stripped;
//! 2. a marker that lost its opening bracket (`1, 2](#ref-…)`) is
//!    re-opened — only numerals sitting directly against a recognized
//!    anchor construct qualify, ordinary numerals are never touched;
//! 3. citation numbers not present in the numbering table are pruned:
//!    a single marker with an invalid number is deleted, a group is
//!    filtered (and deleted if that empties it).

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnnotateConfig;
use crate::marker::{MarkerSpan, format_group, format_single, parse_spans};
use crate::numbering::NumberingTable;

/// A complete raw token, same shape as the scanner's grammar.
static LEFTOVER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([a-z][a-z0-9_]*):([A-Za-z0-9_]+)\]")
        .expect("LEFTOVER_TOKEN: hardcoded regex is valid")
});

/// An unterminated raw token (opening bracket never closed).
static DANGLING_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([a-z][a-z0-9_]*):([A-Za-z0-9_]+)")
        .expect("DANGLING_TOKEN: hardcoded regex is valid")
});

/// A recognized anchor construct preceded by its numeral list but missing
/// the opening bracket. The numeral run must start the match, so a
/// well-formed marker (whose `[` sits immediately before the run) is
/// checked via the preceding byte instead of a lookbehind.
static UNOPENED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\s*,\s*\d+)*\]\(#ref-[A-Za-z0-9_-]+\)")
        .expect("UNOPENED_MARKER: hardcoded regex is valid")
});

/// Run all cleanup passes. Pure; never touches spans it cannot interpret.
pub fn cleanup_citations(text: &str, table: &NumberingTable, config: &AnnotateConfig) -> String {
    let stripped = strip_leftover_tokens(text, config);
    let repaired = reopen_unopened_markers(&stripped);
    prune_invalid_numbers(&repaired, table)
}

/// Remove raw tokens the rewriter did not consume. Only tokens matching
/// the configured grammar are stripped; anything else stays ordinary text.
fn strip_leftover_tokens(text: &str, config: &AnnotateConfig) -> String {
    let text = LEFTOVER_TOKEN.replace_all(text, |caps: &regex::Captures<'_>| {
        if config.recognizes(&caps[1], &caps[2]) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    DANGLING_TOKEN
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            if config.recognizes(&caps[1], &caps[2]) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Re-open markers whose leading `[` was lost to a partial rewrite.
fn reopen_unopened_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;

    for m in UNOPENED_MARKER.find_iter(text) {
        out.push_str(&text[last_end..m.start()]);
        // The byte before the numeral run decides: `[` means the marker
        // is already well-formed.
        let opened = text[..m.start()].ends_with('[');
        if !opened {
            tracing::debug!(at = m.start(), "re-opened bracket on citation marker");
            out.push('[');
        }
        out.push_str(m.as_str());
        last_end = m.end();
    }

    out.push_str(&text[last_end..]);
    out
}

/// Drop citation numbers the numbering table never assigned.
fn prune_invalid_numbers(text: &str, table: &NumberingTable) -> String {
    let mut out = String::with_capacity(text.len());

    for span in parse_spans(text) {
        match span {
            MarkerSpan::Plain(plain) => out.push_str(plain),
            MarkerSpan::Single {
                number,
                entity_type,
                entity_id,
            } => {
                if table.contains_number(number) {
                    out.push_str(&format_single(number, entity_type, entity_id));
                } else {
                    tracing::debug!(number, "dropped citation marker with invalid number");
                }
            }
            MarkerSpan::Group { mut numbers } => {
                numbers.retain(|n| table.contains_number(*n));
                if numbers.is_empty() {
                    tracing::debug!("dropped citation group with no valid numbers");
                } else {
                    out.push_str(&format_group(&numbers));
                }
            }
        }
    }

    out
}
