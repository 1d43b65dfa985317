//! Tokenizer for normalized citation markers.
//!
//! After the rewriter has replaced raw tokens, the text contains markers
//! of two shapes:
//!
//! - single citation: `[{n}](#ref-{entityType}-{entityId})`
//! - merged group: `[{n1, n2, …}](#ref-combined)`
//!
//! The merger and cleanup passes operate on a span stream produced here
//! (`Plain | Single | Group`) instead of cascading string substitutions,
//! so adjacency rules are applied structurally rather than by pattern
//! overlap.

use std::sync::LazyLock;

use regex::Regex;
use smallvec::SmallVec;

/// Anchor name used by merged groups (and bracket-artifact collapses).
pub const COMBINED_ANCHOR: &str = "combined";

/// Numbers per citation span. Merged groups rarely exceed four sources.
pub type NumberSet = SmallVec<[u32; 4]>;

/// Matches any normalized citation marker.
///
/// Pattern breakdown:
/// - `\[` - literal opening bracket
/// - `(\d+(?:\s*,\s*\d+)*)` - capture group: one number, or a comma list
/// - `\]\(#ref-` - closing bracket and anchor prefix
/// - `([A-Za-z0-9_-]+)` - capture group: anchor suffix, either
///   `combined` or `{entityType}-{entityId}`
/// - `\)` - closing paren
///
/// Ordinary markdown links never match: the visible text must be a
/// numeric list and the anchor must carry the `#ref-` prefix.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d+(?:\s*,\s*\d+)*)\]\(#ref-([A-Za-z0-9_-]+)\)")
        .expect("MARKER: hardcoded regex is valid")
});

/// One span of rewritten text: marker or the plain text between markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerSpan<'a> {
    Plain(&'a str),
    Single {
        number: u32,
        entity_type: &'a str,
        entity_id: &'a str,
    },
    Group {
        numbers: NumberSet,
    },
}

impl MarkerSpan<'_> {
    pub fn is_citation(&self) -> bool {
        !matches!(self, MarkerSpan::Plain(_))
    }

    /// The span's numbers, sorted ascending without duplicates.
    pub fn numbers(&self) -> NumberSet {
        match self {
            MarkerSpan::Plain(_) => NumberSet::new(),
            MarkerSpan::Single { number, .. } => {
                let mut set = NumberSet::new();
                set.push(*number);
                set
            }
            MarkerSpan::Group { numbers } => numbers.clone(),
        }
    }
}

/// Parse a comma-separated number list, dropping anything non-numeric,
/// then sort and deduplicate.
pub fn parse_number_list(raw: &str) -> NumberSet {
    let mut numbers: NumberSet = raw
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect();
    normalize_numbers(&mut numbers);
    numbers
}

/// Sort ascending and deduplicate in place.
pub fn normalize_numbers(numbers: &mut NumberSet) {
    numbers.sort_unstable();
    numbers.dedup();
}

/// Tokenize rewritten text into a span stream.
///
/// A marker that looks structurally wrong (comma list on a non-combined
/// anchor, anchor without a type/id split) is kept as `Plain` — the
/// pipeline leaves spans it cannot interpret untouched rather than risk
/// corrupting surrounding text.
pub fn parse_spans(text: &str) -> Vec<MarkerSpan<'_>> {
    let mut spans = Vec::new();
    let mut last_end = 0;

    for caps in MARKER.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        let body = caps.get(1).map_or("", |m| m.as_str());
        let anchor = caps.get(2).map_or("", |m| m.as_str());

        let span = classify(body, anchor);
        let Some(span) = span else {
            continue; // stays inside the surrounding plain span
        };

        if whole.start() > last_end {
            spans.push(MarkerSpan::Plain(&text[last_end..whole.start()]));
        }
        spans.push(span);
        last_end = whole.end();
    }

    if last_end < text.len() {
        spans.push(MarkerSpan::Plain(&text[last_end..]));
    }
    spans
}

fn classify<'a>(body: &'a str, anchor: &'a str) -> Option<MarkerSpan<'a>> {
    if anchor == COMBINED_ANCHOR {
        let numbers = parse_number_list(body);
        if numbers.is_empty() {
            return None;
        }
        return Some(MarkerSpan::Group { numbers });
    }

    // Single markers carry exactly one number and a type-id anchor.
    let number: u32 = body.trim().parse().ok()?;
    let (entity_type, entity_id) = anchor.split_once('-')?;
    if entity_type.is_empty() || entity_id.is_empty() {
        return None;
    }
    Some(MarkerSpan::Single {
        number,
        entity_type,
        entity_id,
    })
}

/// Render a single-citation marker.
pub fn format_single(number: u32, entity_type: &str, entity_id: &str) -> String {
    format!("[{number}](#ref-{entity_type}-{entity_id})")
}

/// Render a group marker. A one-element group still uses the combined
/// anchor, matching what bracket-artifact collapsing produces.
pub fn format_group(numbers: &NumberSet) -> String {
    let joined = numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}](#ref-{COMBINED_ANCHOR})")
}
