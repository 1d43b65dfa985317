//! Fixed-point merging of adjacent citation markers.
//!
//! Two citation markers separated only by whitespace, or by a single
//! comma with optional whitespace, collapse into one grouped marker whose
//! numbers are the sorted, deduplicated union. The pass runs to a fixed
//! point: every successful merge strictly reduces the marker count, so
//! the loop terminates without an iteration cap.
//!
//! Before each merge round, stray double-bracket artifacts around an
//! already-normalized marker are collapsed:
//!
//! - `[[{nums}]](#ref-combined)` -> `[{nums}](#ref-combined)`
//! - `[[{n}](#ref-…)`            -> `[{n}](#ref-combined)`
//! - `[{n}]](#ref-…)`            -> `[{n}](#ref-combined)`

use std::sync::LazyLock;

use regex::Regex;

use crate::marker::{
    MarkerSpan, NumberSet, format_group, format_single, normalize_numbers, parse_spans,
};

static DOUBLED_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([\d,\s]+)\]\]\(#ref-combined\)")
        .expect("DOUBLED_GROUP: hardcoded regex is valid")
});

static LEADING_DOUBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(\d+)\]\(#ref-[^)]+\)")
        .expect("LEADING_DOUBLE: hardcoded regex is valid")
});

static TRAILING_DOUBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d+)\]\]\(#ref-[^)]+\)")
        .expect("TRAILING_DOUBLE: hardcoded regex is valid")
});

/// Merge adjacent citation markers until no further merge applies.
/// Idempotent at the fixed point.
pub fn merge_citations(text: &str) -> String {
    let mut current = text.to_string();
    let mut rounds = 0usize;
    loop {
        let collapsed = collapse_bracket_artifacts(&current);
        let merged = merge_adjacent_once(&collapsed);
        rounds += 1;
        if merged == current {
            tracing::debug!(rounds, "citation merge reached fixed point");
            return merged;
        }
        current = merged;
    }
}

fn collapse_bracket_artifacts(text: &str) -> String {
    let text = DOUBLED_GROUP.replace_all(text, "[$1](#ref-combined)");
    let text = LEADING_DOUBLE.replace_all(&text, "[$1](#ref-combined)");
    TRAILING_DOUBLE
        .replace_all(&text, "[$1](#ref-combined)")
        .into_owned()
}

/// One left-to-right pass over the span stream, folding every run of
/// mergeable neighbors into the accumulated left-hand citation. Covers
/// all four adjacency shapes (single+single, single+group, group+single,
/// group+group) in a single pass.
fn merge_adjacent_once(text: &str) -> String {
    let spans = parse_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<Pending<'_>> = None;

    let mut i = 0;
    while i < spans.len() {
        match &spans[i] {
            MarkerSpan::Plain(plain) => {
                let next_is_citation = spans.get(i + 1).is_some_and(MarkerSpan::is_citation);
                if let Some(left) = pending.take() {
                    if next_is_citation && is_mergeable_separator(plain) {
                        pending = Some(left.merge(&spans[i + 1]));
                        i += 2;
                        continue;
                    }
                    left.flush(&mut out);
                }
                out.push_str(plain);
            }
            span => {
                if let Some(left) = pending.take() {
                    left.flush(&mut out);
                }
                pending = Some(Pending::from_span(span));
            }
        }
        i += 1;
    }

    if let Some(left) = pending {
        left.flush(&mut out);
    }
    out
}

/// A citation being accumulated during the merge pass. A single that
/// never merges is re-emitted verbatim, keeping its typed anchor.
enum Pending<'a> {
    Single {
        number: u32,
        entity_type: &'a str,
        entity_id: &'a str,
    },
    Group(NumberSet),
}

impl<'a> Pending<'a> {
    fn from_span(span: &MarkerSpan<'a>) -> Self {
        match span {
            MarkerSpan::Single {
                number,
                entity_type,
                entity_id,
            } => Pending::Single {
                number: *number,
                entity_type: *entity_type,
                entity_id: *entity_id,
            },
            _ => Pending::Group(span.numbers()),
        }
    }

    fn merge(self, right: &MarkerSpan<'_>) -> Pending<'a> {
        let mut numbers = match self {
            Pending::Single { number, .. } => {
                let mut set = NumberSet::new();
                set.push(number);
                set
            }
            Pending::Group(numbers) => numbers,
        };
        numbers.extend(right.numbers());
        normalize_numbers(&mut numbers);
        Pending::Group(numbers)
    }

    fn flush(self, out: &mut String) {
        match self {
            Pending::Single {
                number,
                entity_type,
                entity_id,
            } => out.push_str(&format_single(number, entity_type, entity_id)),
            Pending::Group(numbers) => out.push_str(&format_group(&numbers)),
        }
    }
}

/// Whether plain text between two markers is a mergeable separator:
/// whitespace only, or exactly one comma among optional whitespace.
fn is_mergeable_separator(plain: &str) -> bool {
    if plain.is_empty() {
        return false;
    }
    let mut commas = 0usize;
    for c in plain.chars() {
        if c == ',' {
            commas += 1;
        } else if !c.is_whitespace() {
            return false;
        }
    }
    commas <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_whitespace_separated_singles() {
        let out = merge_citations("[1](#ref-source-aaa111bbb) [2](#ref-source-ccc222ddd)");
        assert_eq!(out, "[1, 2](#ref-combined)");
    }

    #[test]
    fn merges_comma_separated_singles() {
        let out = merge_citations("[1](#ref-source-aaa111bbb), [2](#ref-source-ccc222ddd)");
        assert_eq!(out, "[1, 2](#ref-combined)");
    }

    #[test]
    fn space_and_comma_adjacency_agree() {
        let spaced = merge_citations("[1](#ref-source-a1a1a1) [2](#ref-source-b2b2b2)");
        let comma = merge_citations("[1](#ref-source-a1a1a1), [2](#ref-source-b2b2b2)");
        assert_eq!(spaced, comma);
    }

    #[test]
    fn merges_group_with_single_on_either_side() {
        let out = merge_citations("[1, 3](#ref-combined) [2](#ref-source-xyz789ghi)");
        assert_eq!(out, "[1, 2, 3](#ref-combined)");

        let out = merge_citations("[2](#ref-source-xyz789ghi), [1, 3](#ref-combined)");
        assert_eq!(out, "[1, 2, 3](#ref-combined)");
    }

    #[test]
    fn merges_group_with_group() {
        let out = merge_citations("[1, 4](#ref-combined) [2, 4](#ref-combined)");
        assert_eq!(out, "[1, 2, 4](#ref-combined)");
    }

    #[test]
    fn merges_whole_run_in_one_call() {
        let out = merge_citations(
            "[3](#ref-source-ccc333ccc) [1](#ref-source-aaa111aaa), [2](#ref-source-bbb222bbb)",
        );
        assert_eq!(out, "[1, 2, 3](#ref-combined)");
    }

    #[test]
    fn unmergeable_gap_keeps_markers_apart() {
        let text = "[1](#ref-source-aaa111bbb) and [2](#ref-source-ccc222ddd)";
        assert_eq!(merge_citations(text), text);
    }

    #[test]
    fn touching_markers_without_separator_do_not_merge() {
        let text = "[1](#ref-source-aaa111bbb)[2](#ref-source-ccc222ddd)";
        assert_eq!(merge_citations(text), text);
    }

    #[test]
    fn two_commas_are_not_a_separator() {
        let text = "[1](#ref-source-aaa111bbb),, [2](#ref-source-ccc222ddd)";
        assert_eq!(merge_citations(text), text);
    }

    #[test]
    fn collapses_leading_double_bracket_artifact() {
        let out = merge_citations("x [[1](#ref-source-abc123def) y");
        assert_eq!(out, "x [1](#ref-combined) y");
    }

    #[test]
    fn collapses_trailing_double_bracket_artifact() {
        let out = merge_citations("x [1]](#ref-source-abc123def) y");
        assert_eq!(out, "x [1](#ref-combined) y");
    }

    #[test]
    fn collapses_doubled_group_brackets() {
        let out = merge_citations("[[1, 2]](#ref-combined)");
        assert_eq!(out, "[1, 2](#ref-combined)");
    }

    #[test]
    fn idempotent_at_fixed_point() {
        let once = merge_citations("[1](#ref-source-aaa111bbb) [2](#ref-source-ccc222ddd)");
        assert_eq!(merge_citations(&once), once);
    }

    #[test]
    fn merge_output_numbers_are_sorted_regardless_of_text_order() {
        let out = merge_citations("[5](#ref-source-eee555eee) [2](#ref-source-bbb222bbb)");
        assert_eq!(out, "[2, 5](#ref-combined)");
    }

    #[test]
    fn plain_text_passes_through() {
        let text = "no citations here, just [a link](https://example.com) and [3] notes";
        assert_eq!(merge_citations(text), text);
    }
}
