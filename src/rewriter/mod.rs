//! Token-to-marker rewriting.
//!
//! Replaces each scanned raw token with its normalized single-citation
//! marker. Tokens are processed in reverse `start` order so replacements
//! never invalidate the offsets of tokens still pending.

use crate::marker::format_single;
use crate::numbering::NumberingTable;
use crate::token::ReferenceToken;

/// Rewrite every token in `text` into `[{n}](#ref-{type}-{id})`.
///
/// The replaced span widens to consume surrounding bracket artifacts the
/// upstream generator sometimes emits:
/// - `[[token]]` consumes both outer brackets
/// - `[token]` with one extra bracket each side consumes those
/// - otherwise exactly the token span is replaced
///
/// `tokens` must be the scan output for this same `text`, ordered by
/// `start` ascending.
pub fn rewrite_tokens(text: &str, tokens: &[ReferenceToken], table: &NumberingTable) -> String {
    let mut out = text.to_string();

    for token in tokens.iter().rev() {
        let Some(number) = table.number_of(&token.key()) else {
            // Table was built from these tokens; a miss means the caller
            // paired mismatched inputs. Leave the token as text.
            continue;
        };

        let before = &out[..token.start];
        let after = &out[token.end..];

        let (start, end) = if before.ends_with("[[") && after.starts_with("]]") {
            (token.start - 2, token.end + 2)
        } else if before.ends_with('[') && after.starts_with(']') {
            (token.start - 1, token.end + 1)
        } else {
            (token.start, token.end)
        };

        let link = format_single(number, &token.entity_type, &token.entity_id);
        out.replace_range(start..end, &link);
    }

    out
}
