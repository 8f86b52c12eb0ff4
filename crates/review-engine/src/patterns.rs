//! Keyword vocabulary and matching helpers for risk detection

use shared_types::TextPosition;

/// Terms that indicate potential legal exposure, in reporting order
pub const DEFAULT_RISK_TERMS: &[&str] = &[
    "penalty",
    "termination",
    "breach",
    "indemnity",
    "arbitration",
    "liable",
    "damages",
];

/// Case-insensitive substring containment. No word boundaries: "liable" is
/// found inside "reliable".
pub fn contains_term(text_lower: &str, term: &str) -> bool {
    text_lower.contains(&term.to_lowercase())
}

/// Byte span of the first case-insensitive occurrence of `term` in `text`,
/// for highlighting. Lowercases the same way [`contains_term`] does, so
/// non-ASCII terms are found too.
pub fn find_term_position(text: &str, term: &str) -> Option<TextPosition> {
    let needle: Vec<char> = term.to_lowercase().chars().collect();
    if needle.is_empty() {
        return None;
    }

    text.char_indices().find_map(|(start, _)| {
        lowercase_prefix_len(&text[start..], &needle).map(|len| TextPosition {
            start_offset: start,
            end_offset: start + len,
        })
    })
}

/// Byte length of the shortest prefix of `text` whose lowercase form starts
/// with `needle`
fn lowercase_prefix_len(text: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;

    for (offset, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            if matched == needle.len() {
                break;
            }
            if lower != needle[matched] {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(offset + c.len_utf8());
        }
    }

    None
}
