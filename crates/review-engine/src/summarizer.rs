//! Clause summaries: the first two sentences, or a 100-character preview

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::Summary;

/// Characters kept when a clause has fewer than two sentences
pub const PREVIEW_CHARS: usize = 100;

pub const ELLIPSIS: &str = "...";

lazy_static! {
    /// Sentence-ending punctuation followed by whitespace
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]\s+").unwrap();
}

/// Split text into sentences; punctuation stays with the sentence it ends
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last = 0;

    for found in SENTENCE_BREAK.find_iter(text) {
        // The punctuation mark is a single ASCII byte
        sentences.push(&text[last..found.start() + 1]);
        last = found.end();
    }
    sentences.push(&text[last..]);

    sentences
}

pub fn summarize(clause: &str) -> Summary {
    let sentences = split_sentences(clause);

    if sentences.len() >= 2 {
        return Summary {
            text: format!("{} {}", sentences[0], sentences[1]),
            truncated: false,
        };
    }

    let mut chars = clause.chars();
    let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    let truncated = chars.next().is_some();

    Summary {
        text: if truncated {
            format!("{}{}", preview, ELLIPSIS)
        } else {
            preview
        },
        truncated,
    }
}
