//! Clause segmentation
//!
//! Documents that number their clauses ("Clause 1:", "CLAUSE 2.", "clause 3 -")
//! are cut at each header line. Everything from one header up to the next
//! header (or end of text) is one clause, so bodies may span many lines.
//! Documents without headers fall back to blank-line separated paragraphs.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::Clause;

lazy_static! {
    /// A line that opens a numbered clause
    static ref CLAUSE_HEADER: Regex = Regex::new(r"(?i)^clause[ \t]+\d+[:.\-]").unwrap();

    /// Paragraph separator for documents without clause headers
    static ref BLANK_LINES: Regex = Regex::new(r"\n{2,}").unwrap();
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Outside,
    InClause { start: usize },
}

/// Split document text into trimmed clauses longer than 20 characters
pub fn segment(text: &str) -> Vec<Clause> {
    let headed = split_on_headers(text);
    let candidates = if headed.is_empty() {
        split_paragraphs(text)
    } else {
        headed
    };

    candidates.into_iter().filter_map(Clause::parse).collect()
}

/// Returns true if `line` starts a numbered clause
pub fn is_clause_header(line: &str) -> bool {
    CLAUSE_HEADER.is_match(line)
}

/// Raw (untrimmed, unfiltered) clause bodies delimited by header lines
fn split_on_headers(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut state = ScanState::Outside;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if is_clause_header(line) {
            if let ScanState::InClause { start } = state {
                clauses.push(&text[start..offset]);
            }
            state = ScanState::InClause { start: offset };
        }
        offset += line.len();
    }

    if let ScanState::InClause { start } = state {
        clauses.push(&text[start..]);
    }

    clauses
}

fn split_paragraphs(text: &str) -> Vec<&str> {
    BLANK_LINES.split(text).collect()
}
