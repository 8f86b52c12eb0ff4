//! Keyword-driven document assistant
//!
//! Stands in for a local LLM: a clause is relevant when it contains any word
//! of the question, and the answer quotes the first few relevant clauses.

use shared_types::Clause;

pub const NO_ANSWER: &str = "No relevant information found in the document.";

/// Relevant clauses quoted in one answer
pub const MAX_CITED_CLAUSES: usize = 3;

/// Clauses sharing at least one (lowercased, substring) word with `question`
pub fn relevant_clauses<'a>(question: &str, clauses: &'a [Clause]) -> Vec<&'a Clause> {
    let question = question.to_lowercase();
    let words: Vec<&str> = question.split_whitespace().collect();

    clauses
        .iter()
        .filter(|clause| {
            let text = clause.as_str().to_lowercase();
            words.iter().any(|word| text.contains(word))
        })
        .collect()
}

pub fn answer(question: &str, clauses: &[Clause]) -> String {
    let relevant = relevant_clauses(question, clauses);
    if relevant.is_empty() {
        return NO_ANSWER.to_string();
    }

    let quoted: Vec<String> = relevant
        .iter()
        .take(MAX_CITED_CLAUSES)
        .enumerate()
        .map(|(i, clause)| format!("{}. {}", i + 1, clause.as_str()))
        .collect();

    format!("Here's what I found:\n\n{}", quoted.join("\n\n"))
}
