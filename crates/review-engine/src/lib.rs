//! Review Engine - clause extraction, risk scoring, summaries and change
//! tracking for legal documents
//!
//! Every operation here is a pure function of its input; a single
//! [`ReviewEngine`] can be shared across threads and requests.

pub mod assistant;
pub mod diff;
pub mod error;
pub mod patterns;
pub mod risk;
pub mod segmenter;
pub mod summarizer;
pub mod templates;

pub use diff::{diff, diff_with_options, DiffOptions};
pub use error::ReviewError;
pub use risk::{confidence, RiskScorer, RiskVocabulary};
pub use segmenter::segment;
pub use summarizer::summarize;

use shared_types::{render_unified, AnalysisReport, ClauseDetail, Comparison, Document};
use tracing::info;

/// Clauses presented with a summary in each report
pub const DETAIL_CLAUSE_LIMIT: usize = 5;

/// ReviewEngine entry point
#[derive(Debug, Clone)]
pub struct ReviewEngine {
    scorer: RiskScorer,
}

impl ReviewEngine {
    pub fn new() -> Self {
        Self::with_vocabulary(RiskVocabulary::default())
    }

    pub fn with_vocabulary(vocabulary: RiskVocabulary) -> Self {
        Self {
            scorer: RiskScorer::new(vocabulary),
        }
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Segment, summarize the leading clauses and score every clause
    pub fn analyze(&self, document: &Document) -> AnalysisReport {
        let clauses = segment(&document.content);
        let findings = self.scorer.score_risks(&clauses);

        let details = clauses
            .iter()
            .take(DETAIL_CLAUSE_LIMIT)
            .enumerate()
            .map(|(i, clause)| ClauseDetail {
                index: i + 1,
                clause: clause.clone(),
                summary: summarize(clause.as_str()),
            })
            .collect();

        let triggered_terms: Vec<String> = self
            .scorer
            .vocabulary()
            .terms()
            .iter()
            .filter(|term| findings.iter().any(|f| f.terms.contains(term)))
            .cloned()
            .collect();

        info!(
            "Analyzed {}: {} clauses, {} risky",
            document.filename,
            clauses.len(),
            findings.len()
        );

        AnalysisReport {
            filename: document.filename.clone(),
            clause_count: clauses.len(),
            clauses: details,
            findings,
            triggered_terms,
        }
    }

    /// Unified diff between two documents
    pub fn compare(&self, original: &Document, modified: &Document) -> Comparison {
        let lines = diff(&original.content, &modified.content);
        let identical = lines.is_empty();

        info!(
            "Compared {} with {}: {}",
            original.filename,
            modified.filename,
            if identical { "identical" } else { "changed" }
        );

        Comparison {
            identical,
            unified: render_unified(&lines),
            lines,
        }
    }

    /// Answer a question from the clauses of `document`
    pub fn ask(&self, question: &str, document: &Document) -> String {
        assistant::answer(question, &segment(&document.content))
    }
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_CLAUSES: &str =
        "Clause 1: Termination.\nThis may be ended.\n\nClause 2: Liability.\nParty liable for damages.";

    #[test]
    fn test_engine_flags_both_clauses() {
        let engine = ReviewEngine::new();
        let report = engine.analyze(&Document::new("contract.txt", TWO_CLAUSES));

        assert_eq!(report.clause_count, 2);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].terms, vec!["termination"]);
        assert_eq!(report.findings[0].confidence, 14.29);
        assert_eq!(report.findings[1].terms, vec!["liable", "damages"]);
        assert_eq!(report.findings[1].confidence, 28.57);
        assert_eq!(report.triggered_terms, vec!["termination", "liable", "damages"]);
    }

    #[test]
    fn test_engine_summarizes_clauses() {
        let engine = ReviewEngine::new();
        let report = engine.analyze(&Document::from_text(TWO_CLAUSES));

        assert_eq!(report.clauses[0].index, 1);
        assert_eq!(
            report.clauses[0].summary.text,
            "Clause 1: Termination. This may be ended."
        );
    }

    #[test]
    fn test_engine_limits_detailed_clauses_but_scores_all() {
        let text = (1..=8)
            .map(|n| format!("Clause {}: The supplier commits a breach if late.", n))
            .collect::<Vec<_>>()
            .join("\n");

        let engine = ReviewEngine::new();
        let report = engine.analyze(&Document::from_text(text));

        assert_eq!(report.clause_count, 8);
        assert_eq!(report.clauses.len(), DETAIL_CLAUSE_LIMIT);
        assert_eq!(report.findings.len(), 8);
    }

    #[test]
    fn test_engine_reports_no_risks() {
        let engine = ReviewEngine::new();
        let report = engine.analyze(&Document::from_text(
            "Clause 3: Notices. All notices must be sent by mail within 10 days of signing this agreement.",
        ));

        assert_eq!(report.clause_count, 1);
        assert!(!report.has_risks());
        assert!(report.triggered_terms.is_empty());
    }

    #[test]
    fn test_engine_handles_empty_document() {
        let engine = ReviewEngine::new();
        let report = engine.analyze(&Document::from_text(""));

        assert_eq!(report.clause_count, 0);
        assert!(report.clauses.is_empty());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_engine_with_custom_vocabulary() {
        let engine = ReviewEngine::with_vocabulary(RiskVocabulary::new(["notices"]).unwrap());
        let report = engine.analyze(&Document::from_text(
            "Clause 3: Notices. All notices must be sent by mail within 10 days of signing this agreement.",
        ));

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].confidence, 100.0);
    }

    #[test]
    fn test_compare_identical_and_changed() {
        let engine = ReviewEngine::new();
        let original = Document::new("v1.txt", "a\nb\nc");

        let same = engine.compare(&original, &Document::new("v1-copy.txt", "a\nb\nc"));
        assert!(same.identical);
        assert!(same.unified.is_empty());

        let changed = engine.compare(&original, &Document::new("v2.txt", "a\nx\nc"));
        assert!(!changed.identical);
        assert!(changed.unified.contains("-b\n+x"));
    }

    #[test]
    fn test_ask_uses_document_clauses() {
        let engine = ReviewEngine::new();
        let response = engine.ask("damages", &Document::from_text(TWO_CLAUSES));
        assert!(response.contains("Party liable for damages."));
    }
}
