//! Risk-term scoring
//!
//! Each clause is searched (case-insensitively, as a plain substring) for
//! every term of a [`RiskVocabulary`]. A clause that contains at least one
//! term yields a [`RiskFinding`] whose confidence is the share of the
//! vocabulary it matched, as a percentage rounded to two decimals.

use serde::{Deserialize, Serialize};
use shared_types::{Clause, RiskFinding};
use tracing::debug;

use crate::error::ReviewError;
use crate::patterns::{contains_term, find_term_position, DEFAULT_RISK_TERMS};

/// Immutable, ordered, de-duplicated set of lowercase risk terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVocabulary {
    terms: Vec<String>,
}

impl RiskVocabulary {
    /// Build a vocabulary, keeping first-seen order and dropping duplicates
    pub fn new<I, S>(terms: I) -> Result<Self, ReviewError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if term.is_empty() {
                return Err(ReviewError::InvalidInput(
                    "risk vocabulary contains an empty term".to_string(),
                ));
            }
            if !unique.contains(&term) {
                unique.push(term);
            }
        }

        if unique.is_empty() {
            return Err(ReviewError::InvalidInput(
                "risk vocabulary must contain at least one term".to_string(),
            ));
        }

        Ok(Self { terms: unique })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for RiskVocabulary {
    fn default() -> Self {
        Self {
            terms: DEFAULT_RISK_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// `matched / total * 100`, rounded half away from zero to two decimals
pub fn confidence(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = matched as f64 / total as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

/// Stateless scorer over an injected vocabulary
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    vocabulary: RiskVocabulary,
}

impl RiskScorer {
    pub fn new(vocabulary: RiskVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &RiskVocabulary {
        &self.vocabulary
    }

    /// Score one clause; `None` when no term matches
    pub fn score_clause(&self, clause: &Clause) -> Option<RiskFinding> {
        let text_lower = clause.as_str().to_lowercase();

        let terms: Vec<String> = self
            .vocabulary
            .terms()
            .iter()
            .filter(|term| contains_term(&text_lower, term))
            .cloned()
            .collect();

        let first = terms.first()?;
        let highlight = find_term_position(clause.as_str(), first);

        Some(RiskFinding {
            confidence: confidence(terms.len(), self.vocabulary.len()),
            highlight,
            terms,
            clause: clause.clone(),
        })
    }

    /// Score clauses in document order, skipping clauses without matches
    pub fn score_risks(&self, clauses: &[Clause]) -> Vec<RiskFinding> {
        let findings: Vec<RiskFinding> = clauses
            .iter()
            .filter_map(|clause| self.score_clause(clause))
            .collect();

        debug!(
            "Scored {} clauses, {} with risk terms",
            clauses.len(),
            findings.len()
        );

        findings
    }

    /// Score caller-supplied clause texts, rejecting blank or too-short
    /// entries instead of matching against them
    pub fn score_texts<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<RiskFinding>, ReviewError> {
        let clauses = texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let text = text.as_ref();
                if text.trim().is_empty() {
                    return Err(ReviewError::InvalidInput(format!(
                        "clause {} is empty",
                        index + 1
                    )));
                }
                Clause::parse(text).ok_or_else(|| {
                    ReviewError::InvalidInput(format!(
                        "clause {} is too short to be a clause",
                        index + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.score_risks(&clauses))
    }
}
