//! Similarity search over an in-memory precedent corpus

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::embeddings::{cosine_similarity, Embedder};

// Search confidence thresholds
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.85;
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.75;

/// Results returned when the caller does not ask for a specific count
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Result limit must be at least 1")]
    InvalidLimit,
}

/// Type of match based on similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    DirectMatch,  // score >= 0.85
    SimilarMatch, // 0.75 <= score < 0.85
    WeakMatch,    // score < 0.75
}

impl From<f32> for MatchType {
    fn from(score: f32) -> Self {
        if score >= HIGH_CONFIDENCE_THRESHOLD {
            MatchType::DirectMatch
        } else if score >= LOW_CONFIDENCE_THRESHOLD {
            MatchType::SimilarMatch
        } else {
            MatchType::WeakMatch
        }
    }
}

/// One ranked precedent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedentMatch {
    pub rank: usize, // 1-indexed
    pub content: String,
    pub score: f32,
    pub match_type: MatchType,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct IndexedPrecedent {
    content: String,
    embedding: Vec<f32>,
    metadata: BTreeMap<String, String>,
}

/// Corpus embedded once at build time and searched by cosine similarity
pub struct PrecedentIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<IndexedPrecedent>,
}

impl PrecedentIndex {
    pub fn build<I, S>(corpus: I, embedder: Arc<dyn Embedder>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<IndexedPrecedent> = corpus
            .into_iter()
            .enumerate()
            .map(|(id, content)| {
                let content = content.into();
                IndexedPrecedent {
                    embedding: embedder.embed(&content),
                    metadata: BTreeMap::from([("id".to_string(), id.to_string())]),
                    content,
                }
            })
            .collect();

        debug!(
            "Built precedent index: {} entries, dimension {}",
            entries.len(),
            embedder.dimension()
        );

        Self { embedder, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` precedents by similarity; ties keep corpus order
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<PrecedentMatch>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if k == 0 {
            return Err(SearchError::InvalidLimit);
        }

        let query_embedding = self.embedder.embed(query);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let score = cosine_similarity(&query_embedding, &entry.embedding).clamp(0.0, 1.0);
                (i, score)
            })
            .collect();

        // Stable sort keeps corpus order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let results: Vec<PrecedentMatch> = scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(rank, (i, score))| {
                let entry = &self.entries[i];
                PrecedentMatch {
                    rank: rank + 1,
                    content: entry.content.clone(),
                    score,
                    match_type: MatchType::from(score),
                    metadata: entry.metadata.clone(),
                }
            })
            .collect();

        debug!("Precedent search '{}' returned {} results", query, results.len());

        Ok(results)
    }
}
