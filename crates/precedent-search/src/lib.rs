//! Precedent Search - similarity search over reference clauses
//!
//! A [`PrecedentIndex`] embeds its corpus once and answers top-k cosine
//! queries. The embedding model sits behind the [`Embedder`] trait so a
//! learned model can replace [`HashingEmbedder`] without touching callers.

pub mod embeddings;
pub mod search;

pub use embeddings::{cosine_similarity, Embedder, HashingEmbedder, DEFAULT_DIMENSION};
pub use search::{
    MatchType, PrecedentIndex, PrecedentMatch, SearchError, DEFAULT_TOP_K,
    HIGH_CONFIDENCE_THRESHOLD, LOW_CONFIDENCE_THRESHOLD,
};

use std::sync::Arc;

/// Reference clauses bundled with the server
pub const SAMPLE_PRECEDENTS: &[&str] = &[
    "This agreement may be terminated by either party with 30 days notice.",
    "All disputes shall be resolved through arbitration in accordance with applicable rules.",
    "The vendor is liable for any damages resulting from breach of contract or negligence.",
    "Upon mutual agreement, the contract may be extended for another term.",
    "Any violation of confidentiality shall be considered a material breach of this agreement.",
];

/// Index over [`SAMPLE_PRECEDENTS`] with the default embedder
pub fn sample_index() -> PrecedentIndex {
    PrecedentIndex::build(
        SAMPLE_PRECEDENTS.iter().copied(),
        Arc::new(HashingEmbedder::default()),
    )
}
