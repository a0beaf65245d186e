//! contextvault: a local chunk store with hybrid semantic + keyword retrieval.
//!
//! Documents arrive pre-chunked from an external parser, get embedded by an
//! external [`Embedder`], and land in a SQLite-backed [`ChunkStore`]. A query
//! scans the stored chunks, scores each one (cosine similarity, optionally
//! blended with a BM25-style keyword score) and returns the top-K matches.
//!
//! Parsing, embedding and answer generation are external collaborators; the
//! interfaces here are the store, the ranker and the [`RetrievalEngine`]
//! that wires them to an embedder.

mod config;
mod embedder;
mod engine;
mod error;
mod score;
mod search;
mod store;
mod types;

pub use config::StoreConfig;
pub use embedder::Embedder;
pub use engine::{build_context, RetrievalEngine};
pub use error::{Result, RetrievalError};
pub use score::{
    cosine_similarity, hybrid_score, keyword_score, BM25_B, BM25_K1, HYBRID_KEYWORD_WEIGHT,
    HYBRID_SEMANTIC_WEIGHT,
};
pub use search::SearchService;
pub use store::ChunkStore;
pub use types::{Chunk, ChunkMetadata, NewChunk, ParsedChunk, SearchOptions, SearchResult};
