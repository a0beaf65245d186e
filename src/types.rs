//! Core record types shared by the store, scorer and ranker.

use serde::{Deserialize, Serialize};

/// Positional metadata attached to a stored chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub filename: String,
    pub chunk_index: i64,
    /// 1-based page of origin within the source document.
    pub page_number: i64,
}

/// The unit of retrieval: a text segment plus its embedding vector.
///
/// Chunks are inserted once and never mutated; all chunks in one store must
/// share the same embedding dimensionality for scoring to be meaningful.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: Option<ChunkMetadata>,
}

/// Borrowed insert parameters for [`crate::ChunkStore::add_chunk`].
pub struct NewChunk<'a> {
    pub id: &'a str,
    pub text: &'a str,
    pub embedding: &'a [f32],
    pub metadata: Option<&'a ChunkMetadata>,
}

/// One ranked hit; produced fresh on every query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f64,
}

/// Knobs for a single search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub top_k: usize,
    /// Blend the semantic score with a keyword score. Requires `query_text`;
    /// with an empty query text the search degrades to semantic-only.
    pub hybrid: bool,
    pub query_text: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            hybrid: false,
            query_text: String::new(),
        }
    }
}

/// Output of the external chunker: one parsed segment of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParsedChunk {
    pub text: String,
    pub chunk_index: i64,
    pub page_number: i64,
}
