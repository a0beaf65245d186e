//! Ranking over the chunk store: scan, score, sort, truncate.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::Result;
use crate::score::{cosine_similarity, hybrid_score, keyword_score};
use crate::store::ChunkStore;
use crate::types::{SearchOptions, SearchResult};

pub struct SearchService {
    store: Arc<ChunkStore>,
}

impl SearchService {
    pub fn new(store: Arc<ChunkStore>) -> Self {
        Self { store }
    }

    /// Scores every stored chunk against `query_embedding` and returns the
    /// top `opts.top_k` results in descending score order. The result length
    /// is `min(top_k, chunk count)`; an empty store yields an empty list.
    ///
    /// Hybrid mode needs `opts.query_text`; with an empty query text the call
    /// degrades to semantic-only scoring.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        opts: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let chunks = self.store.scan_all().await?;
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let hybrid = opts.hybrid && !opts.query_text.is_empty();
        if opts.hybrid && !hybrid {
            tracing::debug!("hybrid search without query text, falling back to semantic scoring");
        }

        let mut scored: Vec<SearchResult> = chunks
            .iter()
            .map(|chunk| {
                let semantic = cosine_similarity(query_embedding, &chunk.embedding);
                let score = if hybrid {
                    let keyword = keyword_score(&opts.query_text, &chunk.text, &chunks);
                    hybrid_score(semantic, keyword)
                } else {
                    semantic
                };
                SearchResult {
                    chunk: chunk.clone(),
                    score,
                }
            })
            .collect();

        // stable sort keeps tie order deterministic for a given snapshot
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(opts.top_k);

        tracing::debug!(results = scored.len(), hybrid, "Search complete");
        Ok(scored)
    }
}
