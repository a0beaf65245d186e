//! Ingest/retrieve orchestration around the chunk store.
//!
//! The chunker, the embedder and the answer-generating model are external
//! collaborators; this engine embeds pre-parsed chunks into the store and
//! turns a question into ranked chunks plus a context block for the caller's
//! prompt.

use std::sync::Arc;

use crate::embedder::Embedder;
use crate::error::{Result, RetrievalError};
use crate::search::SearchService;
use crate::store::ChunkStore;
use crate::types::{ChunkMetadata, NewChunk, ParsedChunk, SearchOptions, SearchResult};

pub struct RetrievalEngine {
    store: Arc<ChunkStore>,
    search: SearchService,
    embedder: Box<dyn Embedder>,
}

impl RetrievalEngine {
    pub fn new(store: Arc<ChunkStore>, embedder: Box<dyn Embedder>) -> Self {
        let search = SearchService::new(store.clone());
        Self {
            store,
            search,
            embedder,
        }
    }

    /// Embeds and stores every parsed chunk of a document.
    ///
    /// Chunk ids are derived as `{document_name}-{chunk_index}` and stay
    /// stable across runs; re-ingesting a document without clearing first
    /// fails on the first duplicate id.
    pub async fn ingest(&self, document_name: &str, chunks: &[ParsedChunk]) -> Result<usize> {
        if document_name.trim().is_empty() {
            return Err(RetrievalError::Validation(
                "document name is empty".to_string(),
            ));
        }

        for parsed in chunks {
            let embedding = self.embedder.embed(&parsed.text).await?;
            let id = format!("{}-{}", document_name, parsed.chunk_index);
            let metadata = ChunkMetadata {
                filename: document_name.to_string(),
                chunk_index: parsed.chunk_index,
                page_number: parsed.page_number,
            };
            self.store
                .add_chunk(NewChunk {
                    id: &id,
                    text: &parsed.text,
                    embedding: &embedding,
                    metadata: Some(&metadata),
                })
                .await?;
        }

        tracing::info!(document = %document_name, chunks = chunks.len(), "Document ingested");
        Ok(chunks.len())
    }

    /// Embeds `question` and returns the ranked chunks.
    ///
    /// An empty store short-circuits to an empty result list without calling
    /// the embedder; presenting a "no document loaded" message is the
    /// caller's job.
    pub async fn retrieve(
        &self,
        question: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let total = self.store.count().await?;
        if total == 0 {
            tracing::warn!("Retrieve called against an empty chunk store");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(question).await?;
        tracing::debug!(total, dim = query_embedding.len(), "Question embedded");
        self.search.search(&query_embedding, opts).await
    }

    pub async fn clear(&self) -> Result<u64> {
        self.store.clear().await
    }

    pub async fn chunk_count(&self) -> Result<i64> {
        self.store.count().await
    }
}

/// Joins result texts into a context block for the caller's prompt,
/// optionally tagging each with its source page.
pub fn build_context(results: &[SearchResult], with_citations: bool) -> String {
    if with_citations {
        results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let page = result
                    .chunk
                    .metadata
                    .as_ref()
                    .map(|m| m.page_number.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                format!("[Source {} - Page {}]\n{}", i + 1, page, result.chunk.text)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    } else {
        results
            .iter()
            .map(|result| result.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::types::Chunk;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Deterministic embedder: looks up fixed vectors by text.
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        fallback: Vec<f32>,
    }

    impl StubEmbedder {
        fn new(pairs: &[(&str, &[f32])], fallback: &[f32]) -> Self {
            Self {
                vectors: pairs
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                    .collect(),
                fallback: fallback.to_vec(),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()))
        }

        fn dim(&self) -> usize {
            self.fallback.len()
        }
    }

    async fn open_engine(embedder: StubEmbedder) -> (tempfile::TempDir, RetrievalEngine) {
        let dir = tempdir().unwrap();
        let config = StoreConfig::at(dir.path().join("chunks.sqlite"));
        let store = Arc::new(ChunkStore::open(&config).await.unwrap());
        let engine = RetrievalEngine::new(store, Box::new(embedder));
        (dir, engine)
    }

    fn parsed(text: &str, chunk_index: i64, page_number: i64) -> ParsedChunk {
        ParsedChunk {
            text: text.to_string(),
            chunk_index,
            page_number,
        }
    }

    #[tokio::test]
    async fn ingest_derives_ids_and_metadata() {
        let embedder = StubEmbedder::new(&[], &[0.1, 0.2]);
        let (_dir, engine) = open_engine(embedder).await;

        let inserted = engine
            .ingest(
                "report.pdf",
                &[parsed("first chunk", 0, 1), parsed("second chunk", 1, 3)],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(engine.chunk_count().await.unwrap(), 2);

        let mut chunks = engine.store.scan_all().await.unwrap();
        chunks.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(chunks[0].id, "report.pdf-0");
        assert_eq!(chunks[1].id, "report.pdf-1");
        let metadata = chunks[1].metadata.as_ref().unwrap();
        assert_eq!(metadata.filename, "report.pdf");
        assert_eq!(metadata.chunk_index, 1);
        assert_eq!(metadata.page_number, 3);
    }

    #[tokio::test]
    async fn ingest_rejects_empty_document_name() {
        let embedder = StubEmbedder::new(&[], &[0.1]);
        let (_dir, engine) = open_engine(embedder).await;

        let err = engine.ingest("  ", &[parsed("text", 0, 1)]).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Validation(_)));
        assert_eq!(engine.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reingest_without_clear_hits_duplicate_ids() {
        let embedder = StubEmbedder::new(&[], &[0.1]);
        let (_dir, engine) = open_engine(embedder).await;

        let chunks = [parsed("text", 0, 1)];
        engine.ingest("doc.pdf", &chunks).await.unwrap();
        let err = engine.ingest("doc.pdf", &chunks).await.unwrap_err();
        assert!(matches!(err, RetrievalError::DuplicateChunk { .. }));
    }

    #[tokio::test]
    async fn retrieve_ranks_ingested_chunks() {
        let embedder = StubEmbedder::new(
            &[
                ("alpha section", &[1.0, 0.0]),
                ("beta section", &[0.0, 1.0]),
                ("mixed section", &[0.7, 0.7]),
                ("what is alpha?", &[1.0, 0.0]),
            ],
            &[0.0, 0.0],
        );
        let (_dir, engine) = open_engine(embedder).await;

        engine
            .ingest(
                "notes.pdf",
                &[
                    parsed("alpha section", 0, 1),
                    parsed("beta section", 1, 2),
                    parsed("mixed section", 2, 2),
                ],
            )
            .await
            .unwrap();

        let opts = SearchOptions {
            top_k: 2,
            ..Default::default()
        };
        let results = engine.retrieve("what is alpha?", &opts).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "notes.pdf-0");
        assert_eq!(results[1].chunk.id, "notes.pdf-2");
    }

    #[tokio::test]
    async fn retrieve_on_empty_store_returns_empty() {
        let embedder = StubEmbedder::new(&[], &[0.1]);
        let (_dir, engine) = open_engine(embedder).await;

        let results = engine
            .retrieve("anything", &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let embedder = StubEmbedder::new(&[], &[0.1]);
        let (_dir, engine) = open_engine(embedder).await;

        let chunks: Vec<ParsedChunk> = (0..5).map(|i| parsed("text", i, 1)).collect();
        engine.ingest("doc.pdf", &chunks).await.unwrap();
        assert_eq!(engine.chunk_count().await.unwrap(), 5);

        engine.clear().await.unwrap();
        assert_eq!(engine.chunk_count().await.unwrap(), 0);

        let results = engine
            .retrieve("anything", &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn context_builder_with_and_without_citations() {
        let result = |id: &str, text: &str, page: i64| SearchResult {
            chunk: Chunk {
                id: id.to_string(),
                text: text.to_string(),
                embedding: vec![0.0],
                metadata: Some(ChunkMetadata {
                    filename: "doc.pdf".to_string(),
                    chunk_index: 0,
                    page_number: page,
                }),
            },
            score: 1.0,
        };
        let results = vec![result("a", "first passage", 2), result("b", "second passage", 7)];

        assert_eq!(
            build_context(&results, false),
            "first passage\n\nsecond passage"
        );
        assert_eq!(
            build_context(&results, true),
            "[Source 1 - Page 2]\nfirst passage\n\n[Source 2 - Page 7]\nsecond passage"
        );

        let mut bare = results.clone();
        bare[0].chunk.metadata = None;
        assert!(build_context(&bare, true).starts_with("[Source 1 - Page unknown]"));
    }
}
