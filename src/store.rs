//! SQLite-backed chunk store.
//!
//! One `chunks` table keyed by chunk id, embeddings stored as little-endian
//! f32 BLOBs, metadata as JSON. WAL mode plus a single pool gives every scan
//! a consistent snapshot and serializes `clear` against concurrent writes.

use std::{str::FromStr, time::Duration};

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Sqlite};

use crate::config::StoreConfig;
use crate::error::{Result, RetrievalError};
use crate::types::{Chunk, ChunkMetadata, NewChunk};

pub type DbPool = Pool<Sqlite>;

pub static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug)]
pub struct ChunkStore {
    pool: DbPool,
}

#[derive(FromRow)]
struct ChunkRow {
    id: String,
    text: String,
    embedding: Vec<u8>,
    metadata: Option<Json<ChunkMetadata>>,
}

impl From<ChunkRow> for Chunk {
    fn from(row: ChunkRow) -> Self {
        Chunk {
            id: row.id,
            text: row.text,
            embedding: decode_embedding(&row.embedding),
            metadata: row.metadata.map(|json| json.0),
        }
    }
}

impl ChunkStore {
    /// Opens (or creates) the backing database and runs migrations.
    ///
    /// Idempotent: an existing database is reused as-is, not recreated.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let db_url = format!("sqlite://{}", config.db_path);

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        tracing::debug!(db_path = %config.db_path, "Chunk store opened");
        Ok(Self { pool })
    }

    /// Inserts one chunk. A second insert under the same id fails with
    /// [`RetrievalError::DuplicateChunk`]; chunks are never overwritten.
    pub async fn add_chunk(&self, chunk: NewChunk<'_>) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO chunks (id, text, embedding, metadata) VALUES (?, ?, ?, ?)",
        )
        .bind(chunk.id)
        .bind(chunk.text)
        .bind(encode_embedding(chunk.embedding))
        .bind(chunk.metadata.map(Json))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(id = %chunk.id, dim = chunk.embedding.len(), "Chunk stored");
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(RetrievalError::DuplicateChunk {
                    id: chunk.id.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Removes all chunks. A no-op on an empty store.
    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chunks").execute(&self.pool).await?;
        let removed = result.rows_affected();
        tracing::debug!(removed, "Chunk store cleared");
        Ok(removed)
    }

    /// Snapshot of every stored chunk. Row order is storage-native; callers
    /// must not rely on it.
    pub async fn scan_all(&self) -> Result<Vec<Chunk>> {
        let rows = sqlx::query_as::<_, ChunkRow>(
            "SELECT id, text, embedding, metadata FROM chunks",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Chunk::from).collect())
    }
}

fn encode_embedding(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
