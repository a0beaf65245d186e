//! Seam for the external embedding collaborator.

use async_trait::async_trait;

use crate::error::Result;

/// Produces a fixed-length vector for a span of text.
///
/// Every vector returned by one embedder instance must have `dim()` entries;
/// mixing dimensionalities within a store makes scoring meaningless.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dim(&self) -> usize;
}
