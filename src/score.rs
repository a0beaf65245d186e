//! Pure relevance scoring: cosine similarity, a BM25-style keyword score
//! computed over the current corpus snapshot, and the fixed hybrid blend.

use crate::types::Chunk;

/// BM25 term-frequency saturation.
pub const BM25_K1: f64 = 1.5;
/// BM25 length-normalization strength.
pub const BM25_B: f64 = 0.75;

/// Fixed hybrid blend: 0.7 semantic + 0.3 keyword.
pub const HYBRID_SEMANTIC_WEIGHT: f64 = 0.7;
pub const HYBRID_KEYWORD_WEIGHT: f64 = 0.3;

/// Cosine similarity between two embedding vectors.
///
/// A zero-magnitude (or empty) vector on either side scores 0.0 rather than
/// dividing by zero. Matching dimensionality is a caller invariant; the dot
/// product runs over the common prefix if it is violated.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let mag_a = magnitude(a);
    let mag_b = magnitude(b);
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

fn magnitude(values: &[f32]) -> f64 {
    values
        .iter()
        .map(|v| f64::from(*v) * f64::from(*v))
        .sum::<f64>()
        .sqrt()
}

/// BM25-style keyword score of `document` against `query`, in [0, 1].
///
/// Document frequency and average document length are recomputed from the
/// full corpus on every call; there is no inverted index. That is O(N * Q)
/// per query, which is fine for the few hundred chunks a single document
/// produces.
///
/// Term frequency matches exact lowercase tokens while document frequency
/// counts chunks containing the term as a lowercase substring. The asymmetry
/// is kept as observed behavior because evening it out reshuffles rankings.
///
/// The summed term score is divided by the query token count, then clamped
/// to a maximum of 1.
pub fn keyword_score(query: &str, document: &str, corpus: &[Chunk]) -> f64 {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || corpus.is_empty() {
        return 0.0;
    }

    let doc_tokens = tokenize(document);
    let doc_len = doc_tokens.len() as f64;

    let total_len: usize = corpus
        .iter()
        .map(|chunk| chunk.text.split_whitespace().count())
        .sum();
    let avg_doc_len = total_len as f64 / corpus.len() as f64;
    let n = corpus.len() as f64;

    let mut score = 0.0;
    for term in &query_tokens {
        let tf = doc_tokens.iter().filter(|token| *token == term).count() as f64;
        if tf == 0.0 {
            continue;
        }

        let df = corpus
            .iter()
            .filter(|chunk| chunk.text.to_lowercase().contains(term.as_str()))
            .count() as f64;

        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
        let numerator = tf * (BM25_K1 + 1.0);
        let denominator = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * (doc_len / avg_doc_len));
        score += idf * (numerator / denominator);
    }

    (score / query_tokens.len() as f64).min(1.0)
}

/// Blends the two score components with the fixed weights.
pub fn hybrid_score(semantic: f64, keyword: f64) -> f64 {
    HYBRID_SEMANTIC_WEIGHT * semantic + HYBRID_KEYWORD_WEIGHT * keyword
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
