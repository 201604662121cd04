use crate::error::BackendError;
use crate::models::ScoredChunk;
use crate::traits::Embedder;
use std::sync::Arc;

struct IndexEntry {
    text: String,
    vector: Vec<f32>,
}

/// In-memory nearest-neighbor index over chunk embeddings.
///
/// Built once per upload with a single batched embedding call and replaced
/// wholesale by the next upload; there is no incremental update path. An
/// index built from zero chunks is empty and misses every query — rejecting
/// that case is the upload pipeline's job, not this type's.
pub struct ChunkIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<IndexEntry>,
}

impl ChunkIndex {
    pub async fn from_texts(
        chunks: Vec<String>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, BackendError> {
        let vectors = embedder.embed(&chunks).await?;

        if vectors.len() != chunks.len() {
            return Err(BackendError::BackendResponse {
                backend: embedder.model().to_string(),
                details: format!(
                    "{} embeddings returned for {} chunks",
                    vectors.len(),
                    chunks.len()
                ),
            });
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| IndexEntry { text, vector })
            .collect();

        Ok(Self { embedder, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embeds the query and returns at most `top_k` chunks ordered by
    /// non-increasing cosine similarity.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>, BackendError> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let vectors = self.embedder.embed(&[query.to_string()]).await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::BackendResponse {
                backend: self.embedder.model().to_string(),
                details: "no embedding returned for the query".to_string(),
            })?;

        let mut hits: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                text: entry.text.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
            })
            .collect();

        hits.sort_by(|left, right| right.score.total_cmp(&left.score));
        hits.truncate(top_k);
        Ok(hits)
    }
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut left_sq = 0.0f32;
    let mut right_sq = 0.0f32;
    for (a, b) in left.iter().zip(right) {
        dot += a * b;
        left_sq += a * a;
        right_sq += b * b;
    }

    let magnitude = left_sq.sqrt() * right_sq.sqrt();
    if magnitude == 0.0 {
        return 0.0;
    }

    dot / magnitude
}
