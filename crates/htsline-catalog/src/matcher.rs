//! Semantic matching of product descriptions to classification codes.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use htsline_core::{EmbeddingBackend, Error, MatchCandidate, Result, Vector};

use crate::catalog::Catalog;
use crate::rate_text::extract_rate;

/// Ranks catalog records against a free-text product description by cosine
/// similarity of embeddings.
///
/// The scan is a single linear pass over the catalog (low thousands of
/// records); no index structure is maintained. Ties keep catalog iteration
/// order, which matches the schedule order of the catalog build.
pub struct SemanticMatcher {
    catalog: Arc<Catalog>,
    embedder: Arc<dyn EmbeddingBackend>,
}

impl SemanticMatcher {
    pub fn new(catalog: Arc<Catalog>, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self { catalog, embedder }
    }

    /// Name of the embedding model serving query embeddings.
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Rank catalog records for `query`, returning at most `top_n`
    /// candidates in descending similarity order.
    ///
    /// An empty catalog yields an empty result, never an error. A query
    /// embedding whose dimension disagrees with the catalog is a
    /// configuration error: the serving embedding model does not match the
    /// model the catalog was built with.
    #[instrument(skip(self), fields(subsystem = "catalog", component = "matcher", op = "search"))]
    pub async fn search(&self, query: &str, top_n: usize) -> Result<Vec<MatchCandidate>> {
        if self.catalog.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let embeddings = self.embedder.embed_texts(&[query.to_string()]).await?;
        let query_vec = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Backend returned no embedding for query".into()))?;

        if query_vec.len() != self.catalog.dimension() {
            return Err(Error::Config(format!(
                "Query embedding dimension {} does not match catalog dimension {}; \
                 embedding model {} is incompatible with this catalog",
                query_vec.len(),
                self.catalog.dimension(),
                self.embedder.model_name()
            )));
        }

        let mut scored: Vec<MatchCandidate> = self
            .catalog
            .iter()
            .map(|record| MatchCandidate {
                hs_code: record.htsno.clone(),
                description: record.description.clone(),
                general_rate: extract_rate(&record.general),
                similarity_score: cosine_similarity(&query_vec, &record.embedding),
            })
            .collect();

        // Stable sort: equal scores keep catalog order.
        scored.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(top_n);

        debug!(
            result_count = scored.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Classification search complete"
        );
        Ok(scored)
    }
}

/// Cosine similarity between two equal-length vectors.
///
/// Zero-norm vectors score 0.0 rather than dividing by zero.
fn cosine_similarity(a: &Vector, b: &Vector) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
