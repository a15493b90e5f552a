//! Core traits for htsline abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{RateQuote, Vector};

// =============================================================================
// INFERENCE BACKENDS
// =============================================================================

/// Backend for generating text embeddings.
///
/// The catalog fixes the embedding model at build time; implementations must
/// produce vectors of a stable `dimension()` so the matcher can reject
/// incompatible query embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// RATE SOURCES
// =============================================================================

/// One externally-sourced tariff-rate signal.
///
/// Implementations perform whatever lookup they need (document search, LLM
/// query) and report a [`RateQuote`]. A lookup that completes but finds no
/// applicable rate returns `Ok` with rate 0; only transport failures and
/// contract violations are `Err`. The aggregator absorbs those errors into
/// zero-contribution provenance entries, so a source failure never fails an
/// aggregation run.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Stable identifier for logging ("section_301", "ieepa", "reciprocal").
    fn name(&self) -> &str;

    /// Human-readable label used in provenance entries.
    fn display_name(&self) -> &str;

    /// Look up the rate this source contributes for the given code.
    async fn lookup(&self, hs_code: &str, description: &str) -> Result<RateQuote>;
}
