//! Mock inference backends for deterministic testing.
//!
//! No randomness: embeddings are derived from the input text with a stable
//! hash, failures are injected explicitly with `with_failure`.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use htsline_core::{EmbeddingBackend, Error, GenerationBackend, Result, Vector};

// =============================================================================
// EMBEDDING MOCK
// =============================================================================

/// Mock embedding backend producing deterministic vectors.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    overrides: HashMap<String, Vector>,
    failure: Option<String>,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MockEmbeddingBackend {
    /// Create a mock backend producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            overrides: HashMap::new(),
            failure: None,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pin the vector returned for a specific input text.
    pub fn with_vector_for(mut self, text: impl Into<String>, vector: Vector) -> Self {
        self.overrides.insert(text.into(), vector);
        self
    }

    /// Make every call fail with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// All inputs this backend was asked to embed, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    /// Derive a stable pseudo-embedding from text bytes.
    fn derive_vector(&self, text: &str) -> Vector {
        (0..self.dimension)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                i.hash(&mut hasher);
                // Map the hash into [-1.0, 1.0].
                (hasher.finish() % 2000) as f32 / 1000.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        for text in texts {
            self.call_log.lock().unwrap().push(text.clone());
        }

        if let Some(ref message) = self.failure {
            return Err(Error::Embedding(message.clone()));
        }

        Ok(texts
            .iter()
            .map(|text| {
                self.overrides
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.derive_vector(text))
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

// =============================================================================
// GENERATION MOCK
// =============================================================================

/// Mock generation backend with canned responses.
#[derive(Clone)]
pub struct MockGenerationBackend {
    default_response: String,
    responses: Vec<(String, String)>,
    failure: Option<String>,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MockGenerationBackend {
    /// Create a mock backend answering every prompt with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Vec::new(),
            failure: None,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer prompts containing `needle` with `response` instead of the
    /// default. First matching needle wins.
    pub fn with_response_for(
        mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.responses.push((needle.into(), response.into()));
        self
    }

    /// Make every call fail with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// All prompts this backend received, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(prompt.to_string());

        if let Some(ref message) = self.failure {
            return Err(Error::Inference(message.clone()));
        }

        for (needle, response) in &self.responses {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-gen"
    }
}
