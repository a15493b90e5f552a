//! # htsline-inference
//!
//! Embedding and generation backend abstraction for htsline.
//!
//! This crate provides:
//! - Ollama-compatible embedding backend (query embeddings for the
//!   classification matcher)
//! - OpenAI-compatible generation backend (the knowledge service behind the
//!   surcharge lookups)
//! - Deterministic mock backends for testing (feature `mock`)
//!
//! Both backends are configured from the environment; see
//! [`OllamaBackend::from_env`] and [`OpenAIBackend::from_env`].

pub mod ollama;
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use ollama::OllamaBackend;
pub use openai::{OpenAIBackend, OpenAIConfig};
