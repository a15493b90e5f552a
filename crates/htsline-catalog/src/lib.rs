//! # htsline-catalog
//!
//! The HTS classification catalog and the semantic matcher over it.
//!
//! This crate provides:
//! - JSONL catalog loading into an immutable in-memory [`Catalog`]
//! - Statutory rate-text parsing ([`extract_rate`])
//! - Cosine-similarity ranking of catalog records for free-text product
//!   descriptions ([`SemanticMatcher`])
//!
//! The catalog is loaded once at process start and shared read-only; no
//! synchronization is needed for concurrent readers.

pub mod catalog;
pub mod matcher;
pub mod rate_text;

pub use catalog::Catalog;
pub use matcher::SemanticMatcher;
pub use rate_text::extract_rate;
