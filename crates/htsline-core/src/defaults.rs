//! Centralized default constants for the htsline system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name. Must match the model the catalog was built
/// with; override via `OLLAMA_EMBED_MODEL` for catalogs built differently.
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default embedding vector dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// GENERATION
// =============================================================================

/// Default OpenAI-compatible API endpoint for the surcharge lookups.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model for the surcharge lookups. A model with live
/// web-search grounding is strongly recommended; surcharge rates change by
/// executive action.
pub const GEN_MODEL: &str = "gpt-4.1";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// CLASSIFICATION SEARCH
// =============================================================================

/// Default number of classification candidates returned per search.
pub const SEARCH_TOP_N: usize = 10;

// =============================================================================
// RATE AGGREGATION
// =============================================================================

/// The only country of origin supported for rate aggregation.
pub const SUPPORTED_COUNTRY: &str = "CN";

/// Trade-remedy (Section 301) investigation document search endpoint.
pub const REMEDY_SEARCH_URL: &str =
    "https://ustr.gov/issue-areas/enforcement/section-301-investigations/search";

/// Timeout for trade-remedy search requests (seconds).
pub const REMEDY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// ENTRY FEES (19 CFR 24 statutory values)
// =============================================================================

/// Merchandise Processing Fee ad-valorem rate (0.3464% of entered value).
pub const MPF_RATE: f64 = 0.003464;

/// Merchandise Processing Fee statutory floor (USD).
pub const MPF_MIN: f64 = 29.66;

/// Merchandise Processing Fee statutory ceiling (USD).
pub const MPF_MAX: f64 = 575.16;

/// Harbor Maintenance Fee ad-valorem rate (0.125% of entered value).
pub const HMF_RATE: f64 = 0.00125;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 5001;

/// Default catalog file path, relative to the working directory.
pub const CATALOG_PATH: &str = "data/hts_catalog.jsonl";
