//! Structured logging schema and field name constants for htsline.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (e.g. a rate source absorbed as failed) |
//! | INFO  | Lifecycle events (startup, catalog load), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (catalog scan hits) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → lookup sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "catalog", "rates", "duty", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "matcher", "aggregator", "remedy", "surcharge", "ollama"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "aggregate", "lookup", "embed_texts", "compute_duty"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// HTS classification code being operated on.
pub const HTS_CODE: &str = "hts_code";

/// Product description or search query text.
pub const QUERY: &str = "query";

/// Country of origin on the entry.
pub const COUNTRY: &str = "country";

/// Rate source name ("section_301", "ieepa", "reciprocal").
pub const SOURCE: &str = "source";

/// Rate contributed by a source, in percentage points.
pub const RATE: &str = "rate";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or lookup.
pub const RESULT_COUNT: &str = "result_count";

/// Number of input texts sent to an embedding model.
pub const INPUT_COUNT: &str = "input_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
