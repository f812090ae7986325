//! Structured logging field name constants.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query by the same keys across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Infrastructure failure, requires operator attention |
//! | WARN  | Job failed on bad input or unusable model output |
//! | INFO  | Lifecycle events (startup, shutdown), job completions |
//! | DEBUG | Decision points, chunking choices, idle ticks |
//! | TRACE | Per-chunk and per-page iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "jobs"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "scheduler", "chunker", "blog", "youtube_comments"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "tick", "claim", "condense", "ingest"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Job UUID being processed.
pub const JOB_ID: &str = "job_id";

/// Job context being processed.
pub const CONTEXT: &str = "context";

/// Content source UUID.
pub const CONTENT_ID: &str = "content_id";

/// Owning user identifier.
pub const USER_ID: &str = "user_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Token count of a text.
pub const TOKEN_COUNT: &str = "token_count";

/// Number of chunks processed.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of comments processed.
pub const COMMENT_COUNT: &str = "comment_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Error classification ("infrastructure", "transformation", "ingestion").
pub const ERROR_KIND: &str = "error_kind";
