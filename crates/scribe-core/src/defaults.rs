//! Centralized default constants for scribe.
//!
//! **This module is the single source of truth** for shared default values.
//! Config structs read environment overrides and fall back to these.

// =============================================================================
// CHUNKING
// =============================================================================

/// Token count above which source text is split before summarization.
pub const CHUNK_THRESHOLD_TOKENS: usize = 10_000;

/// Maximum tokens per chunk window.
pub const CHUNK_MAX_TOKENS: usize = 10_000;

/// Tokens shared between consecutive chunk windows.
pub const CHUNK_OVERLAP_TOKENS: usize = 1_000;

/// Model whose encoding drives token counting.
pub const TOKENIZER_MODEL: &str = "gpt-4o";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible base URL.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model name.
pub const GEN_MODEL: &str = "gpt-4o";

/// Timeout for a single generation request in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// JOB PROCESSING
// =============================================================================

/// Default scheduler tick interval in milliseconds.
pub const SCHEDULER_INTERVAL_MS: u64 = 60_000;

/// Maximum wall-clock time for one job before it is failed.
pub const JOB_TIMEOUT_SECS: u64 = 300;

/// Default number of posts for count-bearing social contexts.
pub const SOCIAL_POST_COUNT: u32 = 1;

/// Upper bound on posts requested in a single job.
pub const SOCIAL_POST_COUNT_MAX: u32 = 20;

/// Scheduler event broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// COMMENT ANALYSIS
// =============================================================================

/// Maximum positive examples kept in a sentiment report.
pub const SENTIMENT_TOP_POSITIVE: usize = 3;

/// Maximum negative examples kept in a sentiment report.
pub const SENTIMENT_TOP_NEGATIVE: usize = 10;

/// Maximum ideas kept from a single comment batch.
pub const IDEAS_MAX: usize = 10;

/// Maximum ideas kept from the aggregate pass over several batches.
pub const IDEAS_AGGREGATE_MAX: usize = 20;

// =============================================================================
// YOUTUBE
// =============================================================================

/// YouTube Data API base URL.
pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube caption endpoint base URL.
pub const YOUTUBE_TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

/// Default caption language.
pub const TRANSCRIPT_LANGUAGE: &str = "en";

/// Page size for comment thread listing (API maximum).
pub const COMMENTS_PAGE_SIZE: u32 = 100;

/// Hard cap on comments fetched for one video.
pub const COMMENTS_MAX: usize = 2_000;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default page size for list endpoints.
pub const PAGE_LIMIT: i64 = 10;
