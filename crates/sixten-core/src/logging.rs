//! Structured logging schema and field name constants for sixten.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "triage"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "anthropic", "jina", "pool", "intake"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "analyze", "fetch", "create_link", "transition"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Link UUID being operated on.
pub const LINK_ID: &str = "link_id";

/// Owner the operation is scoped to.
pub const OWNER: &str = "owner";

/// Intake path taken ("url", "url_stub", "url_text", "image", "image_manual").
pub const INTAKE_KIND: &str = "intake_kind";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows or items returned.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for analysis.
pub const MODEL: &str = "model";

/// Upstream HTTP status.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Symbolic error code when an operation fails.
pub const ERROR_CODE: &str = "error_code";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Every field name in the schema.
pub const FIELDS: &[&str] = &[
    SUBSYSTEM,
    COMPONENT,
    OPERATION,
    LINK_ID,
    OWNER,
    INTAKE_KIND,
    DURATION_MS,
    RESULT_COUNT,
    RESPONSE_LEN,
    POOL_SIZE,
    POOL_IDLE,
    MODEL,
    STATUS,
    SUCCESS,
    ERROR_CODE,
    ERROR_MSG,
];
