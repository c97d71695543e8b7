//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_RULE_ID: &str = "rule_id";
pub const FIELD_FILE: &str = "file";
pub const FIELD_LINE: &str = "line";

// Collection sizes
pub const FIELD_FINDING_COUNT: &str = "finding_count";
pub const FIELD_RULE_COUNT: &str = "rule_count";
pub const FIELD_ANNOTATION_COUNT: &str = "annotation_count";
pub const FIELD_IGNORED_COUNT: &str = "ignored_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
