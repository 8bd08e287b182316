//! Centralized default constants for the drafting client.
//!
//! All crates and the CLI reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// BACKEND
// =============================================================================

/// Default backend base URL (local Flask service).
pub const API_URL: &str = "http://127.0.0.1:5000";

/// Timeout for catalog and health requests (seconds).
pub const TIMEOUT_SECS: u64 = 30;

/// Timeout for context analysis requests (seconds). OCR plus extraction is slow.
pub const ANALYZE_TIMEOUT_SECS: u64 = 120;

/// Timeout for draft generation requests (seconds).
pub const GENERATE_TIMEOUT_SECS: u64 = 300;

/// Timeout for the health probe (seconds).
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// ENDPOINTS
// =============================================================================

pub const TEMPLATES_PATH: &str = "/api/drafter/templates";
pub const DOCUMENTS_PATH: &str = "/api/documents";
pub const ANALYZE_CONTEXT_PATH: &str = "/api/drafter/analyze-context";
pub const GENERATE_PATH: &str = "/api/drafter/generate";
pub const DOWNLOAD_PATH: &str = "/api/drafter/download";
pub const HEALTH_PATH: &str = "/api/health";

// =============================================================================
// WORKFLOW
// =============================================================================

/// Minimum number of populated fields before generation is allowed.
pub const MIN_POPULATED_FIELDS: usize = 2;

/// Values the analyzer emits when a field could not be extracted.
pub const NOT_FOUND_SENTINELS: &[&str] = &["NOT_FOUND", "Unknown"];

/// Advisory shown when context analysis fails.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Context analysis failed. Please fill in the fields manually.";

/// Standing message shown when the template catalog cannot be loaded.
pub const CATALOG_FAILED_MESSAGE: &str =
    "Failed to load document templates. Check that the backend is running and reload.";

/// Event bus capacity for workflow events.
pub const EVENT_BUS_CAPACITY: usize = 64;

/// Whether generation asks the backend to enhance the draft with the LLM.
pub const ENHANCE_WITH_LLM: bool = true;
