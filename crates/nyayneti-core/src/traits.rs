//! Core traits for the drafting client.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// DRAFTING BACKEND
// =============================================================================

/// Every remote operation the drafting workflow depends on.
///
/// The HTTP client implements this against the backend REST API; tests use a
/// scripted fake.
#[async_trait]
pub trait DraftingBackend: Send + Sync {
    /// Fetch the template catalog in display order.
    async fn list_templates(&self) -> Result<Vec<Template>>;

    /// Fetch the documents available as drafting context.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>>;

    /// Extract field values for `template_type` from a context document.
    ///
    /// A response with `success: false` is returned as an error.
    async fn analyze_context(&self, request: &AnalyzeContextRequest) -> Result<ExtractedFields>;

    /// Generate a draft from filled fields.
    async fn generate_draft(&self, request: &GenerateDraftRequest) -> Result<DraftResult>;

    /// Reference from which a generated artifact can be downloaded.
    ///
    /// Only constructs the reference; nothing is fetched.
    fn download_url(&self, filename: &str) -> String;
}
