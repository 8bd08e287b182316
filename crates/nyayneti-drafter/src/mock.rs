//! Scripted drafting backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust
//! use nyayneti_drafter::mock::FakeBackend;
//! use nyayneti_core::DraftResult;
//!
//! let backend = FakeBackend::new()
//!     .with_generation(Ok(DraftResult {
//!         full_text: "...".to_string(),
//!         filename: "draft.docx".to_string(),
//!         citations: vec![],
//!         document_id: None,
//!         preview_text: None,
//!         template_type: None,
//!         generation_time: None,
//!     }));
//! assert!(backend.calls().is_empty());
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use nyayneti_core::{
    AnalyzeContextRequest, DocumentSummary, DraftResult, DraftingBackend, Error, ExtractedFields,
    GenerateDraftRequest, Result, Template,
};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    ListTemplates,
    ListDocuments,
    AnalyzeContext(AnalyzeContextRequest),
    GenerateDraft(GenerateDraftRequest),
}

#[derive(Default)]
struct Script {
    templates: Vec<Template>,
    templates_error: Option<String>,
    documents: Vec<DocumentSummary>,
    documents_error: Option<String>,
    analyses: VecDeque<Result<ExtractedFields>>,
    generations: VecDeque<Result<DraftResult>>,
    calls: Vec<FakeCall>,
}

/// Drafting backend that replays scripted responses and records calls.
///
/// Analysis and generation outcomes are consumed in order; once a queue is
/// exhausted the call fails with a request error.
#[derive(Clone, Default)]
pub struct FakeBackend {
    script: Arc<Mutex<Script>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serve this template catalog.
    pub fn with_templates(self, templates: Vec<Template>) -> Self {
        self.script().templates = templates;
        self
    }

    /// Fail template catalog requests.
    pub fn with_templates_error(self, message: impl Into<String>) -> Self {
        self.script().templates_error = Some(message.into());
        self
    }

    /// Serve this document catalog.
    pub fn with_documents(self, documents: Vec<DocumentSummary>) -> Self {
        self.script().documents = documents;
        self
    }

    /// Fail document catalog requests.
    pub fn with_documents_error(self, message: impl Into<String>) -> Self {
        self.script().documents_error = Some(message.into());
        self
    }

    /// Queue the outcome of the next context analysis.
    pub fn with_analysis(self, outcome: Result<ExtractedFields>) -> Self {
        self.script().analyses.push_back(outcome);
        self
    }

    /// Queue the outcome of the next draft generation.
    pub fn with_generation(self, outcome: Result<DraftResult>) -> Self {
        self.script().generations.push_back(outcome);
        self
    }

    /// Stop failing template catalog requests.
    pub fn clear_templates_error(&self) {
        self.script().templates_error = None;
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<FakeCall> {
        self.script().calls.clone()
    }

    pub fn analysis_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, FakeCall::AnalyzeContext(_)))
            .count()
    }

    pub fn generation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, FakeCall::GenerateDraft(_)))
            .count()
    }

    /// The most recent generation request, if any.
    pub fn last_generation_request(&self) -> Option<GenerateDraftRequest> {
        self.calls().into_iter().rev().find_map(|c| match c {
            FakeCall::GenerateDraft(request) => Some(request),
            _ => None,
        })
    }
}

#[async_trait]
impl DraftingBackend for FakeBackend {
    async fn list_templates(&self) -> Result<Vec<Template>> {
        let mut script = self.script();
        script.calls.push(FakeCall::ListTemplates);
        match &script.templates_error {
            Some(message) => Err(Error::Request(message.clone())),
            None => Ok(script.templates.clone()),
        }
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let mut script = self.script();
        script.calls.push(FakeCall::ListDocuments);
        match &script.documents_error {
            Some(message) => Err(Error::Request(message.clone())),
            None => Ok(script.documents.clone()),
        }
    }

    async fn analyze_context(&self, request: &AnalyzeContextRequest) -> Result<ExtractedFields> {
        let mut script = self.script();
        script.calls.push(FakeCall::AnalyzeContext(request.clone()));
        script
            .analyses
            .pop_front()
            .unwrap_or_else(|| Err(Error::Request("no scripted analysis".to_string())))
    }

    async fn generate_draft(&self, request: &GenerateDraftRequest) -> Result<DraftResult> {
        let mut script = self.script();
        script.calls.push(FakeCall::GenerateDraft(request.clone()));
        script
            .generations
            .pop_front()
            .unwrap_or_else(|| Err(Error::Request("no scripted generation".to_string())))
    }

    fn download_url(&self, filename: &str) -> String {
        format!("fake://download/{}", filename)
    }
}
