//! The document drafting workflow controller.
//!
//! [`DraftingWorkflow`] owns the step state machine, the collected form data
//! and the coordination of the backend calls. It is a plain `&mut self` state
//! machine: callers drive it from a single task.
//!
//! Analysis and generation are exposed twice:
//! - `begin_*` / `complete_*` for event-loop front ends that perform the
//!   backend call themselves and feed the outcome back later;
//! - [`DraftingWorkflow::select_context`] and [`DraftingWorkflow::generate`],
//!   which do both halves in one call.
//!
//! Completions carry the [`RequestToken`] issued by `begin_*`; a completion
//! for a superseded request is dropped.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use nyayneti_core::{
    defaults, AnalyzeContextRequest, DocumentSummary, DraftResult, DraftingBackend, EventBus,
    EventEnvelope, ExtractedFields, FormData, GenerateDraftRequest, Template, TemplateField,
    WorkflowEvent,
};

use crate::error::WorkflowError;
use crate::merge::merge_extracted;
use crate::step::WorkflowStep;
use crate::token::{Operation, RequestToken, TokenIssuer};

/// Result type for guarded workflow actions.
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// Issued context analysis awaiting its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub token: RequestToken,
    pub request: AnalyzeContextRequest,
}

/// Issued draft generation awaiting its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub token: RequestToken,
    pub request: GenerateDraftRequest,
}

/// What happened to a completed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was applied to the workflow state.
    Applied,
    /// The request had been superseded; state is unchanged.
    Stale,
}

/// Drafting workflow state.
pub struct DraftingWorkflow {
    backend: Arc<dyn DraftingBackend>,
    events: EventBus,
    tokens: TokenIssuer,

    step: WorkflowStep,
    templates: Vec<Template>,
    documents: Vec<DocumentSummary>,
    selected_template: Option<Template>,
    context_doc_id: Option<String>,
    form_data: FormData,
    result: Option<DraftResult>,
    /// Advisory or retryable message from the current step.
    error: Option<String>,
    /// Standing message while the template catalog is unavailable.
    catalog_error: Option<String>,
}

impl DraftingWorkflow {
    /// Create a workflow with empty catalogs. Call [`Self::load_catalogs`] next.
    pub fn new(backend: Arc<dyn DraftingBackend>) -> Self {
        Self::with_event_bus(backend, EventBus::default())
    }

    /// Create a workflow that publishes to an existing event bus.
    pub fn with_event_bus(backend: Arc<dyn DraftingBackend>, events: EventBus) -> Self {
        Self {
            backend,
            events,
            tokens: TokenIssuer::default(),
            step: WorkflowStep::SelectTemplate,
            templates: Vec::new(),
            documents: Vec::new(),
            selected_template: None,
            context_doc_id: None,
            form_data: FormData::new(),
            result: None,
            error: None,
            catalog_error: None,
        }
    }

    /// Create a workflow and load both catalogs.
    pub async fn start(backend: Arc<dyn DraftingBackend>) -> Self {
        let mut workflow = Self::new(backend);
        workflow.load_catalogs().await;
        workflow
    }

    /// Fetch the template and document catalogs concurrently.
    ///
    /// A template failure leaves a standing error and blocks template
    /// selection. A document failure only leaves the document list empty.
    #[instrument(skip(self), fields(subsystem = "drafter", component = "workflow", op = "load_catalogs"))]
    pub async fn load_catalogs(&mut self) {
        let (templates, documents) =
            tokio::join!(self.backend.list_templates(), self.backend.list_documents());

        match templates {
            Ok(templates) => {
                self.templates = templates;
                self.catalog_error = None;
            }
            Err(e) => {
                error!(error = %e, "Failed to load template catalog");
                self.templates.clear();
                self.catalog_error = Some(defaults::CATALOG_FAILED_MESSAGE.to_string());
            }
        }

        match documents {
            Ok(documents) => self.documents = documents,
            Err(e) => {
                warn!(error = %e, "Failed to load document catalog, continuing without context documents");
                self.documents.clear();
            }
        }

        info!(
            templates = self.templates.len(),
            documents = self.documents.len(),
            "Drafting workflow ready"
        );
        self.events.emit(WorkflowEvent::CatalogLoaded {
            templates: self.templates.len(),
            documents: self.documents.len(),
            error: self.catalog_error.clone(),
        });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    pub fn selected_template(&self) -> Option<&Template> {
        self.selected_template.as_ref()
    }

    pub fn context_doc_id(&self) -> Option<&str> {
        self.context_doc_id.as_deref()
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn result(&self) -> Option<&DraftResult> {
        self.result.as_ref()
    }

    /// Message to show the user, if any. Step errors take precedence over the
    /// standing catalog error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or(self.catalog_error.as_deref())
    }

    pub fn is_analyzing(&self) -> bool {
        self.step == WorkflowStep::Analyzing
    }

    pub fn is_generating(&self) -> bool {
        self.step == WorkflowStep::Generating
    }

    /// Fields of the selected template, in render order.
    pub fn fields(&self) -> &[TemplateField] {
        self.selected_template
            .as_ref()
            .map(|t| t.fields.as_slice())
            .unwrap_or(&[])
    }

    /// Required fields that are still empty. Advisory only.
    pub fn missing_required_fields(&self) -> Vec<&TemplateField> {
        self.fields()
            .iter()
            .filter(|f| f.required && !self.form_data.contains(&f.name))
            .collect()
    }

    /// Whether a generation request would currently be accepted.
    pub fn can_generate(&self) -> bool {
        self.step == WorkflowStep::FillFields
            && self.form_data.len() >= defaults::MIN_POPULATED_FIELDS
    }

    /// Download reference for the generated draft.
    pub fn download_url(&self) -> Option<String> {
        self.result
            .as_ref()
            .map(|r| self.backend.download_url(&r.filename))
    }

    /// Subscribe to workflow events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    fn template_id(&self) -> String {
        self.selected_template
            .as_ref()
            .map(|t| t.id.clone())
            .unwrap_or_default()
    }

    fn transition(&mut self, to: WorkflowStep) {
        debug!(from = %self.step, to = %to, "Workflow transition");
        self.step = to;
    }

    // ========================================================================
    // Template selection
    // ========================================================================

    /// Pick a template and move on to context selection.
    pub fn select_template(&mut self, template_id: &str) -> WorkflowResult<&Template> {
        if self.step != WorkflowStep::SelectTemplate {
            return Err(WorkflowError::InvalidTransition {
                step: self.step,
                action: "select a template",
            });
        }
        if self.catalog_error.is_some() {
            return Err(WorkflowError::CatalogUnavailable);
        }

        let template = self
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownTemplate(template_id.to_string()))?;

        self.events.emit(WorkflowEvent::TemplateSelected {
            template_id: template.id.clone(),
            fields: template.fields.len(),
        });
        self.form_data.clear();
        self.result = None;
        self.error = None;
        self.transition(WorkflowStep::SelectContext);

        Ok(self.selected_template.insert(template))
    }

    // ========================================================================
    // Context selection
    // ========================================================================

    /// Skip context extraction and fill fields manually.
    pub fn skip_context(&mut self) -> WorkflowResult<()> {
        match self.step {
            WorkflowStep::SelectContext => {}
            WorkflowStep::Analyzing => return Err(WorkflowError::Busy("analysis")),
            step => {
                return Err(WorkflowError::InvalidTransition {
                    step,
                    action: "skip context selection",
                })
            }
        }

        self.error = None;
        self.transition(WorkflowStep::FillFields);
        self.events.emit(WorkflowEvent::ContextSkipped);
        Ok(())
    }

    /// Pick a context document and issue its analysis.
    pub fn begin_analysis(&mut self, doc_id: &str) -> WorkflowResult<AnalysisTicket> {
        match self.step {
            WorkflowStep::SelectContext => {}
            WorkflowStep::Analyzing => return Err(WorkflowError::Busy("analysis")),
            step => {
                return Err(WorkflowError::InvalidTransition {
                    step,
                    action: "analyze a context document",
                })
            }
        }

        let request = AnalyzeContextRequest {
            doc_id: doc_id.to_string(),
            template_type: self.template_id(),
        };
        let token = self.tokens.issue(Operation::Analysis);

        self.context_doc_id = Some(doc_id.to_string());
        self.error = None;
        self.transition(WorkflowStep::Analyzing);

        debug!(doc_id, request_token = %token, "Context analysis issued");
        self.events.emit(WorkflowEvent::AnalysisStarted {
            doc_id: doc_id.to_string(),
            token: token.value(),
        });

        Ok(AnalysisTicket { token, request })
    }

    /// Apply the outcome of a context analysis.
    ///
    /// Success merges the extracted fields; failure leaves the form untouched
    /// and sets an advisory. Either way the workflow moves to `FillFields`.
    pub fn complete_analysis(
        &mut self,
        token: RequestToken,
        outcome: nyayneti_core::Result<ExtractedFields>,
    ) -> Completion {
        if !self.tokens.redeem(Operation::Analysis, token) {
            return self.drop_stale(Operation::Analysis, token);
        }

        let doc_id = self.context_doc_id.clone().unwrap_or_default();
        match outcome {
            Ok(extracted) => {
                let merged = match &self.selected_template {
                    Some(template) => merge_extracted(&mut self.form_data, template, extracted),
                    None => 0,
                };
                info!(doc_id = %doc_id, merged, "Context analysis merged");
                self.error = None;
                self.events
                    .emit(WorkflowEvent::AnalysisCompleted { doc_id, merged });
            }
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "Context analysis failed, falling back to manual entry");
                self.error = Some(defaults::ANALYSIS_FAILED_MESSAGE.to_string());
                self.events.emit(WorkflowEvent::AnalysisFailed {
                    doc_id,
                    error: e.to_string(),
                });
            }
        }

        self.transition(WorkflowStep::FillFields);
        Completion::Applied
    }

    /// Pick a context document, analyze it and apply the outcome.
    #[instrument(skip(self), fields(subsystem = "drafter", component = "workflow", op = "select_context"))]
    pub async fn select_context(&mut self, doc_id: &str) -> WorkflowResult<Completion> {
        let ticket = self.begin_analysis(doc_id)?;
        let outcome = self.backend.analyze_context(&ticket.request).await;
        Ok(self.complete_analysis(ticket.token, outcome))
    }

    // ========================================================================
    // Field entry
    // ========================================================================

    /// Set one field of the selected template. An empty value clears it.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> WorkflowResult<()> {
        match self.step {
            WorkflowStep::FillFields => {}
            WorkflowStep::Generating => return Err(WorkflowError::Busy("generation")),
            step => {
                return Err(WorkflowError::InvalidTransition {
                    step,
                    action: "edit a field",
                })
            }
        }

        let template = self
            .selected_template
            .as_ref()
            .ok_or(WorkflowError::InvalidTransition {
                step: self.step,
                action: "edit a field",
            })?;
        if !template.has_field(name) {
            return Err(WorkflowError::UnknownField {
                template: template.id.clone(),
                field: name.to_string(),
            });
        }

        self.form_data.set(name, value);
        self.events.emit(WorkflowEvent::FieldEdited {
            field: name.to_string(),
            populated: self.form_data.len(),
        });
        Ok(())
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Issue draft generation for the current form data.
    pub fn begin_generation(&mut self) -> WorkflowResult<GenerationTicket> {
        match self.step {
            WorkflowStep::FillFields => {}
            WorkflowStep::Generating => return Err(WorkflowError::Busy("generation")),
            step => {
                return Err(WorkflowError::InvalidTransition {
                    step,
                    action: "generate a draft",
                })
            }
        }

        let populated = self.form_data.len();
        if populated < defaults::MIN_POPULATED_FIELDS {
            return Err(WorkflowError::InsufficientFields {
                populated,
                required: defaults::MIN_POPULATED_FIELDS,
            });
        }

        let request = GenerateDraftRequest {
            template_type: self.template_id(),
            user_inputs: self.form_data.clone(),
            enhance: defaults::ENHANCE_WITH_LLM,
        };
        let token = self.tokens.issue(Operation::Generation);

        self.error = None;
        self.transition(WorkflowStep::Generating);

        debug!(template_id = %request.template_type, populated, request_token = %token, "Generation issued");
        self.events.emit(WorkflowEvent::GenerationStarted {
            template_id: request.template_type.clone(),
            token: token.value(),
        });

        Ok(GenerationTicket { token, request })
    }

    /// Apply the outcome of a draft generation.
    ///
    /// Success moves to `Review`; failure returns to `FillFields` with a
    /// retryable error.
    pub fn complete_generation(
        &mut self,
        token: RequestToken,
        outcome: nyayneti_core::Result<DraftResult>,
    ) -> Completion {
        if !self.tokens.redeem(Operation::Generation, token) {
            return self.drop_stale(Operation::Generation, token);
        }

        match outcome {
            Ok(draft) => {
                info!(
                    filename = %draft.filename,
                    citations = draft.citation_count(),
                    "Draft generated"
                );
                self.events.emit(WorkflowEvent::GenerationCompleted {
                    filename: draft.filename.clone(),
                    citations: draft.citation_count(),
                });
                self.result = Some(draft);
                self.error = None;
                self.transition(WorkflowStep::Review);
            }
            Err(e) => {
                warn!(error = %e, "Draft generation failed");
                self.error = Some(format!("Failed to generate document: {}", e));
                self.events.emit(WorkflowEvent::GenerationFailed {
                    error: e.to_string(),
                });
                self.transition(WorkflowStep::FillFields);
            }
        }

        Completion::Applied
    }

    /// Generate a draft from the current form data and apply the outcome.
    #[instrument(skip(self), fields(subsystem = "drafter", component = "workflow", op = "generate"))]
    pub async fn generate(&mut self) -> WorkflowResult<Completion> {
        let ticket = self.begin_generation()?;
        let start = Instant::now();
        let outcome = self.backend.generate_draft(&ticket.request).await;
        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            success = outcome.is_ok(),
            "Generation returned"
        );
        Ok(self.complete_generation(ticket.token, outcome))
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Return to template selection from any step.
    ///
    /// In-flight requests are invalidated; their completions will be dropped.
    pub fn reset(&mut self) {
        self.tokens.invalidate_all();
        self.selected_template = None;
        self.context_doc_id = None;
        self.form_data.clear();
        self.result = None;
        self.error = None;
        self.transition(WorkflowStep::SelectTemplate);

        info!("Drafting workflow reset");
        self.events.emit(WorkflowEvent::Reset);
    }

    fn drop_stale(&mut self, op: Operation, token: RequestToken) -> Completion {
        debug!(operation = op.as_str(), request_token = %token, step = %self.step, "Dropping stale response");
        self.events.emit(WorkflowEvent::StaleResponseDropped {
            operation: op.as_str().to_string(),
            token: token.value(),
        });
        Completion::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FakeBackend, FakeCall};
    use nyayneti_core::{Error, ExtractedValue, TemplateField};

    fn field(name: &str, required: bool) -> TemplateField {
        TemplateField {
            name: name.to_string(),
            label: name.replace('_', " "),
            kind: Default::default(),
            placeholder: None,
            required,
            options: vec![],
            default: None,
        }
    }

    fn bail_application() -> Template {
        Template {
            id: "bail_application".to_string(),
            name: "Bail Application".to_string(),
            description: "Regular or anticipatory bail".to_string(),
            fields: vec![
                field("accused_name", true),
                field("court", true),
                field("fir_number", false),
            ],
        }
    }

    fn legal_notice() -> Template {
        Template {
            id: "legal_notice".to_string(),
            name: "Legal Notice".to_string(),
            description: String::new(),
            fields: vec![field("sender_name", true), field("receiver_name", true)],
        }
    }

    fn draft(filename: &str) -> DraftResult {
        DraftResult {
            full_text: "...".to_string(),
            filename: filename.to_string(),
            citations: vec![],
            document_id: None,
            preview_text: None,
            template_type: None,
            generation_time: None,
        }
    }

    fn extracted(pairs: &[(&str, &str)]) -> ExtractedFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ExtractedValue::from_wire(v)))
            .collect()
    }

    fn catalog_backend() -> FakeBackend {
        FakeBackend::new()
            .with_templates(vec![bail_application(), legal_notice()])
            .with_documents(vec![DocumentSummary {
                doc_id: "fir_123.pdf".to_string(),
                chunks: 8,
            }])
    }

    async fn workflow_with(backend: &FakeBackend) -> DraftingWorkflow {
        DraftingWorkflow::start(Arc::new(backend.clone())).await
    }

    async fn at_fill_fields(backend: &FakeBackend) -> DraftingWorkflow {
        let mut wf = workflow_with(backend).await;
        wf.select_template("bail_application").unwrap();
        wf.skip_context().unwrap();
        wf
    }

    // ==========================================================================
    // Initialization
    // ==========================================================================

    #[tokio::test]
    async fn test_start_loads_both_catalogs() {
        let backend = catalog_backend();
        let wf = workflow_with(&backend).await;

        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);
        assert_eq!(wf.templates().len(), 2);
        assert_eq!(wf.documents().len(), 1);
        assert!(wf.error().is_none());
        assert!(backend.calls().contains(&FakeCall::ListTemplates));
        assert!(backend.calls().contains(&FakeCall::ListDocuments));
    }

    #[tokio::test]
    async fn test_template_failure_blocks_workflow() {
        let backend = catalog_backend().with_templates_error("connection refused");
        let mut wf = workflow_with(&backend).await;

        assert!(wf.templates().is_empty());
        assert_eq!(wf.error(), Some(defaults::CATALOG_FAILED_MESSAGE));
        assert_eq!(
            wf.select_template("bail_application").unwrap_err(),
            WorkflowError::CatalogUnavailable
        );
        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);
    }

    #[tokio::test]
    async fn test_catalog_error_survives_reset_and_clears_on_reload() {
        let backend = catalog_backend().with_templates_error("connection refused");
        let mut wf = workflow_with(&backend).await;

        wf.reset();
        assert_eq!(wf.error(), Some(defaults::CATALOG_FAILED_MESSAGE));

        backend.clear_templates_error();
        wf.load_catalogs().await;
        assert!(wf.error().is_none());
        assert!(wf.select_template("legal_notice").is_ok());
    }

    #[tokio::test]
    async fn test_document_failure_is_silent() {
        let backend = catalog_backend().with_documents_error("timeout");
        let wf = workflow_with(&backend).await;

        assert!(wf.documents().is_empty());
        assert_eq!(wf.templates().len(), 2);
        assert!(wf.error().is_none());
    }

    // ==========================================================================
    // Template selection
    // ==========================================================================

    #[tokio::test]
    async fn test_select_template_clears_form_and_exposes_fields() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;

        let template = wf.select_template("bail_application").unwrap();
        assert_eq!(template.fields.len(), 3);
        assert_eq!(wf.step(), WorkflowStep::SelectContext);
        assert!(wf.form_data().is_empty());
        assert_eq!(wf.fields().len(), 3);
        assert!(wf.result().is_none());
    }

    #[tokio::test]
    async fn test_select_unknown_template() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;

        assert_eq!(
            wf.select_template("will").unwrap_err(),
            WorkflowError::UnknownTemplate("will".to_string())
        );
        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);
        assert!(wf.selected_template().is_none());
    }

    #[tokio::test]
    async fn test_select_template_outside_first_step() {
        let backend = catalog_backend();
        let mut wf = at_fill_fields(&backend).await;

        assert!(matches!(
            wf.select_template("legal_notice"),
            Err(WorkflowError::InvalidTransition {
                step: WorkflowStep::FillFields,
                ..
            })
        ));
        assert_eq!(wf.selected_template().unwrap().id, "bail_application");
    }

    // ==========================================================================
    // Context analysis
    // ==========================================================================

    #[tokio::test]
    async fn test_skip_context_leaves_form_empty() {
        let backend = catalog_backend();
        let wf = at_fill_fields(&backend).await;

        assert_eq!(wf.step(), WorkflowStep::FillFields);
        assert!(wf.form_data().is_empty());
        assert!(wf.context_doc_id().is_none());
        assert_eq!(backend.analysis_count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_success_merges_found_values_only() {
        let backend = catalog_backend().with_analysis(Ok(extracted(&[
            ("accused_name", "Ravi"),
            ("court", "NOT_FOUND"),
            ("fir_number", ""),
            ("police_station", "Saket"),
        ])));
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();

        let completion = wf.select_context("fir_123.pdf").await.unwrap();

        assert_eq!(completion, Completion::Applied);
        assert_eq!(wf.step(), WorkflowStep::FillFields);
        assert_eq!(wf.context_doc_id(), Some("fir_123.pdf"));
        assert_eq!(wf.form_data().len(), 1);
        assert_eq!(wf.form_data().get("accused_name"), Some("Ravi"));
        assert!(wf.error().is_none());
        assert_eq!(
            backend.calls()[2],
            FakeCall::AnalyzeContext(AnalyzeContextRequest {
                doc_id: "fir_123.pdf".to_string(),
                template_type: "bail_application".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_analysis_failure_falls_through_to_manual_entry() {
        let backend =
            catalog_backend().with_analysis(Err(Error::Analysis("no text layer".to_string())));
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();

        wf.select_context("fir_123.pdf").await.unwrap();

        assert_eq!(wf.step(), WorkflowStep::FillFields);
        assert!(wf.form_data().is_empty());
        assert_eq!(wf.error(), Some(defaults::ANALYSIS_FAILED_MESSAGE));
        assert!(!wf.is_analyzing());
    }

    #[tokio::test]
    async fn test_network_failure_during_analysis_falls_through() {
        // No scripted analysis: the fake answers with a request error.
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;
        wf.select_template("legal_notice").unwrap();

        wf.select_context("fir_123.pdf").await.unwrap();

        assert_eq!(wf.step(), WorkflowStep::FillFields);
        assert!(wf.error().is_some());
    }

    #[tokio::test]
    async fn test_second_analysis_while_analyzing_is_busy() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();

        let _ticket = wf.begin_analysis("fir_123.pdf").unwrap();
        assert!(wf.is_analyzing());
        assert_eq!(
            wf.begin_analysis("other.pdf").unwrap_err(),
            WorkflowError::Busy("analysis")
        );
        assert_eq!(wf.skip_context().unwrap_err(), WorkflowError::Busy("analysis"));
        assert_eq!(wf.context_doc_id(), Some("fir_123.pdf"));
    }

    #[tokio::test]
    async fn test_analysis_response_after_reset_is_dropped() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();
        let ticket = wf.begin_analysis("fir_123.pdf").unwrap();

        wf.reset();
        wf.select_template("legal_notice").unwrap();

        let completion =
            wf.complete_analysis(ticket.token, Ok(extracted(&[("accused_name", "Ravi")])));

        assert_eq!(completion, Completion::Stale);
        assert_eq!(wf.step(), WorkflowStep::SelectContext);
        assert!(wf.form_data().is_empty());
        assert_eq!(wf.selected_template().unwrap().id, "legal_notice");
    }

    #[tokio::test]
    async fn test_superseded_analysis_is_dropped() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();

        let first = wf.begin_analysis("fir_123.pdf").unwrap();
        wf.reset();
        wf.select_template("bail_application").unwrap();
        let second = wf.begin_analysis("bail_order.pdf").unwrap();

        assert_eq!(
            wf.complete_analysis(first.token, Ok(extracted(&[("court", "Saket")]))),
            Completion::Stale
        );
        assert!(wf.is_analyzing());
        assert_eq!(
            wf.complete_analysis(second.token, Ok(extracted(&[("court", "Delhi HC")]))),
            Completion::Applied
        );
        assert_eq!(wf.form_data().get("court"), Some("Delhi HC"));
    }

    #[tokio::test]
    async fn test_analysis_completion_applies_once() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();
        let ticket = wf.begin_analysis("fir_123.pdf").unwrap();

        assert_eq!(
            wf.complete_analysis(ticket.token, Ok(ExtractedFields::new())),
            Completion::Applied
        );
        assert_eq!(
            wf.complete_analysis(ticket.token, Ok(extracted(&[("court", "Saket")]))),
            Completion::Stale
        );
        assert!(wf.form_data().is_empty());
    }

    // ==========================================================================
    // Field entry
    // ==========================================================================

    #[tokio::test]
    async fn test_set_field_rejects_unknown_field() {
        let backend = catalog_backend();
        let mut wf = at_fill_fields(&backend).await;

        assert_eq!(
            wf.set_field("tenant_name", "Asha").unwrap_err(),
            WorkflowError::UnknownField {
                template: "bail_application".to_string(),
                field: "tenant_name".to_string(),
            }
        );
        assert!(wf.form_data().is_empty());
    }

    #[tokio::test]
    async fn test_set_field_outside_fill_fields() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();

        assert!(matches!(
            wf.set_field("court", "Saket"),
            Err(WorkflowError::InvalidTransition {
                step: WorkflowStep::SelectContext,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_clearing_a_field_reduces_populated_count() {
        let backend = catalog_backend();
        let mut wf = at_fill_fields(&backend).await;

        wf.set_field("accused_name", "Ravi").unwrap();
        wf.set_field("court", "Delhi HC").unwrap();
        assert!(wf.can_generate());

        wf.set_field("court", "").unwrap();
        assert_eq!(wf.form_data().len(), 1);
        assert!(!wf.can_generate());
    }

    #[tokio::test]
    async fn test_missing_required_fields() {
        let backend = catalog_backend();
        let mut wf = at_fill_fields(&backend).await;
        wf.set_field("court", "Delhi HC").unwrap();

        let missing: Vec<&str> = wf
            .missing_required_fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(missing, vec!["accused_name"]);
    }

    // ==========================================================================
    // Generation
    // ==========================================================================

    #[tokio::test]
    async fn test_generation_gate_counts_any_two_fields() {
        let backend = catalog_backend();
        let mut wf = at_fill_fields(&backend).await;

        assert!(!wf.can_generate());
        wf.set_field("fir_number", "123/2025").unwrap();
        assert_eq!(
            wf.begin_generation().unwrap_err(),
            WorkflowError::InsufficientFields {
                populated: 1,
                required: 2
            }
        );
        assert_eq!(wf.step(), WorkflowStep::FillFields);

        // Neither populated field needs to be a required one.
        wf.set_field("court", "Delhi HC").unwrap();
        assert!(wf.can_generate());
    }

    #[tokio::test]
    async fn test_generation_success_moves_to_review() {
        let backend = catalog_backend().with_generation(Ok(draft("draft.docx")));
        let mut wf = at_fill_fields(&backend).await;
        wf.set_field("accused_name", "Ravi").unwrap();
        wf.set_field("court", "Delhi HC").unwrap();

        let completion = wf.generate().await.unwrap();

        assert_eq!(completion, Completion::Applied);
        assert_eq!(wf.step(), WorkflowStep::Review);
        assert_eq!(wf.result().unwrap().filename, "draft.docx");
        assert_eq!(
            wf.download_url().as_deref(),
            Some("fake://download/draft.docx")
        );

        let request = backend.last_generation_request().unwrap();
        assert_eq!(request.template_type, "bail_application");
        assert!(request.enhance);
        assert_eq!(request.user_inputs.len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_stays_on_fill_fields_and_retries() {
        let backend = catalog_backend()
            .with_generation(Err(Error::Backend {
                status: 500,
                message: "LLM timeout".to_string(),
            }))
            .with_generation(Ok(draft("Bail_Application_Ravi.docx")));
        let mut wf = at_fill_fields(&backend).await;
        wf.set_field("accused_name", "Ravi").unwrap();
        wf.set_field("court", "Delhi HC").unwrap();

        wf.generate().await.unwrap();
        assert_eq!(wf.step(), WorkflowStep::FillFields);
        assert!(wf.result().is_none());
        assert!(wf.error().unwrap().contains("LLM timeout"));
        assert_eq!(wf.form_data().len(), 2);

        wf.generate().await.unwrap();
        assert_eq!(wf.step(), WorkflowStep::Review);
        assert!(wf.error().is_none());
        assert_eq!(backend.generation_count(), 2);
    }

    #[tokio::test]
    async fn test_second_generation_while_generating_is_busy() {
        let backend = catalog_backend();
        let mut wf = at_fill_fields(&backend).await;
        wf.set_field("accused_name", "Ravi").unwrap();
        wf.set_field("court", "Delhi HC").unwrap();

        let _ticket = wf.begin_generation().unwrap();
        assert!(wf.is_generating());
        assert_eq!(
            wf.begin_generation().unwrap_err(),
            WorkflowError::Busy("generation")
        );
        assert_eq!(
            wf.set_field("court", "Saket").unwrap_err(),
            WorkflowError::Busy("generation")
        );
    }

    #[tokio::test]
    async fn test_generation_response_after_reset_is_dropped() {
        let backend = catalog_backend();
        let mut wf = at_fill_fields(&backend).await;
        wf.set_field("accused_name", "Ravi").unwrap();
        wf.set_field("court", "Delhi HC").unwrap();
        let ticket = wf.begin_generation().unwrap();

        wf.reset();

        assert_eq!(
            wf.complete_generation(ticket.token, Ok(draft("late.docx"))),
            Completion::Stale
        );
        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);
        assert!(wf.result().is_none());
    }

    // ==========================================================================
    // Reset
    // ==========================================================================

    #[tokio::test]
    async fn test_reset_from_review_clears_everything() {
        let backend = catalog_backend()
            .with_analysis(Ok(extracted(&[("accused_name", "Ravi"), ("court", "Delhi HC")])))
            .with_generation(Ok(draft("draft.docx")));
        let mut wf = workflow_with(&backend).await;
        wf.select_template("bail_application").unwrap();
        wf.select_context("fir_123.pdf").await.unwrap();
        wf.generate().await.unwrap();
        assert_eq!(wf.step(), WorkflowStep::Review);

        wf.reset();

        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);
        assert!(wf.selected_template().is_none());
        assert!(wf.context_doc_id().is_none());
        assert!(wf.form_data().is_empty());
        assert!(wf.result().is_none());
        assert!(wf.error().is_none());
        assert!(wf.fields().is_empty());
        // Catalogs survive a reset.
        assert_eq!(wf.templates().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_from_every_step() {
        let backend = catalog_backend();
        let mut wf = workflow_with(&backend).await;

        wf.reset();
        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);

        wf.select_template("bail_application").unwrap();
        wf.reset();
        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);

        wf.select_template("bail_application").unwrap();
        wf.begin_analysis("fir_123.pdf").unwrap();
        wf.reset();
        assert_eq!(wf.step(), WorkflowStep::SelectTemplate);
        assert!(!wf.is_analyzing());
    }

    // ==========================================================================
    // Events
    // ==========================================================================

    #[tokio::test]
    async fn test_events_follow_transitions() {
        let backend = catalog_backend().with_generation(Ok(draft("draft.docx")));
        let mut wf = workflow_with(&backend).await;
        let mut rx = wf.subscribe();

        wf.select_template("legal_notice").unwrap();
        wf.skip_context().unwrap();
        wf.set_field("sender_name", "Asha").unwrap();
        wf.set_field("receiver_name", "Vikram").unwrap();
        wf.generate().await.unwrap();

        let mut types = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            types.push(envelope.event_type);
        }
        assert_eq!(
            types,
            vec![
                "template.selected",
                "context.skipped",
                "field.edited",
                "field.edited",
                "generation.started",
                "generation.completed",
            ]
        );
    }
}
