//! Workflow event types and event bus for front-end notifications.
//!
//! The drafting workflow emits a [`WorkflowEvent`] for every state change.
//! Front ends (terminal UI, web socket bridge, telemetry) subscribe
//! independently and re-render from the controller's state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

// ============================================================================
// Workflow Event
// ============================================================================

/// Domain events emitted by the drafting workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// Catalogs finished loading at workflow start.
    CatalogLoaded {
        templates: usize,
        documents: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// A template was selected and the form was cleared.
    TemplateSelected { template_id: String, fields: usize },
    /// Context analysis was issued.
    AnalysisStarted { doc_id: String, token: u64 },
    /// Context analysis completed and fields were merged.
    AnalysisCompleted { doc_id: String, merged: usize },
    /// Context analysis failed; manual entry continues.
    AnalysisFailed { doc_id: String, error: String },
    /// Context selection was skipped.
    ContextSkipped,
    /// A single field was edited.
    FieldEdited { field: String, populated: usize },
    /// Draft generation was issued.
    GenerationStarted { template_id: String, token: u64 },
    /// Draft generation completed.
    GenerationCompleted { filename: String, citations: usize },
    /// Draft generation failed; the user may retry.
    GenerationFailed { error: String },
    /// A completion arrived for a superseded request and was dropped.
    StaleResponseDropped { operation: String, token: u64 },
    /// The workflow returned to template selection.
    Reset,
}

impl WorkflowEvent {
    /// Returns the namespaced event type (e.g., `"analysis.completed"`).
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::CatalogLoaded { .. } => "catalog.loaded",
            WorkflowEvent::TemplateSelected { .. } => "template.selected",
            WorkflowEvent::AnalysisStarted { .. } => "analysis.started",
            WorkflowEvent::AnalysisCompleted { .. } => "analysis.completed",
            WorkflowEvent::AnalysisFailed { .. } => "analysis.failed",
            WorkflowEvent::ContextSkipped => "context.skipped",
            WorkflowEvent::FieldEdited { .. } => "field.edited",
            WorkflowEvent::GenerationStarted { .. } => "generation.started",
            WorkflowEvent::GenerationCompleted { .. } => "generation.completed",
            WorkflowEvent::GenerationFailed { .. } => "generation.failed",
            WorkflowEvent::StaleResponseDropped { .. } => "response.stale",
            WorkflowEvent::Reset => "workflow.reset",
        }
    }
}

/// Event wrapped with identity and timing metadata.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type.
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: WorkflowEvent,
}

impl EventEnvelope {
    pub fn new(payload: WorkflowEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: payload.event_type().to_string(),
            occurred_at: Utc::now(),
            payload,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus for distributing workflow events.
///
/// Slow receivers that fall behind receive a `Lagged` error and miss events;
/// front ends re-read controller state rather than replaying events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped if nobody is listening.
    pub fn emit(&self, event: WorkflowEvent) {
        let envelope = EventEnvelope::new(event);
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive enveloped events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

// ============================================================================
// Tests
// ============================================================================
