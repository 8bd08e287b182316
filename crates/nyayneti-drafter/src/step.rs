//! Workflow steps.

use std::fmt;

/// Position of the drafting workflow.
///
/// The four user-facing steps are `SelectTemplate`, `SelectContext`,
/// `FillFields` and `Review`. `Analyzing` and `Generating` are transient
/// sub-states entered while a backend call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkflowStep {
    #[default]
    SelectTemplate,
    SelectContext,
    /// Context analysis in flight (belongs to `SelectContext`).
    Analyzing,
    FillFields,
    /// Generation in flight (belongs to `FillFields`).
    Generating,
    Review,
}

impl WorkflowStep {
    /// One-based index of the user-facing step, for progress indicators.
    pub fn ordinal(&self) -> u8 {
        match self {
            WorkflowStep::SelectTemplate => 1,
            WorkflowStep::SelectContext | WorkflowStep::Analyzing => 2,
            WorkflowStep::FillFields | WorkflowStep::Generating => 3,
            WorkflowStep::Review => 4,
        }
    }

    /// Whether a backend call is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowStep::Analyzing | WorkflowStep::Generating)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::SelectTemplate => "select_template",
            WorkflowStep::SelectContext => "select_context",
            WorkflowStep::Analyzing => "analyzing",
            WorkflowStep::FillFields => "fill_fields",
            WorkflowStep::Generating => "generating",
            WorkflowStep::Review => "review",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
