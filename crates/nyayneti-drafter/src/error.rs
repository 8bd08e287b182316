//! Workflow guard errors.

use thiserror::Error;

use crate::step::WorkflowStep;

/// A user action that the workflow rejected. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Cannot {action} while in step {step}")]
    InvalidTransition {
        step: WorkflowStep,
        action: &'static str,
    },

    #[error("Template catalog is unavailable")]
    CatalogUnavailable,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Field {field} is not part of template {template}")]
    UnknownField { template: String, field: String },

    #[error("At least {required} fields must be filled before generating ({populated} filled)")]
    InsufficientFields { populated: usize, required: usize },

    #[error("A {0} request is already in flight")]
    Busy(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_transition() {
        let err = WorkflowError::InvalidTransition {
            step: WorkflowStep::Review,
            action: "edit a field",
        };
        assert_eq!(err.to_string(), "Cannot edit a field while in step review");
    }

    #[test]
    fn test_error_display_insufficient_fields() {
        let err = WorkflowError::InsufficientFields {
            populated: 1,
            required: 2,
        };
        assert_eq!(
            err.to_string(),
            "At least 2 fields must be filled before generating (1 filled)"
        );
    }

    #[test]
    fn test_error_display_busy() {
        assert_eq!(
            WorkflowError::Busy("generation").to_string(),
            "A generation request is already in flight"
        );
    }
}
