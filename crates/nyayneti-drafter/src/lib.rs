//! # nyayneti-drafter
//!
//! The guided document drafting workflow:
//!
//! ```text
//! select template -> select context (optional) -> fill fields -> review
//!                         |        ^                  |    ^
//!                         v        |                  v    |
//!                       analyzing -+              generating
//! ```
//!
//! [`DraftingWorkflow`] validates every user action against the current
//! [`WorkflowStep`], merges values extracted from a context document into the
//! form, gates generation on a minimum number of populated fields and drops
//! backend responses that arrive after the user has moved on.
//!
//! The backend is any [`nyayneti_core::DraftingBackend`]; the [`mock`] module
//! provides a scripted one for tests.

pub mod error;
pub mod merge;
pub mod mock;
pub mod step;
pub mod token;
pub mod workflow;

pub use error::WorkflowError;
pub use merge::merge_extracted;
pub use step::WorkflowStep;
pub use token::{Operation, RequestToken};
pub use workflow::{
    AnalysisTicket, Completion, DraftingWorkflow, GenerationTicket, WorkflowResult,
};
