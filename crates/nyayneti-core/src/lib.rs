//! # nyayneti-core
//!
//! Core types, traits, and abstractions for the NyayNeti drafting client.
//!
//! This crate provides the data structures served by the drafting backend,
//! the [`DraftingBackend`] capability trait that every remote call goes
//! through, and the workflow event bus.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Workflow blocked, requires user or operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (workflow start, draft generated, reset) |
//! | DEBUG | Decision points, transitions, request tokens |
//! | TRACE | Per-field merge decisions |

pub mod defaults;
pub mod error;
pub mod events;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, WorkflowEvent};
pub use models::*;
pub use traits::*;
