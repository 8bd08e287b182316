//! # nyayneti-client
//!
//! HTTP client for the NyayNeti drafting backend.
//!
//! This crate provides:
//! - [`HttpDraftingBackend`], the REST implementation of
//!   [`nyayneti_core::DraftingBackend`]
//! - Client configuration from TOML files or environment variables
//! - HTTP status to error mapping
//!
//! # Example
//!
//! ```rust,no_run
//! use nyayneti_client::HttpDraftingBackend;
//! use nyayneti_core::DraftingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = HttpDraftingBackend::from_env().unwrap();
//!     let templates = backend.list_templates().await.unwrap();
//!     println!("{} templates available", templates.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;

pub use config::{ClientConfig, ConfigError};
pub use error::BackendErrorCode;
pub use http::HttpDraftingBackend;
