//! Common types and utilities shared across Concierge crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the Concierge workspace. It is intentionally lightweight
//! so that every crate can depend on it without pulling in the HTTP stack.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ConciergeError`] and [`Result`]: Shared error handling
//! - [`DebugInfo`]: the informational `_debug` annotation attached to
//!   responses that were produced without a usable generation
//!
//! # Examples
//!
//! ```rust
//! use concierge_common::ConciergeError;
//!
//! let err = ConciergeError::Extraction;
//! let debug = err.debug_info();
//! assert_eq!(debug.error, "generation_failed");
//! assert_eq!(err.code(), "model_output_not_valid_json");
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Error types used across the Concierge system.
///
/// Every variant is recoverable at the request boundary: the service degrades
/// to a synthesized itinerary instead of surfacing a fault to the caller.
#[derive(thiserror::Error, Debug)]
pub enum ConciergeError {
    /// The text-generation collaborator failed (transport, timeout, non-2xx).
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Generator output held no balanced, parseable JSON object.
    #[error("Generation failed: model output did not contain a valid JSON object")]
    Extraction,

    /// The search-context collaborator was unreachable or refused the request.
    #[error("Search failed: {0}")]
    Search(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

impl ConciergeError {
    /// Stable snake_case identifier for logs and diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            ConciergeError::Generation(_) => "generation_failed",
            ConciergeError::Extraction => "model_output_not_valid_json",
            ConciergeError::Search(_) => "search_failed",
            ConciergeError::Config(_) => "config_error",
            ConciergeError::Timeout => "timeout",
        }
    }

    /// Build the `_debug` annotation for a response that fell back to synthesis.
    ///
    /// Generation and extraction failures share the `generation_failed`
    /// category; the message tells them apart.
    pub fn debug_info(&self) -> DebugInfo {
        let error = match self {
            ConciergeError::Generation(_)
            | ConciergeError::Extraction
            | ConciergeError::Timeout => "generation_failed",
            other => other.code(),
        };
        DebugInfo {
            error: error.to_string(),
            message: self.to_string(),
        }
    }
}

/// Informational diagnostics attached to a response as `_debug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub error: String,
    pub message: String,
}

/// Convenient alias for results that use [`ConciergeError`].
pub type Result<T> = std::result::Result<T, ConciergeError>;
