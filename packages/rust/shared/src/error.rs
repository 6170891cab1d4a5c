//! Error types for LeadLens.
//!
//! Library crates use [`LeadLensError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every variant maps to a stable machine-readable code via
//! [`LeadLensError::code`]; failed analysis jobs record that code alongside
//! the message so errors remain inspectable after the fact.

use std::path::PathBuf;

/// Top-level error type for all LeadLens operations.
#[derive(Debug, thiserror::Error)]
pub enum LeadLensError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Bad caller input (malformed profile URL, blank search query, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Enrichment collaborator failure (transport, status, or payload).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Content-generation collaborator failure (API or response parsing).
    #[error("generation error: {0}")]
    Generation(String),

    /// Durable storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Ingestion file extension outside the supported set.
    #[error("unsupported format: .{extension}")]
    UnsupportedFormat { extension: String },

    /// Format-specific text extraction failure.
    #[error("extraction error: {message}")]
    Extraction { message: String },

    /// Job or document id unresolved in any storage tier.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LeadLensError>;

impl LeadLensError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Create a not-found error from any displayable message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code, recorded on errored jobs and surfaced
    /// in batch ingestion reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Generation(_) => "GENERATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::Extraction { .. } => "EXTRACTION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Io { .. } => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LeadLensError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = LeadLensError::validation("profile URL is malformed");
        assert!(err.to_string().contains("profile URL is malformed"));

        let err = LeadLensError::UnsupportedFormat {
            extension: "png".into(),
        };
        assert_eq!(err.to_string(), "unsupported format: .png");
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(LeadLensError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(LeadLensError::Upstream("x".into()).code(), "UPSTREAM_ERROR");
        assert_eq!(
            LeadLensError::Generation("x".into()).code(),
            "GENERATION_ERROR"
        );
        assert_eq!(LeadLensError::not_found("x").code(), "NOT_FOUND");
    }
}
