//! Error types for inkpress.
//!
//! Library crates use [`InkpressError`] via `thiserror` for every failure that
//! aborts document processing. Per-item failures inside a fan-out (one image,
//! one link) have their own typed results in the crates that own them and
//! never surface as an `InkpressError`.
//!
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all document-level inkpress operations.
#[derive(Debug, thiserror::Error)]
pub enum InkpressError {
    /// Input file is missing or has an unrecognized extension.
    #[error("path error: {message}")]
    Path { message: String },

    /// Input file is not valid UTF-8, or is empty.
    #[error("encoding error: {message}")]
    Encoding { message: String },

    /// The metadata block exists but does not decode as a mapping.
    #[error("frontmatter error: {message}")]
    Frontmatter { message: String },

    /// A metadata field is out of bounds (first violation only).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP client construction or transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A publishing integration rejected the document.
    #[error("publishing error ({platform}): {message}")]
    Publishing { platform: String, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InkpressError>;

impl InkpressError {
    pub fn path(msg: impl Into<String>) -> Self {
        Self::Path {
            message: msg.into(),
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
            message: msg.into(),
        }
    }

    pub fn frontmatter(msg: impl Into<String>) -> Self {
        Self::Frontmatter {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn publishing(platform: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Publishing {
            platform: platform.into(),
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

    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path { .. } => "path",
            Self::Encoding { .. } => "encoding",
            Self::Frontmatter { .. } => "frontmatter",
            Self::Validation { .. } => "validation",
            Self::Config { .. } => "config",
            Self::Network(_) => "network",
            Self::Io { .. } => "io",
            Self::Publishing { .. } => "publishing",
        }
    }
}
