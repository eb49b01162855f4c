//! Per-image failure reasons.
//!
//! These never abort a document: each one is logged at the image's task
//! boundary and its span is left untouched.

/// Why one image could not be relocated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageFailure {
    /// Bytes could not be read from disk or fetched from the remote locator.
    #[error("failed to resolve '{locator}': {reason}")]
    Resolve { locator: String, reason: String },

    /// Bytes do not decode as a supported image.
    #[error("'{locator}' is not a valid image: {reason}")]
    Verify { locator: String, reason: String },

    /// The hosting destination rejected the upload or was unreachable.
    #[error("upload failed: {reason}")]
    Upload { reason: String },

    /// The upload succeeded but the response carried no `url` field.
    #[error("upload response did not contain a URL")]
    MissingUrl,
}

impl ImageFailure {
    pub fn resolve(locator: &str, reason: impl std::fmt::Display) -> Self {
        Self::Resolve {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn verify(locator: &str, reason: impl std::fmt::Display) -> Self {
        Self::Verify {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn upload(reason: impl std::fmt::Display) -> Self {
        Self::Upload {
            reason: reason.to_string(),
        }
    }
}
