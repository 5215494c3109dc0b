//! Error types surfaced by the selector engine.
//!
//! Every problem with the selector itself, whichever stage detects it, is an
//! [`InvalidSelectorError`] whose message carries the caller's original text.
//! Failures raised by the host tree while matching travel unchanged inside
//! [`Error::Host`].

use thiserror::Error;

/// A failure reported by a [`TreeAdapter`](crate::TreeAdapter) resolver.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// The selector text could not be parsed, validated or evaluated.
///
/// `Display` shows only the original selector text; the internal reason is
/// kept for diagnostics and is available through [`InvalidSelectorError::detail`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid selector '{selector}'")]
pub struct InvalidSelectorError {
    selector: String,
    detail: String,
}

impl InvalidSelectorError {
    /// Create an error for `selector` with an internal `detail` message.
    #[must_use]
    pub fn new(selector: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            detail: detail.into(),
        }
    }

    /// The selector text exactly as the caller supplied it.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Why the selector was rejected.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Errors returned by queries.
#[derive(Debug, Error)]
pub enum Error {
    /// The selector is invalid.
    #[error(transparent)]
    InvalidSelector(#[from] InvalidSelectorError),

    /// A host resolver failed; the host's error is passed through untouched.
    #[error("{0}")]
    Host(HostError),
}

impl Error {
    /// Returns the selector error, if this is one.
    #[must_use]
    pub const fn as_invalid_selector(&self) -> Option<&InvalidSelectorError> {
        match self {
            Self::InvalidSelector(err) => Some(err),
            Self::Host(_) => None,
        }
    }

    /// Returns true if this error came from the host tree.
    #[must_use]
    pub const fn is_host(&self) -> bool {
        matches!(self, Self::Host(_))
    }
}

/// Result alias for query operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
