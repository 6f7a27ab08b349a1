//! Error type for system source operations.

use thiserror::Error;

/// Error type for system source operations.
///
/// Describes what went wrong without dictating recovery strategy;
/// the discovery engine decides whether a failure skips a source,
/// an entry, or a single probe.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Windows API call failed.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    /// The source does not exist on this system.
    #[error("Source not supported on this system: {source_name}")]
    Unsupported {
        /// Which source is missing.
        source_name: &'static str,
    },

    /// The requested entry, value, or adapter does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// Platform-specific error with a generic message.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },
}

impl SourceError {
    /// Creates an `Unsupported` error.
    #[must_use]
    pub const fn unsupported(source_name: &'static str) -> Self {
        Self::Unsupported { source_name }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true when the whole source is absent.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
