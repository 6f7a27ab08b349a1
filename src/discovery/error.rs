//! Error type for scan passes.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::source::SourceError;

/// Why a scan pass or a single candidate was abandoned.
///
/// None of these reach registry callers: scanners log them and move on,
/// and the registry treats a failed scanner as one that found nothing.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A whole source (store or API) cannot be reached.
    #[error("{source_name} unavailable: {source}")]
    SourceUnavailable {
        /// Which source failed.
        source_name: &'static str,
        /// Underlying error.
        source: SourceError,
    },

    /// One candidate's configuration is unreadable or inconsistent.
    #[error("malformed entry {entry}: {reason}")]
    EntryMalformed {
        /// Candidate name or store key.
        entry: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The candidate exists in configuration but cannot be opened.
    #[error("cannot open adapter {name}: {source}")]
    TransportUnopenable {
        /// Adapter name.
        name: String,
        /// Underlying error.
        source: SourceError,
    },

    /// Resource exhaustion while building a record.
    #[error("allocation failed: {0}")]
    AllocationFailure(#[from] TryReserveError),

    /// The mandatory media query failed.
    #[error("link layer probe failed: {0}")]
    LinkProbe(#[source] SourceError),
}

impl ScanError {
    /// Creates an `EntryMalformed` error.
    #[must_use]
    pub fn malformed(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EntryMalformed {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Returns true when the current scan step must stop.
    #[must_use]
    pub const fn aborts_scan(&self) -> bool {
        matches!(self, Self::AllocationFailure(_))
    }
}
