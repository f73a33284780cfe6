//! Unified error handling for the tour-model pipeline.
//!
//! Only external-store conditions are errors. Empty input — an unknown
//! identity, a sparse user, an all-noise point set — is a well-defined
//! empty result at every stage, never an `Err`.

use thiserror::Error;

/// Result type for tour-model operations.
pub type Result<T> = std::result::Result<T, TourModelError>;

/// Errors that can occur while deriving a tour model.
#[derive(Debug, Error)]
pub enum TourModelError {
    /// The external point store could not be reached or the query failed.
    ///
    /// Retry policy belongs to the orchestration layer, so this is
    /// propagated as-is rather than retried or suppressed here.
    #[error("point store failure for identity '{identity}': {detail}")]
    StoreFailure { identity: String, detail: String },

    /// A stored record could not be decoded into a trip point.
    #[error("corrupt trip record for identity '{identity}': {detail}")]
    CorruptRecord { identity: String, detail: String },
}

impl TourModelError {
    /// Convenience constructor for store failures.
    pub fn store_failure(identity: &str, detail: impl Into<String>) -> Self {
        Self::StoreFailure {
            identity: identity.to_string(),
            detail: detail.into(),
        }
    }

    /// Convenience constructor for corrupt records.
    pub fn corrupt_record(identity: &str, detail: impl Into<String>) -> Self {
        Self::CorruptRecord {
            identity: identity.to_string(),
            detail: detail.into(),
        }
    }
}
