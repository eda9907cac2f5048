//! Export orchestration
//!
//! Drives the create → enqueue → poll → download lifecycle for exactly one
//! bulk export job per invocation. The job itself is owned by the remote
//! platform; this module only observes it. Every stage failure is fatal to
//! the run; the only intentional repetition is the poll loop, which retries
//! the "not yet ready" case and nothing else.

pub mod config;
pub mod executor;
pub mod request;

pub use executor::ExportExecutor;

use crate::client::ClientError;

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Request violates endpoint-specific filter/field requirements.
    /// Caught before any network call is issued.
    #[error("validation error: {0}")]
    Validation(String),

    /// A stage of the create/enqueue/poll/download sequence failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The job did not reach Completed before the configured deadline
    #[error("export did not complete within {waited_secs}s (last status: {last_status})")]
    Timeout {
        /// Seconds waited before giving up
        waited_secs: u64,
        /// Status observed on the final poll
        last_status: String,
    },

    /// Shutdown was requested while waiting for the export
    #[error("export cancelled by shutdown request")]
    Cancelled,
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
