//! Remote API client implementations

use serde::Deserialize;

pub mod auth;
pub mod bulk;
pub mod http;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Credential exchange failed
    #[error("authentication failed ({stage}): HTTP {status}")]
    AuthFailed {
        /// Human-readable stage description
        stage: &'static str,
        /// HTTP status returned by the identity endpoint
        status: u16,
    },

    /// Remote returned a non-200 status for a bulk call
    #[error("{stage} failed: HTTP {status}: {body}")]
    HttpStatus {
        /// Export lifecycle stage ("create", "enqueue", "status", "download")
        stage: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Transport-level failure (DNS, connect, timeout)
    #[error("{stage} failed: network error: {message}")]
    Network {
        /// Export lifecycle stage
        stage: &'static str,
        /// Underlying error description
        message: String,
    },

    /// Remote returned 200 but the payload lacks an expected field.
    /// Fatal rather than retried: a contract violation, not a transient state.
    #[error("{stage} returned a malformed payload: {reason}")]
    MalformedResponse {
        /// Export lifecycle stage
        stage: &'static str,
        /// What was missing or unparseable
        reason: String,
    },

    /// Remote reported `success: false` with an error payload
    #[error("{stage} was rejected by the API: {errors}")]
    ApiRejected {
        /// Export lifecycle stage
        stage: &'static str,
        /// Error payload reported by the API
        errors: String,
    },
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Envelope shared by the bulk API responses:
/// `{success, result: [...], errors: [...]}`
#[derive(Debug, Deserialize)]
pub struct BulkEnvelope<T> {
    /// Remote-reported success flag
    #[serde(default)]
    pub success: Option<bool>,
    /// Result entries; the bulk export calls use exactly one
    #[serde(default)]
    pub result: Vec<T>,
    /// Error payload present when `success` is false
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

/// `result` entry of a create-export response
#[derive(Debug, Default, Deserialize)]
pub struct CreatedExport {
    /// Identifier of the remote export job
    #[serde(rename = "exportId")]
    pub export_id: String,
}

/// `result` entry of a status response.
///
/// `status` is optional on purpose: the API sometimes returns 200 with the
/// field missing, which callers must treat as a malformed payload.
#[derive(Debug, Default, Deserialize)]
pub struct StatusEntry {
    /// Remote-reported job status string
    #[serde(default)]
    pub status: Option<String>,
}
