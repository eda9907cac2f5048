//! Raw calls against the `/bulk/v1/{endpoint}/export` API
//!
//! One method per remote call, each a single request with response
//! validation. Sequencing (create before enqueue, poll until completed) is
//! the orchestrator's concern, see [`crate::export::ExportExecutor`].

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::client::auth::Session;
use crate::client::{BulkEnvelope, ClientError, ClientResult, CreatedExport, StatusEntry};
use crate::{Endpoint, ExportStatus};

/// Client for the bulk export calls of one endpoint, bound to a session.
pub struct BulkClient<'a> {
    session: &'a Session,
    endpoint: Endpoint,
}

impl<'a> BulkClient<'a> {
    /// Create a bulk client for the given endpoint
    pub fn new(session: &'a Session, endpoint: Endpoint) -> Self {
        Self { session, endpoint }
    }

    fn export_path(&self, suffix: &str) -> String {
        format!("/bulk/v1/{}/export{}", self.endpoint.path_segment(), suffix)
    }

    fn token_param(&self) -> [(&'static str, &'a str); 1] {
        [("access_token", self.session.access_token())]
    }

    /// Create an export job. Returns the remote job id.
    ///
    /// # Errors
    /// HTTP failure, `success: false`, or a payload without an export id all
    /// fail the "create" stage.
    pub async fn create_export<B: Serialize>(&self, body: &B) -> ClientResult<String> {
        let response: BulkEnvelope<CreatedExport> = self
            .session
            .http()
            .post_json(
                "create",
                &self.export_path("/create.json"),
                &self.token_param(),
                body,
            )
            .await?;

        if response.success != Some(true) {
            let errors = response
                .errors
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no error payload".to_string());
            return Err(ClientError::ApiRejected {
                stage: "create",
                errors,
            });
        }

        let export_id = response
            .result
            .into_iter()
            .next()
            .map(|entry| entry.export_id)
            .ok_or_else(|| ClientError::MalformedResponse {
                stage: "create",
                reason: "create response is missing result[0].exportId".to_string(),
            })?;

        info!(%export_id, "Creating export");
        Ok(export_id)
    }

    /// Enqueue a created export job.
    ///
    /// The response carries no payload worth validating beyond the status
    /// code, so only a 200 is expected.
    pub async fn enqueue_export(&self, export_id: &str) -> ClientResult<()> {
        self.session
            .http()
            .post_ok(
                "enqueue",
                &self.export_path(&format!("/{export_id}/enqueue.json")),
                &self.token_param(),
            )
            .await?;

        info!(%export_id, "Enqueuing export");
        Ok(())
    }

    /// Fetch the current status of an export job.
    ///
    /// # Errors
    /// A 200 response without `result[0].status` is a contract violation and
    /// fails with [`ClientError::MalformedResponse`]; it is not a transient
    /// "not ready" state and must not be re-polled.
    pub async fn export_status(&self, export_id: &str) -> ClientResult<ExportStatus> {
        let response: BulkEnvelope<StatusEntry> = self
            .session
            .http()
            .get_json(
                "status",
                &self.export_path(&format!("/{export_id}/status.json")),
                &self.token_param(),
            )
            .await?;

        let status = response
            .result
            .into_iter()
            .next()
            .and_then(|entry| entry.status)
            .ok_or_else(|| ClientError::MalformedResponse {
                stage: "status",
                reason: "status response is missing result[0].status".to_string(),
            })?;

        Ok(ExportStatus::parse(&status))
    }

    /// Download the export file once the job is completed.
    ///
    /// Returns the raw CSV bytes verbatim; an empty payload is a valid,
    /// non-error outcome (the platform legitimately returns zero rows).
    pub async fn download_file(&self, export_id: &str) -> ClientResult<Bytes> {
        self.session
            .http()
            .get_bytes(
                "download",
                &self.export_path(&format!("/{export_id}/file.json")),
                &self.token_param(),
            )
            .await
    }
}
