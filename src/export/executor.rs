//! Export executor driving the bulk job lifecycle
//!
//! One executor invocation runs exactly one job through
//! `INIT → CREATED → ENQUEUED → POLLING → COMPLETED → DOWNLOADED`. There is
//! no resume across invocations: on any failure the caller restarts from
//! INIT. Polling sleeps a fixed interval before each status call (the
//! remote export typically takes minutes); shutdown and the deadline are
//! checked before each sleep so a Ctrl+C never waits out a full interval.

use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::client::auth::Session;
use crate::client::bulk::BulkClient;
use crate::export::config::{DEFAULT_POLL_TIMEOUT, POLL_INTERVAL};
use crate::export::{request, ExportError, ExportResult};
use crate::shutdown::{self, SharedShutdown};
use crate::{ExportRequest, ExportStatus};

/// Orchestrates the complete export lifecycle for one job.
pub struct ExportExecutor {
    poll_interval: Duration,
    poll_timeout: Duration,
    shutdown: Option<SharedShutdown>,
}

impl ExportExecutor {
    /// Create an executor with default polling configuration
    pub fn new() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            shutdown: shutdown::get_global_shutdown(),
        }
    }

    /// Set the interval between status polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the overall deadline for the poll loop
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Attach a shutdown coordinator honored at each poll iteration
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run one export job end to end and return the raw CSV bytes.
    ///
    /// An empty payload is a successful empty result, not an error.
    ///
    /// # Errors
    /// Validation failures surface before any network call; every remote
    /// stage failure is fatal with its stage name in the diagnostic. The
    /// poll loop only retries the "not yet ready" case and gives up with
    /// [`ExportError::Timeout`] once the deadline passes.
    pub async fn execute(
        &self,
        session: &Session,
        request: &ExportRequest,
    ) -> ExportResult<Bytes> {
        let body = request::build_body(request)?;
        let bulk = BulkClient::new(session, request.endpoint);

        let export_id = bulk.create_export(&body).await?;
        bulk.enqueue_export(&export_id).await?;

        self.wait_until_completed(&bulk, &export_id).await?;

        let data = bulk.download_file(&export_id).await?;
        if data.is_empty() {
            info!(
                endpoint = %request.endpoint,
                "Export reached Completed but the API transferred no data"
            );
        } else {
            info!(endpoint = %request.endpoint, bytes = data.len(), "Export downloaded");
        }

        Ok(data)
    }

    /// Poll the status endpoint until the job reports Completed.
    async fn wait_until_completed(
        &self,
        bulk: &BulkClient<'_>,
        export_id: &str,
    ) -> ExportResult<()> {
        let deadline = Instant::now() + self.poll_timeout;
        let mut last_status = ExportStatus::Queued;

        loop {
            if Instant::now() >= deadline {
                return Err(ExportError::Timeout {
                    waited_secs: self.poll_timeout.as_secs(),
                    last_status: last_status.to_string(),
                });
            }

            self.sleep_or_cancel().await?;

            let status = bulk.export_status(export_id).await?;
            info!(%export_id, %status, "Standing by for export status");

            if status.is_completed() {
                return Ok(());
            }

            // Failed/Cancelled jobs never reach Completed; keep observing
            // them (the deadline bounds the run) but make the state visible.
            if matches!(status, ExportStatus::Failed | ExportStatus::Cancelled) {
                warn!(%export_id, %status, "Export is in a state that will not complete");
            }

            last_status = status;
        }
    }

    /// Sleep one poll interval, aborting promptly on a shutdown request.
    async fn sleep_or_cancel(&self) -> ExportResult<()> {
        match &self.shutdown {
            Some(shutdown) => {
                if shutdown.is_shutdown_requested() {
                    return Err(ExportError::Cancelled);
                }
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => Ok(()),
                    _ = shutdown.wait_for_shutdown() => Err(ExportError::Cancelled),
                }
            }
            None => {
                tokio::time::sleep(self.poll_interval).await;
                Ok(())
            }
        }
    }
}

impl Default for ExportExecutor {
    fn default() -> Self {
        Self::new()
    }
}
