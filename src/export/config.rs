//! Export polling configuration constants

use std::time::Duration;

/// Interval between status polls.
/// The remote export typically takes minutes to materialize; 60 seconds is
/// long enough to avoid hammering the API while keeping detection latency
/// acceptable for a batch job.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Overall deadline for the poll loop.
/// The remote API gives no progress signal beyond the status string, so a
/// job stuck in Queued/Processing (or Failed, which the loop deliberately
/// keeps polling) would otherwise hang the run forever. Three hours covers
/// the largest exports the platform realistically produces.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(3 * 60 * 60);
