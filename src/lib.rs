//! # Marketo Bulk Extractor Library
//!
//! A batch extractor for the Marketo REST bulk export API. Each invocation
//! authenticates against a tenant (Munchkin) instance, configures a single
//! export job for either the Leads or the Activities endpoint, polls until
//! the remote platform finishes preparing the export, downloads the CSV
//! payload, and persists it together with a primary-key manifest.
//!
//! ## Quick Start
//!
//! ```no_run
//! use marketo_bulk_extractor::client::auth::{munchkin_base_url, Session};
//! use marketo_bulk_extractor::export::ExportExecutor;
//! use marketo_bulk_extractor::{DateRange, ExportRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::establish(
//!     &munchkin_base_url("123-ABC-456"),
//!     "client-id",
//!     "client-secret",
//! )
//! .await?;
//!
//! let request = ExportRequest::leads(
//!     Some(DateRange::from_ymd(2024, 1, 1, 2024, 1, 31)?),
//!     None,
//!     vec!["id".to_string(), "email".to_string()],
//! );
//!
//! let data = ExportExecutor::new().execute(&session, &request).await?;
//! println!("downloaded {} bytes", data.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`client`] - Remote API surface: session handshake and the raw bulk calls
//! - [`export`] - Export orchestration (create, enqueue, poll, download)
//! - [`output`] - CSV table and manifest writers
//! - [`cli`] - Command-line interface and human date-spec resolution
//! - [`shutdown`] - Cooperative cancellation shared across modules

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// CLI command implementations
pub mod cli;

/// Remote API client (session handshake and bulk endpoint calls)
pub mod client;

/// Export orchestration
pub mod export;

/// Table and manifest output writers
pub mod output;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

pub use export::ExportExecutor;

/// The two record types exposed by the Marketo bulk export API.
///
/// Each endpoint has a distinct request-body shape and required filters:
/// Activities demands a created-date interval, Leads demands a non-empty
/// field list and at least one active date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// Activity records, keyed by `marketoGUID`
    #[serde(rename = "activities")]
    Activities,
    /// Lead records, keyed by `id`
    #[serde(rename = "leads")]
    Leads,
}

impl Endpoint {
    /// URL path segment under `/bulk/v1/`
    pub fn path_segment(&self) -> &'static str {
        match self {
            Endpoint::Activities => "activities",
            Endpoint::Leads => "leads",
        }
    }

    /// Primary key column of the exported table
    pub fn primary_key(&self) -> &'static str {
        match self {
            Endpoint::Activities => "marketoGUID",
            Endpoint::Leads => "id",
        }
    }

    /// Output table file name (`Activities_bulk.csv` / `Leads_bulk.csv`)
    pub fn table_file_name(&self) -> &'static str {
        match self {
            Endpoint::Activities => "Activities_bulk.csv",
            Endpoint::Leads => "Leads_bulk.csv",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Endpoint::Activities => "Activities",
            Endpoint::Leads => "Leads",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activities" => Ok(Endpoint::Activities),
            "leads" => Ok(Endpoint::Leads),
            _ => Err(format!(
                "Unsupported endpoint: {s}. Valid options: Activities, Leads"
            )),
        }
    }
}

/// Inclusive date interval used by the `createdAt`/`updatedAt` export filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the interval (inclusive)
    pub start: NaiveDate,
    /// Last day of the interval (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting intervals that end before they start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err(format!(
                "End date ({end}) must not be before start date ({start})"
            ));
        }
        Ok(Self { start, end })
    }

    /// Create a range from year/month/day components
    pub fn from_ymd(
        start_y: i32,
        start_m: u32,
        start_d: u32,
        end_y: i32,
        end_m: u32,
        end_d: u32,
    ) -> Result<Self, String> {
        let start = NaiveDate::from_ymd_opt(start_y, start_m, start_d)
            .ok_or_else(|| format!("Invalid start date: {start_y}-{start_m}-{start_d}"))?;
        let end = NaiveDate::from_ymd_opt(end_y, end_m, end_d)
            .ok_or_else(|| format!("Invalid end date: {end_y}-{end_m}-{end_d}"))?;
        Self::new(start, end)
    }
}

/// Export request for a single bulk job.
///
/// Constructed once, immutable, consumed by [`export::ExportExecutor`] to
/// build the remote job payload. `fields` only applies to Leads,
/// `activity_type_ids` only to Activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Target endpoint
    pub endpoint: Endpoint,
    /// Created-date filter; `None` means inactive
    pub created: Option<DateRange>,
    /// Updated-date filter; `None` means inactive
    pub updated: Option<DateRange>,
    /// Ordered column selection (Leads only, must be non-empty for Leads)
    pub fields: Vec<String>,
    /// Activity type id selection (Activities only, empty means all types)
    pub activity_type_ids: Vec<String>,
}

impl ExportRequest {
    /// Build an Activities request
    pub fn activities(
        created: Option<DateRange>,
        updated: Option<DateRange>,
        activity_type_ids: Vec<String>,
    ) -> Self {
        Self {
            endpoint: Endpoint::Activities,
            created,
            updated,
            fields: Vec::new(),
            activity_type_ids,
        }
    }

    /// Build a Leads request
    pub fn leads(
        created: Option<DateRange>,
        updated: Option<DateRange>,
        fields: Vec<String>,
    ) -> Self {
        Self {
            endpoint: Endpoint::Leads,
            created,
            updated,
            fields,
            activity_type_ids: Vec::new(),
        }
    }
}

/// Remote-reported lifecycle status of a bulk export job.
///
/// The job is owned entirely by the Marketo platform; the extractor only
/// observes these states while polling. Only [`ExportStatus::Completed`]
/// terminates the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// Job created but not yet enqueued
    Created,
    /// Job waiting in the remote processing queue
    Queued,
    /// Remote platform is materializing the export
    Processing,
    /// Export file is ready for download
    Completed,
    /// Job was cancelled on the remote side
    Cancelled,
    /// Remote processing failed
    Failed,
    /// A status string this client does not recognize
    Other(String),
}

impl ExportStatus {
    /// Parse the `status` field of a status response
    pub fn parse(s: &str) -> Self {
        match s {
            "Created" => ExportStatus::Created,
            "Queued" => ExportStatus::Queued,
            "Processing" => ExportStatus::Processing,
            "Completed" => ExportStatus::Completed,
            "Cancelled" => ExportStatus::Cancelled,
            "Failed" => ExportStatus::Failed,
            other => ExportStatus::Other(other.to_string()),
        }
    }

    /// Whether the export file is ready for download
    pub fn is_completed(&self) -> bool {
        matches!(self, ExportStatus::Completed)
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExportStatus::Created => "Created",
            ExportStatus::Queued => "Queued",
            ExportStatus::Processing => "Processing",
            ExportStatus::Completed => "Completed",
            ExportStatus::Cancelled => "Cancelled",
            ExportStatus::Failed => "Failed",
            ExportStatus::Other(other) => other.as_str(),
        };
        write!(f, "{s}")
    }
}
