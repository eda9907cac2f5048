//! Endpoint-specific request-body construction
//!
//! The create-export payload varies per endpoint and per active date filter.
//! Construction is a pure function of the [`ExportRequest`]; validation
//! rejects requests that violate the endpoint's filter/field requirements
//! before any network call is issued.

use serde::Serialize;

use crate::export::{ExportError, ExportResult};
use crate::{DateRange, Endpoint, ExportRequest};

/// `{startAt, endAt}` date interval as the API expects it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeBody {
    /// Interval start, ISO-8601 date
    pub start_at: String,
    /// Interval end, ISO-8601 date
    pub end_at: String,
}

impl From<&DateRange> for DateRangeBody {
    fn from(range: &DateRange) -> Self {
        Self {
            start_at: range.start.format("%Y-%m-%d").to_string(),
            end_at: range.end.format("%Y-%m-%d").to_string(),
        }
    }
}

/// `filter` object of the create-export payload.
/// Inactive sections are omitted entirely rather than serialized as null.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilter {
    /// Created-date interval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateRangeBody>,
    /// Updated-date interval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateRangeBody>,
    /// Activity type id selection (Activities only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type_ids: Option<Vec<String>>,
}

/// Create-export request payload
#[derive(Debug, Serialize)]
pub struct ExportBody {
    /// Output format; the extractor always requests CSV
    pub format: &'static str,
    /// Ordered column selection (Leads only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Date and activity-type filters
    pub filter: ExportFilter,
}

/// Validate a request against its endpoint's requirements.
///
/// # Errors
/// - Activities without an active created filter
/// - Leads without any active date filter
/// - Leads with an empty field list
pub fn validate(request: &ExportRequest) -> ExportResult<()> {
    match request.endpoint {
        Endpoint::Activities => {
            if request.created.is_none() {
                return Err(ExportError::Validation(
                    "The Activities endpoint requires a Created Date interval".to_string(),
                ));
            }
        }
        Endpoint::Leads => {
            if request.fields.is_empty() {
                return Err(ExportError::Validation(
                    "The Leads endpoint requires a non-empty field list".to_string(),
                ));
            }
            if request.created.is_none() && request.updated.is_none() {
                return Err(ExportError::Validation(
                    "The Leads endpoint requires either a Created or an Updated interval"
                        .to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Build the create-export payload for a validated request.
///
/// Activities: `createdAt` always present, `updatedAt` only when active,
/// `activityTypeIds` only when the caller supplied a non-empty set.
/// Leads: `fields` and `format: "CSV"` always present, whichever of
/// `createdAt`/`updatedAt` is active included. When both Leads filters are
/// active, both are passed through; how the remote API combines the two
/// ranges is its own contract, not re-interpreted here.
pub fn build_body(request: &ExportRequest) -> ExportResult<ExportBody> {
    validate(request)?;

    let body = match request.endpoint {
        Endpoint::Activities => ExportBody {
            format: "CSV",
            fields: None,
            filter: ExportFilter {
                created_at: request.created.as_ref().map(DateRangeBody::from),
                updated_at: request.updated.as_ref().map(DateRangeBody::from),
                activity_type_ids: if request.activity_type_ids.is_empty() {
                    None
                } else {
                    Some(request.activity_type_ids.clone())
                },
            },
        },
        Endpoint::Leads => ExportBody {
            format: "CSV",
            fields: Some(request.fields.clone()),
            filter: ExportFilter {
                created_at: request.created.as_ref().map(DateRangeBody::from),
                updated_at: request.updated.as_ref().map(DateRangeBody::from),
                activity_type_ids: None,
            },
        },
    };

    Ok(body)
}
