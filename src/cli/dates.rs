//! Human date-spec resolution
//!
//! Operators describe each filter either as "how many days back" or as a
//! specific "mon YYYY" month. This module translates those specs into the
//! absolute ISO date intervals the export API expects. When both are given
//! for one filter, the days-back span wins and the month is disregarded
//! with an informational log.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::cli::CliError;
use crate::DateRange;

/// Resolve one filter's date specs into a range, using today's UTC date.
///
/// Returns `None` when neither spec is given: the filter stays inactive.
pub fn resolve(
    filter_name: &str,
    days_back: Option<u32>,
    month_year: Option<&str>,
) -> Result<Option<DateRange>, CliError> {
    resolve_with_today(filter_name, days_back, month_year, Utc::now().date_naive())
}

/// [`resolve`] with an explicit "today", for deterministic tests.
pub fn resolve_with_today(
    filter_name: &str,
    days_back: Option<u32>,
    month_year: Option<&str>,
    today: NaiveDate,
) -> Result<Option<DateRange>, CliError> {
    match (days_back, month_year) {
        (Some(days), month) => {
            if month.is_some() {
                info!(
                    "Disregarding the month/year for '{filter_name}', \
                     taking only the days-back parameter into consideration"
                );
            }
            let start = today
                .checked_sub_days(chrono::Days::new(u64::from(days)))
                .ok_or_else(|| {
                    CliError::InvalidArgument(format!(
                        "Days-back value for '{filter_name}' is out of range: {days}"
                    ))
                })?;
            Ok(Some(DateRange { start, end: today }))
        }
        (None, Some(month_year)) => parse_month_year(filter_name, month_year).map(Some),
        (None, None) => {
            info!("{filter_name} date is not provided");
            Ok(None)
        }
    }
}

/// Parse a "mon YYYY" spec ("jan 2024", "Feb 2023") into the full month.
fn parse_month_year(filter_name: &str, spec: &str) -> Result<DateRange, CliError> {
    let invalid = || {
        CliError::InvalidArgument(format!(
            "Invalid month/year for '{filter_name}': '{spec}'. Expected e.g. 'jan 2024'"
        ))
    };

    let mut parts = spec.split_whitespace();
    let month_part = parts.next().ok_or_else(invalid)?;
    let year_part = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    // get() rather than slicing: rejects short and non-ASCII month names
    let abbrev = month_part.get(..3).ok_or_else(invalid)?;
    let month = match abbrev.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return Err(invalid()),
    };
    let year: i32 = year_part.parse().map_err(|_| invalid())?;

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = last_day_of_month(year, month).ok_or_else(invalid)?;

    // start <= end always holds for a whole month
    Ok(DateRange { start, end })
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt()
}
