//! Date range validation for export filters
//!
//! The range is edited field by field and may be invalid while the user is still
//! typing, so it is stored unvalidated and checked only when an export is requested.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Candidate export range as entered by the user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included in the report
    pub start: Option<NaiveDate>,
    /// Last day included in the report
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Create a range from optional endpoints
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Create a fully populated range
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Reason a [`DateRange`] was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RangeError {
    /// No start date selected
    #[error("start date is required")]
    MissingStart,

    /// No end date selected
    #[error("end date is required")]
    MissingEnd,

    /// End date precedes start date
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart {
        /// Selected start date
        start: NaiveDate,
        /// Selected end date
        end: NaiveDate,
    },
}

/// Validate a candidate range, returning its endpoints on success
///
/// Rules are checked in order and the first failure wins:
/// 1. missing start
/// 2. missing end
/// 3. end strictly before start (a single-day range is valid)
///
/// No upper bound on the range length is enforced here.
pub fn validate(range: &DateRange) -> Result<(NaiveDate, NaiveDate), RangeError> {
    let start = range.start.ok_or(RangeError::MissingStart)?;
    let end = range.end.ok_or(RangeError::MissingEnd)?;

    if end < start {
        return Err(RangeError::EndBeforeStart { start, end });
    }

    Ok((start, end))
}
