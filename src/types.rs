//! Core types for orders-export

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ErrorDetail;

/// Unique identifier for a station
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub i64);

/// Unique identifier for a vendor
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(pub i64);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Get the inner i64 value
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl PartialEq<i64> for $name {
            fn eq(&self, other: &i64) -> bool {
                self.0 == *other
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

impl_id!(StationId);
impl_id!(VendorId);

/// Pickup/delivery location that scopes vendors
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Station identity
    pub id: StationId,
    /// Display name
    pub name: String,
    /// Short station code
    #[serde(default)]
    pub code: String,
}

/// Merchant scoped to exactly one station
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Vendor identity
    pub id: VendorId,
    /// Display name
    pub name: String,
    /// Owning station
    pub station_id: StationId,
}

/// Filters sent to the export endpoint
///
/// Built only from a validated [`DateRange`](crate::validation::DateRange), so both
/// dates are always present. Absent scope filters mean "all stations/vendors".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Restrict the report to one station
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<StationId>,
    /// Restrict the report to one vendor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<VendorId>,
    /// First day included
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    /// Last day included
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl ExportRequest {
    /// Query parameters for the export endpoint, dates in `YYYY-MM-DD` form
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(station_id) = self.station_id {
            pairs.push(("stationId", station_id.to_string()));
        }
        if let Some(vendor_id) = self.vendor_id {
            pairs.push(("vendorId", vendor_id.to_string()));
        }
        pairs.push(("startDate", self.start.format("%Y-%m-%d").to_string()));
        pairs.push(("endDate", self.end.format("%Y-%m-%d").to_string()));
        pairs
    }
}

/// Event emitted as the export screen's state changes
///
/// Presentation code subscribes to these instead of polling snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Station list arrived
    StationsLoaded {
        /// Number of stations
        count: usize,
    },

    /// Station list failed; dependent selection is disabled
    StationsFailed {
        /// Recorded error
        error: ErrorDetail,
    },

    /// Station selection changed (None = cleared)
    StationSelected {
        /// Newly selected station
        station_id: Option<StationId>,
        /// Vendor fetch generation after the change
        generation: u64,
    },

    /// Vendor list for the current station arrived
    VendorsLoaded {
        /// Station the vendors belong to
        station_id: StationId,
        /// Generation the response was tagged with
        generation: u64,
        /// Number of vendors
        count: usize,
    },

    /// Vendor list for the current station failed
    VendorsFailed {
        /// Station whose vendors were requested
        station_id: StationId,
        /// Generation the response was tagged with
        generation: u64,
        /// Recorded error
        error: ErrorDetail,
    },

    /// A vendor response arrived for a superseded station selection
    StaleVendorResponseDiscarded {
        /// Generation the response was tagged with
        generation: u64,
        /// Live generation at arrival time
        current_generation: u64,
    },

    /// Vendor selection changed (None = all vendors)
    VendorSelected {
        /// Newly selected vendor
        vendor_id: Option<VendorId>,
    },

    /// Export request sent
    ExportStarted {
        /// Filters sent to the backend
        request: ExportRequest,
    },

    /// Export payload handed to the delivery target
    ExportDelivered {
        /// Final filename
        filename: String,
        /// Payload size
        size_bytes: u64,
    },

    /// Export failed; filters are left untouched
    ExportFailed {
        /// Recorded error
        error: ErrorDetail,
    },
}
