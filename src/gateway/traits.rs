//! Gateway trait and payload type

use async_trait::async_trait;

use crate::types::{ExportRequest, Station, StationId, Vendor};

/// Binary export payload as returned by the backend
///
/// The bytes are never decoded or inspected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPayload {
    /// Raw payload
    pub bytes: Vec<u8>,
    /// Extension declared by the server (without the dot), empty when undeclared
    pub extension: String,
    /// Content-Type header, if the server sent one
    pub content_type: Option<String>,
}

impl ExportPayload {
    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Access to the station/vendor directory and the export service
///
/// # Errors
///
/// Every method fails with:
/// - `Error::Auth` when no credential is available (before any request) or the
///   backend rejects it
/// - `Error::Network` on transport failure
/// - `Error::Server` on any other non-2xx status, carrying the server's message
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// List all stations
    async fn list_stations(&self) -> crate::Result<Vec<Station>>;

    /// List the vendors of one station
    ///
    /// A station without vendors yields an empty list, not an error.
    async fn list_vendors(&self, station_id: StationId) -> crate::Result<Vec<Vendor>>;

    /// Request the order report for the given filters
    async fn export_report(&self, request: &ExportRequest) -> crate::Result<ExportPayload>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
