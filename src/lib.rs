//! # orders-export
//!
//! Client-side core of the orders export screen: the user narrows a report by
//! station, then by a vendor of that station, then by date range, and downloads
//! the resulting spreadsheet.
//!
//! ## Design Philosophy
//!
//! - **Race-safe selection** - vendor lists that arrive for a superseded station
//!   are discarded by generation tag, whatever the network ordering
//! - **One writer** - selection state changes only through named transitions
//! - **Explicit collaborators** - credentials, the backend gateway and file
//!   delivery are injected, so everything runs against test doubles
//! - **Event-driven** - presentation code subscribes to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use orders_export::config::BearerToken;
//! use orders_export::{Config, DateRange, Event, ExportSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.gateway.base_url = "https://backend.example.com/api/".to_string();
//!     config.gateway.token = BearerToken::from_default_env();
//!
//!     let session = ExportSession::new(config)?;
//!
//!     let mut events = session.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::ExportDelivered { filename, .. } = event {
//!                 println!("saved {filename}");
//!             }
//!         }
//!     });
//!
//!     let selection = session.selection();
//!     let _ = selection.load_stations().await;
//!     if let Some(station) = selection.snapshot().stations().first().cloned() {
//!         let _ = selection.select_station(station).await;
//!     }
//!
//!     let range = DateRange::between(
//!         NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2023, 6, 10).unwrap(),
//!     );
//!     let outcome = session.request_export(&range).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// File materialization for export payloads
pub mod delivery;
/// Error types
pub mod error;
/// Export orchestration
pub mod export;
/// Backend gateway
pub mod gateway;
/// Dependent station/vendor selection
pub mod selection;
/// Export screen session
pub mod session;
/// Core types and events
pub mod types;
/// Filename and header helpers
pub mod utils;
/// Date range validation
pub mod validation;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{BearerToken, Config, ExportConfig, GatewayConfig};
pub use delivery::{DeliveredFile, DirectoryDelivery, FileDelivery, MemoryDelivery};
pub use error::{Error, ErrorDetail, ErrorKind, Result};
pub use export::{ExportOrchestrator, ExportOutcome};
pub use gateway::{DirectoryGateway, ExportPayload, HttpGateway};
pub use selection::{
    RejectReason, SelectionMachine, SelectionState, StationPhase, TransitionOutcome,
    VendorFetchTicket, VendorPhase,
};
pub use session::ExportSession;
pub use types::{Event, ExportRequest, Station, StationId, Vendor, VendorId};
pub use validation::{DateRange, RangeError, validate};
