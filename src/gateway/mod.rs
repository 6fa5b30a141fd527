//! Remote directory gateway
//!
//! Typed access to the three backend endpoints the export screen uses:
//!
//! - station listing
//! - vendors of one station
//! - order report export (opaque binary payload)
//!
//! The core abstraction is the [`DirectoryGateway`] trait, so the selection
//! machine and export orchestrator can run against a test double. [`HttpGateway`]
//! is the reqwest-backed implementation.
//!
//! The gateway performs exactly one attempt per call. Retry policy belongs to the
//! caller.

mod http;
mod traits;


pub use http::HttpGateway;
pub use traits::{DirectoryGateway, ExportPayload};
