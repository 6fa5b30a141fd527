//! Export orchestration
//!
//! Turns the current selection and date range into an export request, runs it
//! against the gateway and hands the payload to a [`FileDelivery`].
//!
//! At most one export is in flight per orchestrator. A trigger that arrives while
//! one is pending is ignored (not queued) and reported as
//! [`ExportOutcome::AlreadyInFlight`].


use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use crate::config::ExportConfig;
use crate::delivery::{DeliveredFile, FileDelivery};
use crate::error::{Error, ErrorDetail, Result};
use crate::gateway::DirectoryGateway;
use crate::selection::SelectionState;
use crate::types::{Event, ExportRequest};
use crate::utils::export_filename;
use crate::validation::{DateRange, validate};

/// Result of an export trigger
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Payload fetched and delivered
    Delivered(DeliveredFile),
    /// Another export was still running; this trigger was ignored
    AlreadyInFlight,
}

/// Clears the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Runs validated exports one at a time (cloneable - clones share the in-flight flag)
#[derive(Clone)]
pub struct ExportOrchestrator {
    gateway: Arc<dyn DirectoryGateway>,
    delivery: Arc<dyn FileDelivery>,
    config: ExportConfig,
    in_flight: Arc<AtomicBool>,
    event_tx: broadcast::Sender<Event>,
    clock: fn() -> NaiveDateTime,
}

impl ExportOrchestrator {
    /// Create an orchestrator
    pub fn new(
        gateway: Arc<dyn DirectoryGateway>,
        delivery: Arc<dyn FileDelivery>,
        config: ExportConfig,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            gateway,
            delivery,
            config,
            in_flight: Arc::new(AtomicBool::new(false)),
            event_tx,
            clock: local_now,
        }
    }

    /// Override the clock used to timestamp filenames
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Whether an export is currently running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Export the order report for the given selection snapshot and range
    ///
    /// 1. Validate the range; on failure return `Error::Validation` without any
    ///    network call. `ExportFailed` is only broadcast when no export is running.
    /// 2. Build the request from the optional station and vendor (none means
    ///    "everything") and the validated dates.
    /// 3. Ignore the trigger if an export is already in flight.
    /// 4. Fetch the payload and deliver it as
    ///    `<prefix>_<YYYYMMDD>_<HHMMSS>.<server extension>`.
    ///
    /// On failure nothing is delivered and the caller's filters are untouched.
    /// There is no retry.
    pub async fn request_export(
        &self,
        selection: &SelectionState,
        range: &DateRange,
    ) -> Result<ExportOutcome> {
        let (start, end) = match validate(range) {
            Ok(dates) => dates,
            Err(reason) => {
                tracing::debug!(reason = %reason, "export rejected by date range validation");
                let error = Error::from(reason);
                // Export events describe the running export while one is in flight
                if !self.is_busy() {
                    self.emit(Event::ExportFailed {
                        error: ErrorDetail::from(&error),
                    });
                }
                return Err(error);
            }
        };

        let request = ExportRequest {
            station_id: selection.selected_station().map(|s| s.id),
            vendor_id: selection.selected_vendor().map(|v| v.id),
            start,
            end,
        };

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("export already in flight, ignoring trigger");
            return Ok(ExportOutcome::AlreadyInFlight);
        };

        tracing::info!(
            station_id = ?request.station_id,
            vendor_id = ?request.vendor_id,
            start = %request.start,
            end = %request.end,
            "starting order export"
        );
        self.emit(Event::ExportStarted {
            request: request.clone(),
        });

        match self.fetch_and_deliver(&request).await {
            Ok(file) => {
                self.emit(Event::ExportDelivered {
                    filename: file.filename.clone(),
                    size_bytes: file.size_bytes,
                });
                Ok(ExportOutcome::Delivered(file))
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "order export failed");
                self.emit(Event::ExportFailed {
                    error: ErrorDetail::from(&e),
                });
                Err(e)
            }
        }
    }

    async fn fetch_and_deliver(&self, request: &ExportRequest) -> Result<DeliveredFile> {
        let payload = self.gateway.export_report(request).await?;
        let extension = if payload.extension.is_empty() {
            &self.config.default_extension
        } else {
            &payload.extension
        };
        let filename = export_filename(&self.config.filename_prefix, (self.clock)(), extension);

        tracing::debug!(
            gateway = self.gateway.name(),
            filename = %filename,
            size_bytes = payload.len(),
            "delivering export payload"
        );
        self.delivery.deliver(payload.bytes, &filename).await
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
