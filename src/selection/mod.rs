//! Dependent station → vendor selection
//!
//! The machine owns the export screen's selection and is the only writer of
//! [`SelectionState`]. Each transition is applied under one lock acquisition, and
//! the lock is never held across an `.await`, so callers only ever observe states
//! between transitions.
//!
//! ## Stale vendor responses
//!
//! Every station change bumps `vendor_fetch_generation` before the vendor request
//! is issued, and the request is tagged with the new value in a
//! [`VendorFetchTicket`]. A response is applied only if its tag still equals the
//! live generation. If the user picks station A and then station B before A's
//! vendors arrive, A's response is discarded whatever order the two responses
//! come back in.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use orders_export::config::GatewayConfig;
//! use orders_export::gateway::HttpGateway;
//! use orders_export::selection::SelectionMachine;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(HttpGateway::new(GatewayConfig::default())?);
//! let (event_tx, _) = tokio::sync::broadcast::channel(64);
//! let machine = SelectionMachine::new(gateway, event_tx);
//!
//! let _ = machine.load_stations().await;
//! if let Some(station) = machine.snapshot().stations().first().cloned() {
//!     let _ = machine.select_station(station).await;
//! }
//! # Ok(())
//! # }
//! ```

mod state;


pub use state::{RejectReason, SelectionState, StationPhase, TransitionOutcome, VendorPhase};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use crate::error::{ErrorDetail, Result};
use crate::gateway::DirectoryGateway;
use crate::types::{Event, Station, StationId, Vendor};

/// Tag attached to an issued vendor fetch
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VendorFetchTicket {
    /// Station whose vendors were requested
    pub station_id: StationId,
    /// Generation at issue time
    pub generation: u64,
}

/// Owner of the export screen's selection state (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct SelectionMachine {
    gateway: Arc<dyn DirectoryGateway>,
    state: Arc<Mutex<SelectionState>>,
    event_tx: broadcast::Sender<Event>,
}

impl SelectionMachine {
    /// Create a machine in the `Idle` / `NoStationSelected` state
    pub fn new(gateway: Arc<dyn DirectoryGateway>, event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(SelectionState::default())),
            event_tx,
        }
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> SelectionState {
        self.lock().clone()
    }

    /// Subscribe to selection events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Fetch the station list (allowed once, from `Idle`)
    ///
    /// A failure still resolves to `Ready`, with an empty list and the error
    /// recorded, so the rest of the screen keeps working.
    pub async fn load_stations(&self) -> TransitionOutcome {
        {
            let mut state = self.lock();
            if state.station_phase != StationPhase::Idle {
                return self.reject(RejectReason::StationsAlreadyRequested);
            }
            state.station_phase = StationPhase::Loading;
        }

        let result = self.gateway.list_stations().await;

        let event = {
            let mut state = self.lock();
            state.station_phase = StationPhase::Ready;
            match result {
                Ok(stations) => {
                    let count = stations.len();
                    state.stations = stations;
                    state.station_error = None;
                    Event::StationsLoaded { count }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load stations");
                    let error = ErrorDetail::from(&e);
                    state.stations.clear();
                    state.station_error = Some(error.clone());
                    Event::StationsFailed { error }
                }
            }
        };

        self.emit(event);
        TransitionOutcome::Applied
    }

    /// Select a station and fetch its vendors
    ///
    /// Equivalent to [`begin_station_selection`](Self::begin_station_selection)
    /// followed by the gateway call and
    /// [`apply_vendor_response`](Self::apply_vendor_response).
    pub async fn select_station(&self, station: Station) -> TransitionOutcome {
        let ticket = match self.begin_station_selection(station) {
            Ok(ticket) => ticket,
            Err(reason) => return TransitionOutcome::Rejected(reason),
        };

        let result = self.gateway.list_vendors(ticket.station_id).await;
        self.apply_vendor_response(ticket, result);
        TransitionOutcome::Applied
    }

    /// First half of a station change: update state and issue a ticket
    ///
    /// In one update: selects `station`, clears the vendor and vendor list, bumps
    /// the generation and enters `VendorPhase::Loading`. The caller then fetches
    /// vendors for `ticket.station_id` and hands the result to
    /// [`apply_vendor_response`](Self::apply_vendor_response).
    ///
    /// Rejected until the station list has loaded, and for good once it failed.
    pub fn begin_station_selection(
        &self,
        station: Station,
    ) -> std::result::Result<VendorFetchTicket, RejectReason> {
        let ticket = {
            let mut state = self.lock();
            let rejected = if state.station_phase != StationPhase::Ready {
                Some(RejectReason::StationsNotReady)
            } else if state.station_error.is_some() {
                Some(RejectReason::StationsUnavailable)
            } else {
                None
            };
            if let Some(reason) = rejected {
                drop(state);
                tracing::debug!(reason = %reason, "station selection rejected");
                return Err(reason);
            }

            state.vendor_fetch_generation += 1;
            let ticket = VendorFetchTicket {
                station_id: station.id,
                generation: state.vendor_fetch_generation,
            };
            state.selected_station = Some(station);
            state.selected_vendor = None;
            state.vendor_list.clear();
            state.vendor_error = None;
            state.vendor_phase = VendorPhase::Loading;
            ticket
        };

        tracing::debug!(
            station_id = %ticket.station_id,
            generation = ticket.generation,
            "station selected, fetching vendors"
        );
        self.emit(Event::StationSelected {
            station_id: Some(ticket.station_id),
            generation: ticket.generation,
        });
        Ok(ticket)
    }

    /// Second half of a station change: apply a vendor response
    ///
    /// Returns `false` when the ticket is stale and the response was discarded.
    /// Vendors that claim a different station than the ticket are dropped.
    pub fn apply_vendor_response(
        &self,
        ticket: VendorFetchTicket,
        result: Result<Vec<Vendor>>,
    ) -> bool {
        let event = {
            let mut state = self.lock();
            let current = state.vendor_fetch_generation;
            if ticket.generation != current {
                drop(state);
                tracing::debug!(
                    generation = ticket.generation,
                    current_generation = current,
                    "discarding stale vendor response"
                );
                self.emit(Event::StaleVendorResponseDiscarded {
                    generation: ticket.generation,
                    current_generation: current,
                });
                return false;
            }

            match result {
                Ok(vendors) => {
                    let total = vendors.len();
                    let vendors: Vec<Vendor> = vendors
                        .into_iter()
                        .filter(|v| v.station_id == ticket.station_id)
                        .collect();
                    if vendors.len() != total {
                        tracing::warn!(
                            station_id = %ticket.station_id,
                            dropped = total - vendors.len(),
                            "vendor response contained vendors of another station"
                        );
                    }

                    let count = vendors.len();
                    state.vendor_list = vendors;
                    state.vendor_error = None;
                    state.vendor_phase = VendorPhase::Ready;
                    Event::VendorsLoaded {
                        station_id: ticket.station_id,
                        generation: ticket.generation,
                        count,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        station_id = %ticket.station_id,
                        error = %e,
                        "failed to load vendors"
                    );
                    let error = ErrorDetail::from(&e);
                    state.vendor_list.clear();
                    state.vendor_error = Some(error.clone());
                    state.vendor_phase = VendorPhase::Failed;
                    Event::VendorsFailed {
                        station_id: ticket.station_id,
                        generation: ticket.generation,
                        error,
                    }
                }
            }
        };

        self.emit(event);
        true
    }

    /// Select a vendor from the current vendor list
    ///
    /// Rejected unless the vendor list is ready and contains `vendor`.
    pub fn select_vendor(&self, vendor: &Vendor) -> TransitionOutcome {
        {
            let mut state = self.lock();
            if state.vendor_phase != VendorPhase::Ready {
                drop(state);
                return self.reject(RejectReason::VendorsNotReady);
            }
            let listed = state.vendor_list.iter().find(|v| *v == vendor).cloned();
            let Some(listed) = listed else {
                drop(state);
                return self.reject(RejectReason::VendorNotInList);
            };
            state.selected_vendor = Some(listed);
        }

        self.emit(Event::VendorSelected {
            vendor_id: Some(vendor.id),
        });
        TransitionOutcome::Applied
    }

    /// Drop the vendor filter, keeping the station
    pub fn clear_vendor_selection(&self) -> TransitionOutcome {
        let cleared = self.lock().selected_vendor.take().is_some();
        if cleared {
            self.emit(Event::VendorSelected { vendor_id: None });
        }
        TransitionOutcome::Applied
    }

    /// Drop the station filter (and with it the vendor filter)
    ///
    /// No fetch is issued. The generation is bumped so an in-flight vendor
    /// response for the previous station is discarded on arrival.
    pub fn clear_station_selection(&self) -> TransitionOutcome {
        let generation = {
            let mut state = self.lock();
            state.vendor_fetch_generation += 1;
            state.selected_station = None;
            state.selected_vendor = None;
            state.vendor_list.clear();
            state.vendor_error = None;
            state.vendor_phase = VendorPhase::NoStationSelected;
            state.vendor_fetch_generation
        };

        self.emit(Event::StationSelected {
            station_id: None,
            generation,
        });
        TransitionOutcome::Applied
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        // Transitions never panic mid-update, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reject(&self, reason: RejectReason) -> TransitionOutcome {
        tracing::debug!(reason = %reason, "selection intent rejected");
        TransitionOutcome::Rejected(reason)
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}
