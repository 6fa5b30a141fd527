//! Selection state and its phases

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorDetail;
use crate::types::{Station, Vendor};

/// Station list lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Station list request in flight
    Loading,
    /// Request resolved, successfully or not (see [`SelectionState::station_error`])
    Ready,
}

/// Vendor sub-state, orthogonal to the station phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorPhase {
    /// No station selected, no vendors to show
    #[default]
    NoStationSelected,
    /// Vendor list for the selected station in flight
    Loading,
    /// Vendor list available
    Ready,
    /// Vendor list request failed; vendor selection disabled
    Failed,
}

/// Snapshot of the export screen's selection
///
/// Fields are read-only outside the machine; every change goes through a
/// [`SelectionMachine`](super::SelectionMachine) transition applied as one update.
///
/// Invariant: a selected vendor always belongs to the selected station.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SelectionState {
    pub(crate) station_phase: StationPhase,
    pub(crate) stations: Vec<Station>,
    pub(crate) station_error: Option<ErrorDetail>,
    pub(crate) selected_station: Option<Station>,
    pub(crate) vendor_phase: VendorPhase,
    pub(crate) vendor_list: Vec<Vendor>,
    pub(crate) vendor_error: Option<ErrorDetail>,
    pub(crate) selected_vendor: Option<Vendor>,
    pub(crate) vendor_fetch_generation: u64,
}

impl SelectionState {
    /// Station list lifecycle
    pub fn station_phase(&self) -> StationPhase {
        self.station_phase
    }

    /// Fetched stations (empty until loaded or after a failure)
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Error recorded by the last station list request
    pub fn station_error(&self) -> Option<&ErrorDetail> {
        self.station_error.as_ref()
    }

    /// Currently selected station
    pub fn selected_station(&self) -> Option<&Station> {
        self.selected_station.as_ref()
    }

    /// Vendor sub-state
    pub fn vendor_phase(&self) -> VendorPhase {
        self.vendor_phase
    }

    /// Vendors of the selected station
    pub fn vendor_list(&self) -> &[Vendor] {
        &self.vendor_list
    }

    /// Error recorded by the last applied vendor list request
    pub fn vendor_error(&self) -> Option<&ErrorDetail> {
        self.vendor_error.as_ref()
    }

    /// Currently selected vendor (None = all vendors of the station)
    pub fn selected_vendor(&self) -> Option<&Vendor> {
        self.selected_vendor.as_ref()
    }

    /// Tag of the most recently issued vendor fetch
    pub fn vendor_fetch_generation(&self) -> u64 {
        self.vendor_fetch_generation
    }

    /// Whether the station list request is in flight
    pub fn is_loading_stations(&self) -> bool {
        self.station_phase == StationPhase::Loading
    }

    /// Whether a vendor list request is in flight
    pub fn is_loading_vendors(&self) -> bool {
        self.vendor_phase == VendorPhase::Loading
    }

    /// Whether the station control should accept input
    ///
    /// A failed station list leaves this false; the rest of the screen stays usable.
    pub fn can_select_station(&self) -> bool {
        self.station_phase == StationPhase::Ready && self.station_error.is_none()
    }

    /// Whether the vendor control should accept input
    pub fn can_select_vendor(&self) -> bool {
        self.vendor_phase == VendorPhase::Ready
    }

    /// Check the station/vendor scoping invariant
    pub fn is_consistent(&self) -> bool {
        match (&self.selected_station, &self.selected_vendor) {
            (_, None) => true,
            (Some(station), Some(vendor)) => vendor.station_id == station.id,
            (None, Some(_)) => false,
        }
    }
}

/// Outcome of a selection intent
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The state changed (or a request was issued)
    Applied,
    /// The intent was not allowed in the current state; nothing changed
    Rejected(RejectReason),
}

impl TransitionOutcome {
    /// Whether the intent was applied
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied)
    }
}

/// Why a selection intent was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// `load_stations` already ran
    #[error("station list was already requested")]
    StationsAlreadyRequested,

    /// Station list has not resolved yet
    #[error("station list is not ready")]
    StationsNotReady,

    /// Station list failed to load
    #[error("station list is unavailable")]
    StationsUnavailable,

    /// Vendor list is loading, failed, or no station is selected
    #[error("vendor list is not ready")]
    VendorsNotReady,

    /// Vendor is not part of the current vendor list
    #[error("vendor is not offered for the selected station")]
    VendorNotInList,
}
