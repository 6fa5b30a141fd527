//! Shared test helpers: fixtures and a scriptable gateway.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::gateway::{DirectoryGateway, ExportPayload};
use crate::types::{ExportRequest, Station, StationId, Vendor, VendorId};

pub(crate) fn station(id: i64, name: &str) -> Station {
    Station {
        id: StationId(id),
        name: name.to_string(),
        code: name.chars().take(3).collect::<String>().to_uppercase(),
    }
}

pub(crate) fn vendor(id: i64, name: &str, station_id: i64) -> Vendor {
    Vendor {
        id: VendorId(id),
        name: name.to_string(),
        station_id: StationId(station_id),
    }
}

pub(crate) fn server_error(message: &str) -> Error {
    Error::Server {
        status: 500,
        message: message.to_string(),
    }
}

/// Yield until `condition` holds (fails the test after one second)
pub(crate) async fn settle_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached");
}

/// Gateway double with canned answers, call recording and release gates
///
/// Errors are scripted as messages and surface as `Error::Server { status: 500 }`.
#[derive(Default)]
pub(crate) struct StubGateway {
    stations: Option<std::result::Result<Vec<Station>, String>>,
    vendors: HashMap<StationId, std::result::Result<Vec<Vendor>, String>>,
    export: Option<std::result::Result<ExportPayload, String>>,
    vendor_gates: Mutex<HashMap<StationId, oneshot::Receiver<()>>>,
    export_gate: Mutex<Option<oneshot::Receiver<()>>>,
    station_calls: AtomicUsize,
    vendor_calls: Mutex<Vec<StationId>>,
    export_calls: Mutex<Vec<ExportRequest>>,
}

impl StubGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_stations(mut self, stations: Vec<Station>) -> Self {
        self.stations = Some(Ok(stations));
        self
    }

    pub(crate) fn with_station_failure(mut self, message: &str) -> Self {
        self.stations = Some(Err(message.to_string()));
        self
    }

    pub(crate) fn with_vendors(mut self, station_id: i64, vendors: Vec<Vendor>) -> Self {
        self.vendors.insert(StationId(station_id), Ok(vendors));
        self
    }

    pub(crate) fn with_vendor_failure(mut self, station_id: i64, message: &str) -> Self {
        self.vendors
            .insert(StationId(station_id), Err(message.to_string()));
        self
    }

    pub(crate) fn with_export(mut self, bytes: &[u8], extension: &str) -> Self {
        self.export = Some(Ok(ExportPayload {
            bytes: bytes.to_vec(),
            extension: extension.to_string(),
            content_type: None,
        }));
        self
    }

    pub(crate) fn with_export_failure(mut self, message: &str) -> Self {
        self.export = Some(Err(message.to_string()));
        self
    }

    /// Hold vendor responses for `station_id` until the returned sender fires
    pub(crate) fn gate_vendors(&self, station_id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.vendor_gates
            .lock()
            .unwrap()
            .insert(StationId(station_id), rx);
        tx
    }

    /// Hold the next export response until the returned sender fires
    pub(crate) fn gate_export(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.export_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub(crate) fn station_calls(&self) -> usize {
        self.station_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn vendor_calls(&self) -> Vec<StationId> {
        self.vendor_calls.lock().unwrap().clone()
    }

    pub(crate) fn export_calls(&self) -> Vec<ExportRequest> {
        self.export_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryGateway for StubGateway {
    async fn list_stations(&self) -> Result<Vec<Station>> {
        self.station_calls.fetch_add(1, Ordering::SeqCst);
        match &self.stations {
            Some(Ok(stations)) => Ok(stations.clone()),
            Some(Err(message)) => Err(server_error(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_vendors(&self, station_id: StationId) -> Result<Vec<Vendor>> {
        self.vendor_calls.lock().unwrap().push(station_id);

        let gate = self.vendor_gates.lock().unwrap().remove(&station_id);
        if let Some(gate) = gate {
            // A dropped sender releases the gate as well
            let _ = gate.await;
        }

        match self.vendors.get(&station_id) {
            Some(Ok(vendors)) => Ok(vendors.clone()),
            Some(Err(message)) => Err(server_error(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn export_report(&self, request: &ExportRequest) -> Result<ExportPayload> {
        self.export_calls.lock().unwrap().push(request.clone());

        let gate = self.export_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match &self.export {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(message)) => Err(server_error(message)),
            None => Ok(ExportPayload {
                bytes: Vec::new(),
                extension: "xlsx".to_string(),
                content_type: None,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
