//! One export screen session: gateway, selection machine and orchestrator wired
//! to a shared event channel.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::delivery::{DirectoryDelivery, FileDelivery};
use crate::error::Result;
use crate::export::{ExportOrchestrator, ExportOutcome};
use crate::gateway::{DirectoryGateway, HttpGateway};
use crate::selection::SelectionMachine;
use crate::types::Event;
use crate::validation::DateRange;

/// Export screen session (cloneable - all fields are Arc-wrapped)
///
/// # Examples
///
/// ```no_run
/// use chrono::NaiveDate;
/// use orders_export::config::{BearerToken, Config};
/// use orders_export::{DateRange, ExportSession};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.gateway.base_url = "https://backend.example.com/api/".to_string();
/// config.gateway.token = BearerToken::from_default_env();
///
/// let session = ExportSession::new(config)?;
/// let _ = session.selection().load_stations().await;
///
/// let range = DateRange::between(
///     NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2023, 6, 10).unwrap(),
/// );
/// let outcome = session.request_export(&range).await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ExportSession {
    selection: SelectionMachine,
    exporter: ExportOrchestrator,
    event_tx: broadcast::Sender<Event>,
}

impl ExportSession {
    /// Create a session talking HTTP and saving into `config.export.output_dir`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let gateway = HttpGateway::new(config.gateway.clone())?;
        let delivery = DirectoryDelivery::new(config.export.output_dir.clone());
        Ok(Self::with_parts(config, Arc::new(gateway), Arc::new(delivery)))
    }

    /// Create a session from explicit collaborators
    pub fn with_parts(
        config: Config,
        gateway: Arc<dyn DirectoryGateway>,
        delivery: Arc<dyn FileDelivery>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(config.event_capacity.max(1));
        tracing::debug!(gateway = gateway.name(), "creating export session");

        let selection = SelectionMachine::new(gateway.clone(), event_tx.clone());
        let exporter = ExportOrchestrator::new(gateway, delivery, config.export, event_tx.clone());

        Self {
            selection,
            exporter,
            event_tx,
        }
    }

    /// Station/vendor selection
    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    /// Export orchestrator
    pub fn exporter(&self) -> &ExportOrchestrator {
        &self.exporter
    }

    /// Subscribe to selection and export events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Export using a snapshot of the current selection
    pub async fn request_export(&self, range: &DateRange) -> Result<ExportOutcome> {
        let snapshot = self.selection.snapshot();
        self.exporter.request_export(&snapshot, range).await
    }
}
