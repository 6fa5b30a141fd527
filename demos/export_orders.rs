//! Order export example
//!
//! This example walks the export screen workflow end to end:
//! - Reading the bearer token from the environment
//! - Loading stations and picking the first one
//! - Picking the first vendor of that station
//! - Exporting the last seven days into `./downloads`
//!
//! Run with `ORDERS_API_TOKEN=... cargo run --example export_orders -- http://host:8080/api/`

use chrono::{Duration, Local};
use orders_export::config::{BearerToken, Config};
use orders_export::{DateRange, Event, ExportOutcome, ExportSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let mut config = Config::default();
    if let Some(base_url) = std::env::args().nth(1) {
        config.gateway.base_url = base_url;
    }
    config.gateway.token = BearerToken::from_default_env();
    if config.gateway.token.is_none() {
        eprintln!("warning: ORDERS_API_TOKEN is not set, requests will be refused");
    }

    let session = ExportSession::new(config)?;

    // Subscribe to events
    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::StationsLoaded { count } => println!("✓ {} stations available", count),
                Event::StationsFailed { error } => println!("✗ Stations: {}", error.message),
                Event::VendorsLoaded {
                    station_id, count, ..
                } => println!("✓ {} vendors for station {}", count, station_id),
                Event::VendorsFailed { error, .. } => println!("✗ Vendors: {}", error.message),
                Event::ExportStarted { request } => {
                    println!("→ Exporting {} to {}", request.start, request.end)
                }
                Event::ExportDelivered {
                    filename,
                    size_bytes,
                } => println!("✓ Saved {} ({} bytes)", filename, size_bytes),
                Event::ExportFailed { error } => println!("✗ Export: {}", error.message),
                _ => {}
            }
        }
    });

    let selection = session.selection();
    let _ = selection.load_stations().await;

    if let Some(station) = selection.snapshot().stations().first().cloned() {
        println!("Selecting station {}", station.name);
        let _ = selection.select_station(station).await;

        if let Some(vendor) = selection.snapshot().vendor_list().first().cloned() {
            println!("Selecting vendor {}", vendor.name);
            let _ = selection.select_vendor(&vendor);
        }
    }

    let today = Local::now().date_naive();
    let range = DateRange::between(today - Duration::days(7), today);

    match session.request_export(&range).await {
        Ok(ExportOutcome::Delivered(file)) => {
            if let Some(path) = file.path {
                println!("Report written to {}", path.display());
            }
        }
        Ok(ExportOutcome::AlreadyInFlight) => println!("An export is already running"),
        Err(e) => eprintln!("Export failed: {}", e.user_message()),
    }

    Ok(())
}
