//! Backend fixtures: a wiremock server answering like the orders REST API

use orders_export::config::{BearerToken, Config};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token every fixture endpoint requires
pub const TEST_TOKEN: &str = "integration-token";

/// Spreadsheet MIME type the export endpoint answers with
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Bytes standing in for a spreadsheet (zip magic + filler)
pub const XLSX_BYTES: &[u8] = &[0x50, 0x4b, 0x03, 0x04, 0x14, 0x00, 0x06, 0x00];

/// Session config pointing at `server`
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.gateway.base_url = format!("{}/api/", server.uri());
    config.gateway.token = Some(BearerToken::new(TEST_TOKEN));
    config
}

/// Mount `GET /api/stations` answering one station, "Central"
pub async fn mount_central_station(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Central", "code": "CEN"}
        ])))
        .mount(server)
        .await;
}

/// Mount `GET /api/vendors/station/1` answering vendor 9, "Acme"
pub async fn mount_acme_vendor(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/vendors/station/1"))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "name": "Acme", "stationId": 1}
        ])))
        .expect(1)
        .mount(server)
        .await;
}
