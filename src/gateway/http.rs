//! reqwest-backed gateway

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::traits::{DirectoryGateway, ExportPayload};
use crate::config::{BearerToken, GatewayConfig, STATION_ID_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::types::{ExportRequest, Station, StationId, Vendor};
use crate::utils::declared_extension;

/// Vendor listings come back either as a bare array or as a page object
#[derive(Deserialize)]
#[serde(untagged)]
enum VendorListing {
    Plain(Vec<Vendor>),
    Page { content: Vec<Vendor> },
}

impl VendorListing {
    fn into_vendors(self) -> Vec<Vendor> {
        match self {
            VendorListing::Plain(vendors) | VendorListing::Page { content: vendors } => vendors,
        }
    }
}

/// Gateway talking to the REST backend over HTTP
///
/// Every request carries `Authorization: Bearer <token>`. When no token is
/// configured the call fails with `Error::Auth` before anything is sent.
///
/// # Examples
///
/// ```no_run
/// use orders_export::config::{BearerToken, GatewayConfig};
/// use orders_export::gateway::{DirectoryGateway, HttpGateway};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = HttpGateway::new(GatewayConfig {
///     base_url: "https://backend.example.com/api/".to_string(),
///     token: BearerToken::from_default_env(),
///     ..Default::default()
/// })?;
///
/// for station in gateway.list_stations().await? {
///     println!("{} ({})", station.name, station.code);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Create a gateway from its configuration
    ///
    /// Fails with `Error::Config` when the base URL cannot be parsed.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        // Without a trailing slash `Url::join` would drop the last path segment
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", config.base_url, e),
            key: Some("gateway.base_url".to_string()),
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {}", e),
                key: None,
            })?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    fn token(&self) -> Result<&BearerToken> {
        self.config
            .token
            .as_ref()
            .ok_or_else(|| Error::Auth("no bearer token configured".to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config {
                message: format!("invalid endpoint path '{}': {}", path, e),
                key: Some("gateway.endpoints".to_string()),
            })
    }

    /// Send an authenticated GET and turn non-2xx answers into errors
    async fn get(&self, url: Url, query: &[(&str, String)]) -> Result<reqwest::Response> {
        // Checked before building the request so nothing leaves the process
        let token = self.token()?;

        tracing::debug!(url = %url, "sending backend request");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose())
            .query(query)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.get(url, query).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DirectoryGateway for HttpGateway {
    async fn list_stations(&self) -> Result<Vec<Station>> {
        let url = self.endpoint(&self.config.endpoints.stations)?;
        let stations: Vec<Station> = self.get_json(url, &[]).await?;
        tracing::debug!(count = stations.len(), "stations fetched");
        Ok(stations)
    }

    async fn list_vendors(&self, station_id: StationId) -> Result<Vec<Vendor>> {
        let path = self
            .config
            .endpoints
            .vendors_by_station
            .replace(STATION_ID_PLACEHOLDER, &station_id.to_string());
        let url = self.endpoint(&path)?;
        let query = [
            ("page", "0".to_string()),
            ("size", self.config.vendor_page_size.to_string()),
        ];

        let listing: VendorListing = self.get_json(url, &query).await?;
        let vendors = listing.into_vendors();
        tracing::debug!(station_id = %station_id, count = vendors.len(), "vendors fetched");
        Ok(vendors)
    }

    async fn export_report(&self, request: &ExportRequest) -> Result<ExportPayload> {
        let url = self.endpoint(&self.config.endpoints.export)?;
        let response = self.get(url, &request.query_pairs()).await?;

        let headers = response.headers().clone();
        let extension = declared_extension(&headers).unwrap_or_default();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        tracing::debug!(
            size_bytes = bytes.len(),
            extension = %extension,
            "export payload received"
        );

        Ok(ExportPayload {
            bytes,
            extension,
            content_type,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Build the error for a non-2xx response
///
/// 401 and 403 map to `Error::Auth`; everything else to `Error::Server`.
async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = server_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    tracing::warn!(status = status.as_u16(), message = %message, "backend rejected request");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(message),
        _ => Error::Server {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull a human-readable message out of an error body
///
/// JSON bodies are searched for `message`, `error` or `detail`; any other
/// non-empty body is used as-is.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error", "detail"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str())
                && !message.is_empty()
            {
                return Some(message.to_string());
            }
        }
    }

    Some(trimmed.to_string())
}
