//! Configuration types for orders-export

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::error::{Error, Result};

/// Environment variable read by [`BearerToken::from_default_env`]
pub const DEFAULT_TOKEN_ENV: &str = "ORDERS_API_TOKEN";

/// Bearer credential attached to every backend request
///
/// The token is injected explicitly through [`GatewayConfig`]; the library never
/// looks it up from ambient storage on its own. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read a token from the given environment variable
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    /// Read a token from `ORDERS_API_TOKEN`
    pub fn from_default_env() -> Option<Self> {
        Self::from_env(DEFAULT_TOKEN_ENV)
    }

    /// The raw token value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Endpoint paths, relative to [`GatewayConfig::base_url`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Station listing (default: "stations")
    #[serde(default = "default_stations_path")]
    pub stations: String,

    /// Vendors of one station; `{stationId}` is replaced with the station id
    /// (default: "vendors/station/{stationId}")
    #[serde(default = "default_vendors_path")]
    pub vendors_by_station: String,

    /// Order report export (default: "orders/export")
    #[serde(default = "default_export_path")]
    pub export: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            stations: default_stations_path(),
            vendors_by_station: default_vendors_path(),
            export: default_export_path(),
        }
    }
}

/// Remote backend configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the REST backend (default: "http://localhost:8080/api/")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer credential; requests fail with an auth error when absent
    #[serde(default)]
    pub token: Option<BearerToken>,

    /// Endpoint paths
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Page size requested for vendor listings (default: 1000)
    ///
    /// The screen does not paginate vendors, so this is large enough to cover
    /// every vendor of a station in one page.
    #[serde(default = "default_vendor_page_size")]
    pub vendor_page_size: u32,

    /// Transport timeout per request (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            endpoints: EndpointConfig::default(),
            vendor_page_size: default_vendor_page_size(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Export file naming
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Filename prefix (default: "orders_export")
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,

    /// Extension used when the server declares none (default: "xlsx")
    #[serde(default = "default_extension")]
    pub default_extension: String,

    /// Directory used by [`DirectoryDelivery`](crate::delivery::DirectoryDelivery)
    /// (default: "./downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: default_filename_prefix(),
            default_extension: default_extension(),
            output_dir: default_output_dir(),
        }
    }
}

/// Main configuration for an [`ExportSession`](crate::ExportSession)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote backend
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Export file naming and destination
    #[serde(default)]
    pub export: ExportConfig,

    /// Capacity of the event broadcast channel (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Config {
    /// Check settings that would otherwise fail on first use
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.gateway.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", self.gateway.base_url, e),
            key: Some("gateway.base_url".to_string()),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("base URL '{}' cannot be a base", self.gateway.base_url),
                key: Some("gateway.base_url".to_string()),
            });
        }

        if self.gateway.vendor_page_size == 0 {
            return Err(Error::Config {
                message: "vendor page size must be at least 1".to_string(),
                key: Some("gateway.vendor_page_size".to_string()),
            });
        }

        if !self
            .gateway
            .endpoints
            .vendors_by_station
            .contains(STATION_ID_PLACEHOLDER)
        {
            return Err(Error::Config {
                message: format!(
                    "vendors endpoint must contain the {} placeholder",
                    STATION_ID_PLACEHOLDER
                ),
                key: Some("gateway.endpoints.vendors_by_station".to_string()),
            });
        }

        if self.event_capacity == 0 {
            return Err(Error::Config {
                message: "event capacity must be at least 1".to_string(),
                key: Some("event_capacity".to_string()),
            });
        }

        Ok(())
    }
}

/// Placeholder substituted in [`EndpointConfig::vendors_by_station`]
pub const STATION_ID_PLACEHOLDER: &str = "{stationId}";

fn default_base_url() -> String {
    "http://localhost:8080/api/".to_string()
}

fn default_stations_path() -> String {
    "stations".to_string()
}

fn default_vendors_path() -> String {
    format!("vendors/station/{}", STATION_ID_PLACEHOLDER)
}

fn default_export_path() -> String {
    "orders/export".to_string()
}

fn default_vendor_page_size() -> u32 {
    1000
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_filename_prefix() -> String {
    "orders_export".to_string()
}

fn default_extension() -> String {
    "xlsx".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_event_capacity() -> usize {
    256
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
