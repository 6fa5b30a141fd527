//! Error types for orders-export
//!
//! This module provides the error taxonomy shared by every component:
//! - Credential failures (`Auth`) raised before any request leaves the process
//! - Transport failures (`Network`) surfaced verbatim from the HTTP client
//! - Non-2xx responses (`Server`) carrying the server-supplied message
//! - Client-side precondition failures (`Validation`) that never reach the wire
//!
//! Components recover errors at their own boundary and record them as an
//! [`ErrorDetail`], which is cloneable and suitable for display.

use crate::validation::RangeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for orders-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for orders-export
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or rejected bearer credential
    #[error("authentication error: {0}")]
    Auth(String),

    /// Transport failure talking to the backend
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code returned by the backend
        status: u16,
        /// Message supplied by the backend (or the status reason when it sent none)
        message: String,
    },

    /// Client-side precondition failure (never sent over the wire)
    #[error("validation error: {0}")]
    Validation(#[from] RangeError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "gateway.base_url")
        key: Option<String>,
    },

    /// Response body could not be decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while materializing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The delivery target refused the file
    #[error("failed to deliver {path}: {reason}")]
    Delivery {
        /// Path the file was going to be written to
        path: PathBuf,
        /// Why delivery failed
        reason: String,
    },
}

/// Coarse error classification shown to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid credential
    Auth,
    /// Transport failure
    Network,
    /// Non-2xx response
    Server,
    /// Client-side precondition failure
    Validation,
    /// Anything local to this process (config, I/O, decoding, delivery)
    Internal,
}

impl Error {
    /// Classify the error into one of the user-facing kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth(_) => ErrorKind::Auth,
            Error::Network(_) => ErrorKind::Network,
            Error::Server { .. } => ErrorKind::Server,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Config { .. }
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Delivery { .. } => ErrorKind::Internal,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth_error",
            Error::Network(_) => "network_error",
            Error::Server { .. } => "server_error",
            Error::Validation(e) => match e {
                RangeError::MissingStart => "missing_start",
                RangeError::MissingEnd => "missing_end",
                RangeError::EndBeforeStart { .. } => "end_before_start",
            },
            Error::Config { .. } => "config_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::Delivery { .. } => "delivery_error",
        }
    }

    /// Message suitable for showing next to the control that triggered the call
    ///
    /// Server and validation messages are surfaced verbatim, without the
    /// category prefix used by `Display`.
    pub fn user_message(&self) -> String {
        match self {
            Error::Server { message, .. } => message.clone(),
            Error::Validation(e) => e.to_string(),
            Error::Auth(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Recorded, cloneable form of an [`Error`]
///
/// Selection state and events keep errors in this form so snapshots stay `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Coarse classification
    pub kind: ErrorKind,

    /// Machine-readable error code (e.g., "server_error", "missing_start")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status for server errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&Error> for ErrorDetail {
    fn from(error: &Error) -> Self {
        let status = match error {
            Error::Server { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        };

        Self {
            kind: error.kind(),
            code: error.error_code().to_string(),
            message: error.user_message(),
            status,
        }
    }
}

impl From<Error> for ErrorDetail {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}
