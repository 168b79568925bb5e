//! # Client Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Transport      │  │   Backend       │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Http           │  │  Api {status,   │  │  InvalidConfig          │ │
//! │  │  InvalidUrl     │  │       detail}   │  │  ConfigLoadFailed       │ │
//! │  │                 │  │  NoToken        │  │  ConfigSaveFailed       │ │
//! │  │                 │  │  Decode         │  │  Io                     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No request is retried. The caller shows the message and the cashier
//! decides what to do.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection refused, timeout, TLS failure or a body that did not
    /// deserialize.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Non-2xx response. `detail` is the backend's `{"detail": ...}` text
    /// when present, else the raw body.
    #[error("Backend returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Not logged in")]
    NoToken,

    /// A 2xx body that made no sense (a price that is not a number).
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of a backend rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure happened before the backend could answer.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::NoToken) || self.status() == Some(401)
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
