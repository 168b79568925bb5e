//! # Terminal Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Terminal                           │
//! │                                                                         │
//! │  :pay cash                                                              │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, TerminalError>                                        │  │
//! │  │         │                                                        │  │
//! │  │  Blocked locally? ── CheckoutError::EmptyCart ──────┐            │  │
//! │  │         │                                           │            │  │
//! │  │  Backend failed?  ── ClientError::Api { 400 } ──── TerminalError │  │
//! │  │         │                                           │            │  │
//! │  │  Success ─────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The REPL prints "[CheckoutBlocked] Cart is empty" and carries on.      │
//! │  No error ends the session.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use savdo_client::ClientError;
use savdo_core::{CheckoutError, CoreError, ValidationError, ViewError, VoiceError};
use serde::Serialize;
use thiserror::Error;

/// Error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CHECKOUT_BLOCKED",
///   "message": "A customer must be selected for wholesale sales"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct TerminalError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

pub type TerminalResult<T> = Result<T, TerminalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown code, variant or cart line. Quick-add is offered for scans.
    NotFound,

    /// Input rejected before any network call
    ValidationError,

    /// Cart limits
    CartError,

    /// Checkout rules failed locally (empty cart, missing customer, debt)
    CheckoutBlocked,

    /// Tenant has no usable business type
    ConfigurationError,

    /// Backend unreachable or timed out
    NetworkError,

    /// Backend answered with an error
    BackendError,

    /// No token, or the backend rejected it
    Unauthorized,

    /// Voice input is switched off
    VoiceUnavailable,

    Internal,
}

impl TerminalError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        TerminalError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        TerminalError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TerminalError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TerminalError::new(ErrorCode::Internal, message)
    }

    pub fn voice_unavailable() -> Self {
        TerminalError::new(
            ErrorCode::VoiceUnavailable,
            "Voice input is disabled on this till",
        )
    }
}

impl From<CoreError> for TerminalError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotInCart(id) => TerminalError::not_found("Cart line", &id.to_string()),
            e @ CoreError::CartTooLarge { .. } => TerminalError::new(ErrorCode::CartError, e.to_string()),
            e @ CoreError::QuantityTooLarge { .. } => TerminalError::validation(e.to_string()),
            CoreError::Validation(e) => TerminalError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for TerminalError {
    fn from(err: ValidationError) -> Self {
        TerminalError::validation(err.to_string())
    }
}

impl From<CheckoutError> for TerminalError {
    fn from(err: CheckoutError) -> Self {
        TerminalError::new(ErrorCode::CheckoutBlocked, err.to_string())
    }
}

impl From<ViewError> for TerminalError {
    fn from(err: ViewError) -> Self {
        TerminalError::new(ErrorCode::ConfigurationError, err.to_string())
    }
}

impl From<VoiceError> for TerminalError {
    fn from(err: VoiceError) -> Self {
        TerminalError::validation(err.to_string())
    }
}

impl From<ClientError> for TerminalError {
    fn from(err: ClientError) -> Self {
        if err.is_unauthorized() {
            return TerminalError::new(
                ErrorCode::Unauthorized,
                "Not logged in. Use :login <username> <password>",
            );
        }
        if err.is_network() {
            tracing::warn!(error = %err, "Backend unreachable");
            return TerminalError::new(ErrorCode::NetworkError, "Backend unreachable, try again");
        }

        match err {
            ClientError::Api { status: 404, detail } => TerminalError::new(ErrorCode::NotFound, detail),
            ClientError::Api { detail, .. } => TerminalError::new(ErrorCode::BackendError, detail),
            ClientError::Http(e) => TerminalError::new(ErrorCode::NetworkError, e.to_string()),
            ClientError::Decode(e) => {
                tracing::error!("Unexpected backend response: {}", e);
                TerminalError::new(ErrorCode::BackendError, "Unexpected backend response")
            }
            e @ (ClientError::InvalidUrl(_)
            | ClientError::InvalidConfig(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_)) => {
                TerminalError::new(ErrorCode::ConfigurationError, e.to_string())
            }
            e @ (ClientError::Io(_) | ClientError::NoToken) => TerminalError::internal(e.to_string()),
        }
    }
}

impl From<std::io::Error> for TerminalError {
    fn from(err: std::io::Error) -> Self {
        TerminalError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let err = TerminalError::from(CheckoutError::EmptyCart);
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "CHECKOUT_BLOCKED");
        assert_eq!(json["message"], "Cart is empty");
        assert_eq!(err.to_string(), "[CheckoutBlocked] Cart is empty");
    }

    #[test]
    fn test_client_errors_map_to_codes() {
        let rejected = TerminalError::from(ClientError::Api {
            status: 400,
            detail: "Insufficient stock".into(),
        });
        assert_eq!(rejected.code, ErrorCode::BackendError);
        assert_eq!(rejected.message, "Insufficient stock");

        let missing = TerminalError::from(ClientError::Api {
            status: 404,
            detail: "Product not found".into(),
        });
        assert_eq!(missing.code, ErrorCode::NotFound);

        assert_eq!(TerminalError::from(ClientError::NoToken).code, ErrorCode::Unauthorized);
        let expired = ClientError::Api {
            status: 401,
            detail: "Could not validate credentials".into(),
        };
        assert_eq!(TerminalError::from(expired).code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_core_errors_map_to_codes() {
        assert_eq!(TerminalError::from(CoreError::ItemNotInCart(7)).code, ErrorCode::NotFound);
        assert_eq!(
            TerminalError::from(CoreError::CartTooLarge { max: 100 }).code,
            ErrorCode::CartError
        );
        assert_eq!(
            TerminalError::from(ViewError::BusinessTypeNotConfigured).code,
            ErrorCode::ConfigurationError
        );
        assert_eq!(
            TerminalError::from(VoiceError::EmptyTranscript).code,
            ErrorCode::ValidationError
        );
    }
}
