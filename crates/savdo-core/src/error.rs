//! # Error Types
//!
//! Domain-specific error types for savdo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  savdo-core errors (this file)                                         │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── CheckoutError    - Pre-submit checkout blocks                     │
//! │  ├── ViewError        - Business type → view mapping failures          │
//! │  └── VoiceError       - Transcript parsing failures                    │
//! │                                                                         │
//! │  savdo-client errors (separate crate)                                  │
//! │  └── ClientError      - Transport and backend failures                 │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── TerminalError    - What the cashier sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TerminalError → Screen            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal. A failed operation leaves cart state untouched.

use thiserror::Error;

use crate::money::Money;
use crate::types::BusinessType;

// =============================================================================
// Core Error
// =============================================================================

/// Cart aggregate errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No cart line exists for the variant.
    #[error("Variant {0} is not in the cart")]
    ItemNotInCart(i64),

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity would exceed the maximum allowed.
    ///
    /// ## When This Occurs
    /// ```text
    /// Line qty: 9990, scan of a 24-pack
    ///      │
    ///      ▼
    /// 9990 + 24 > MAX_ITEM_QUANTITY
    ///      │
    ///      ▼
    /// QuantityTooLarge { requested: 10014, max: 9999 }
    /// ```
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the cart boundary before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Reasons a checkout is refused before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    /// Wholesale sales and debt payments must be attached to a customer.
    #[error("A customer must be selected for {reason}")]
    CustomerRequired { reason: &'static str },

    /// The customer already owes at least their allowed maximum.
    #[error("Customer {customer} has reached the debt limit: owes {debt}, limit {limit}")]
    DebtLimitReached {
        customer: String,
        debt: Money,
        limit: Money,
    },
}

// =============================================================================
// View Error
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("Business type is not configured for this tenant")]
    BusinessTypeNotConfigured,

    #[error("Business type '{0}' has no checkout view")]
    UnsupportedBusinessType(BusinessType),
}

// =============================================================================
// Voice Error
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("Nothing was heard")]
    EmptyTranscript,

    /// Only a quantity and filler words were spoken.
    #[error("No product named in '{0}'")]
    NoSearchTerm(String),

    #[error("Invalid quantity '{0}'")]
    InvalidQuantity(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLarge {
            requested: 10_014,
            max: 9_999,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 10014 exceeds maximum allowed (9999)"
        );

        let err = CheckoutError::DebtLimitReached {
            customer: "Akmal".to_string(),
            debt: Money::from_major(1000),
            limit: Money::from_major(1000),
        };
        assert_eq!(
            err.to_string(),
            "Customer Akmal has reached the debt limit: owes 1000.00, limit 1000.00"
        );
    }

    #[test]
    fn test_view_error_names_business_type() {
        let err = ViewError::UnsupportedBusinessType(BusinessType::Jewelry);
        assert_eq!(err.to_string(), "Business type 'jewelry' has no checkout view");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
