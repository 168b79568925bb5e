//! # Checkout
//!
//! Everything that must be true before a sale is sent, and the request
//! that gets sent.
//!
//! ## Validation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart empty? ─────────────────────────────────────► EmptyCart           │
//! │       │                                                                 │
//! │  Trader view and no customer? ────────────────────► CustomerRequired    │
//! │       │                                                                 │
//! │  paying by debt and no customer? ─────────────────► CustomerRequired    │
//! │       │                                                                 │
//! │  (Trader view or debt) and balance < 0                                  │
//! │       and |balance| >= max_debt_allowed? ─────────► DebtLimitReached    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutRequest  (debt_amount = total when paying by debt)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A refused checkout makes no network call and changes nothing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartItem};
use crate::error::CheckoutError;
use crate::money::{Money, BPS_SCALE};
use crate::pricing::CartTotals;
use crate::types::{Customer, DiscountRate, PaymentMethod};
use crate::view::CheckoutView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutItem {
    pub variant_id: i64,
    pub quantity: i64,
    /// Reduction against the list price, negotiated price and line
    /// discount combined.
    pub discount_percent: DiscountRate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub customer_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub debt_amount: Option<Money>,
    pub notes: Option<String>,
}

/// Checks the pre-submit rules.
pub fn validate_checkout(
    cart: &Cart,
    view: CheckoutView,
    customer: Option<&Customer>,
    payment_method: PaymentMethod,
) -> Result<(), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let paying_by_debt = payment_method == PaymentMethod::Debt;

    if view.requires_customer() && customer.is_none() {
        return Err(CheckoutError::CustomerRequired {
            reason: "wholesale sales",
        });
    }
    if paying_by_debt && customer.is_none() {
        return Err(CheckoutError::CustomerRequired {
            reason: "debt payment",
        });
    }

    if let Some(customer) = customer {
        if (view.requires_customer() || paying_by_debt) && customer.debt_limit_reached() {
            return Err(CheckoutError::DebtLimitReached {
                customer: customer.name.clone(),
                debt: customer.debt(),
                limit: customer.max_debt_allowed,
            });
        }
    }

    Ok(())
}

/// Validates and builds the request for the checkout endpoint.
pub fn build_checkout_request(
    cart: &Cart,
    totals: &CartTotals,
    view: CheckoutView,
    customer: Option<&Customer>,
    payment_method: PaymentMethod,
    notes: Option<String>,
) -> Result<CheckoutRequest, CheckoutError> {
    validate_checkout(cart, view, customer, payment_method)?;

    Ok(CheckoutRequest {
        items: cart.items().iter().map(checkout_item).collect(),
        customer_id: customer.map(|c| c.id),
        payment_method,
        debt_amount: (payment_method == PaymentMethod::Debt).then_some(totals.total),
        notes: notes.filter(|n| !n.trim().is_empty()),
    })
}

/// The backend prices lines from the list price, so a negotiated price
/// travels as part of the discount.
fn checkout_item(item: &CartItem) -> CheckoutItem {
    let discount_percent = match item.original_price {
        Some(original) if original.is_positive() => {
            let list = original.multiply_quantity(item.quantity);
            let net = item.line_subtotal() - item.discount_amount;
            let bps = net.reduction_bps_from(list).clamp(0, BPS_SCALE as i64);
            DiscountRate::from_bps(bps as u32)
        }
        _ => item.discount_rate,
    };

    CheckoutItem {
        variant_id: item.variant_id,
        quantity: item.quantity,
        discount_percent,
    }
}
