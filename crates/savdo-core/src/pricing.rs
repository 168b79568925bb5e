//! # Pricing
//!
//! Values derived from the cart: totals, the hospitality service charge,
//! negotiated discount percentages and margin warnings.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal        = Σ price_used × qty                                   │
//! │  tax             = Σ tax_amount                                         │
//! │  discount        = Σ discount_amount                                    │
//! │  service_charge  = subtotal × 10%   (horeca, cafe, kitchen only)        │
//! │  total           = subtotal + tax − discount + service_charge           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is stored. Totals are recomputed from the lines on demand.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartItem};
use crate::money::Money;
use crate::types::{BusinessType, DiscountRate};
use crate::SERVICE_CHARGE_BPS;

/// Cart summary for display and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub service_charge: Money,
    pub total: Money,
}

impl CartTotals {
    /// Computes totals for a cart under the tenant's business type.
    ///
    /// `None` (business type not loaded yet) charges no service.
    pub fn compute(cart: &Cart, business_type: Option<BusinessType>) -> Self {
        let items = cart.items();
        let subtotal: Money = items.iter().map(CartItem::line_subtotal).sum();
        let tax: Money = items.iter().map(|i| i.tax_amount).sum();
        let discount: Money = items.iter().map(|i| i.discount_amount).sum();
        let service_charge = service_charge(subtotal, business_type);

        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal,
            tax,
            discount,
            service_charge,
            total: subtotal + tax - discount + service_charge,
        }
    }
}

/// 10% of the subtotal for hospitality businesses, zero otherwise.
pub fn service_charge(subtotal: Money, business_type: Option<BusinessType>) -> Money {
    match business_type {
        Some(bt) if bt.applies_service_charge() => subtotal.portion_bps(SERVICE_CHARGE_BPS),
        _ => Money::zero(),
    }
}

/// Reduction of the negotiated price against the list price.
///
/// ```text
/// original 100.00, final 80.00  →  2000 bps (20%)
/// no original price             →  0
/// final above original          →  0 (a markup is not a discount)
/// ```
pub fn discount_percent(item: &CartItem) -> DiscountRate {
    let Some(original) = item.original_price else {
        return DiscountRate::zero();
    };
    let bps = item.price_used().reduction_bps_from(original);
    DiscountRate::from_bps(u32::try_from(bps.max(0)).unwrap_or(u32::MAX))
}

/// Discount percent for a variant's line, zero when it is not in the cart.
pub fn line_discount_percent(cart: &Cart, variant_id: i64) -> DiscountRate {
    cart.get(variant_id)
        .map(discount_percent)
        .unwrap_or_default()
}

// =============================================================================
// Margin
// =============================================================================

/// Lowest price that keeps `min_margin_bps` over cost.
pub fn margin_floor(cost: Money, min_margin_bps: u32) -> Money {
    cost + cost.portion_bps(min_margin_bps)
}

/// True when the line is priced under the tenant's minimum margin.
///
/// Lines without a known cost are never flagged. Used to warn the trader
/// during negotiation, never to block a sale.
pub fn is_below_margin(item: &CartItem, min_margin_bps: u32) -> bool {
    let cost = item.variant.cost_price;
    cost.is_positive() && item.price_used() < margin_floor(cost, min_margin_bps)
}

/// Variant ids of every line under the margin floor.
pub fn lines_below_margin(cart: &Cart, min_margin_bps: u32) -> Vec<i64> {
    cart.items()
        .iter()
        .filter(|i| is_below_margin(i, min_margin_bps))
        .map(|i| i.variant_id)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
