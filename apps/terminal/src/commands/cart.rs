//! # Cart Commands
//!
//! Manual cart edits from the keyboard.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Customer │────►│   Sold   │       │
//! │  │  Cart    │     │          │     │ (trader) │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   scan / voice                      :pay (checkout.rs)  │
//! │                   :qty :inc :dec :rm                                    │
//! │                   :disc :price :pack                                    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   :clear ─────────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use savdo_client::CustomerDirectory;
use savdo_core::pricing::discount_percent;
use savdo_core::view::CheckoutView;
use savdo_core::{CartItemUpdate, CartTotals, Customer, DiscountRate, Money};
use tracing::{debug, info, warn};

use crate::error::{TerminalError, TerminalResult};
use crate::state::{PosStore, Session};

/// One cart line as shown to the cashier.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub variant_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub pack_qty: i64,
    pub unit_price: Money,
    pub original_price: Option<Money>,
    /// Reduction of the negotiated price against the list price.
    pub price_cut: DiscountRate,
    pub discount_amount: Money,
    pub total: Money,
    pub below_margin: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    /// `None` while the tenant has no usable business type.
    pub view: Option<CheckoutView>,
    pub customer: Option<Customer>,
}

impl From<&PosStore> for CartView {
    fn from(store: &PosStore) -> Self {
        let flagged = store.lines_below_margin();
        let lines = store
            .cart
            .items()
            .iter()
            .map(|item| CartLine {
                variant_id: item.variant_id,
                name: item.variant.display_name().to_string(),
                sku: item.variant.sku.clone(),
                quantity: item.quantity,
                pack_qty: item.pack_qty,
                unit_price: item.price_used(),
                original_price: item.original_price,
                price_cut: discount_percent(item),
                discount_amount: item.discount_amount,
                total: item.total,
                below_margin: flagged.contains(&item.variant_id),
            })
            .collect();

        CartView {
            lines,
            totals: store.totals(),
            view: store.view().ok(),
            customer: store.customer.clone(),
        }
    }
}

pub fn get_cart(session: &Session) -> CartView {
    session.state.with_store(|store| CartView::from(store))
}

/// Sets a line's quantity. Zero removes the line.
pub fn set_quantity(session: &Session, variant_id: i64, quantity: i64) -> TerminalResult<CartView> {
    debug!(variant_id, quantity, "set_quantity command");
    if quantity == 0 {
        return remove_item(session, variant_id);
    }

    session.state.with_store_mut(|store| {
        store.cart.update_cart_item(
            variant_id,
            CartItemUpdate {
                quantity: Some(quantity),
                ..CartItemUpdate::default()
            },
        )?;
        Ok(CartView::from(&*store))
    })
}

pub fn increment(session: &Session, variant_id: i64) -> TerminalResult<CartView> {
    session.state.with_store_mut(|store| {
        store.cart.increment_quantity(variant_id)?;
        Ok(CartView::from(&*store))
    })
}

/// Takes one unit off. The last unit removes the line.
pub fn decrement(session: &Session, variant_id: i64) -> TerminalResult<CartView> {
    session.state.with_store_mut(|store| {
        store.cart.decrement_quantity(variant_id)?;
        Ok(CartView::from(&*store))
    })
}

pub fn remove_item(session: &Session, variant_id: i64) -> TerminalResult<CartView> {
    session.state.with_store_mut(|store| {
        if !store.cart.remove_from_cart(variant_id) {
            return Err(TerminalError::not_found("Cart line", &variant_id.to_string()));
        }
        info!(variant_id, "Removed from cart");
        Ok(CartView::from(&*store))
    })
}

/// Applies a percentage discount to a line. Zero clears it.
pub fn set_discount(session: &Session, variant_id: i64, rate: DiscountRate) -> TerminalResult<CartView> {
    debug!(variant_id, bps = rate.bps(), "set_discount command");
    session.state.with_store_mut(|store| {
        store.cart.update_cart_item(
            variant_id,
            CartItemUpdate {
                discount_rate: Some(rate),
                ..CartItemUpdate::default()
            },
        )?;
        Ok(CartView::from(&*store))
    })
}

/// Sets a negotiated unit price. Prices under the margin floor are allowed
/// but logged and flagged on the line.
pub fn set_price(session: &Session, variant_id: i64, price: Money) -> TerminalResult<CartView> {
    session.state.with_store_mut(|store| {
        store.cart.update_wholesale_price(variant_id, price)?;
        let view = CartView::from(&*store);
        if view.lines.iter().any(|l| l.variant_id == variant_id && l.below_margin) {
            warn!(variant_id, %price, "Price is below the minimum margin");
        }
        Ok(view)
    })
}

/// Sets how many packs a line holds.
pub fn set_packs(session: &Session, variant_id: i64, packs: i64) -> TerminalResult<CartView> {
    session.state.with_store_mut(|store| {
        store.cart.update_pack_quantity(variant_id, packs)?;
        Ok(CartView::from(&*store))
    })
}

/// Empties the cart and drops the selected customer.
pub fn clear_cart(session: &Session) -> CartView {
    session.state.clear_cart();
    info!("Cart cleared");
    get_cart(session)
}

pub async fn list_customers(session: &Session) -> TerminalResult<Vec<Customer>> {
    Ok(session.backend.customers().await?)
}

/// Selects a customer by id, or deselects with `None`.
pub async fn select_customer(session: &Session, customer_id: Option<i64>) -> TerminalResult<Option<Customer>> {
    let Some(id) = customer_id else {
        session.state.select_customer(None);
        return Ok(None);
    };

    let customer = list_customers(session)
        .await?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| TerminalError::not_found("Customer", &id.to_string()))?;

    if customer.debt_limit_reached() {
        warn!(customer_id = id, debt = %customer.debt(), "Customer is at the debt limit");
    }
    info!(customer_id = id, name = %customer.name, "Customer selected");
    session.state.select_customer(Some(customer.clone()));
    Ok(Some(customer))
}
