//! # Cart Aggregate
//!
//! The line-item cart and every mutation on it.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Aggregate Operations                            │
//! │                                                                         │
//! │  Input                     Operation                 Line Change        │
//! │  ─────                     ─────────                 ───────────        │
//! │                                                                         │
//! │  Scan / voice / tap ─────► add_to_cart() ──────────► qty += n or push   │
//! │                                                                         │
//! │  Pack scan ──────────────► add_pack() ─────────────► qty += units       │
//! │                                                                         │
//! │  +/- buttons ────────────► increment / decrement ──► qty ± 1 (1 → gone) │
//! │                                                                         │
//! │  Edit line ──────────────► update_cart_item() ─────► merge + recompute  │
//! │                                                                         │
//! │  Trader negotiates ──────► update_wholesale_price()► final_price = p    │
//! │                                                                         │
//! │  Trader sets packs ──────► update_pack_quantity() ─► qty from packs     │
//! │                                                                         │
//! │  NOTE: every mutation that touches price, quantity, discount or tax     │
//! │        ends in CartItem::recompute(), so the line invariant holds.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Invariant
//! ```text
//! total == (price_used × quantity − discount_amount) + tax_amount
//! price_used = final_price.unwrap_or(unit_price)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountRate, ProductVariant, TaxRate};
use crate::validation::{
    validate_cart_size, validate_pack_quantity, validate_price_cents, validate_quantity,
    validate_rate_bps,
};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Pack Quantity Mode
// =============================================================================

/// How `update_pack_quantity` turns a pack count into a unit quantity.
///
/// ```text
/// Line: 24-unit pack, pack_qty = 2, quantity = 48
///
/// update_pack_quantity(3)
///   Absolute     → quantity = 3 × 24 = 72
///   Compounding  → quantity = 3 × 2  = 6     (multiplies the old pack count)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PackQuantityMode {
    /// Pack count times the detected units per pack.
    #[default]
    Absolute,
    /// New pack count times the previous pack count. Kept for tenants whose
    /// cashiers learned the old behaviour.
    Compounding,
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart, one per variant.
///
/// ## Design Notes
/// - `variant`: frozen snapshot taken on the first add. Later adds do not
///   refresh it.
/// - `final_price`: the negotiated wholesale price; `original_price` keeps
///   the list price so the discount percent can be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub variant_id: i64,
    pub variant: ProductVariant,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount_rate: DiscountRate,
    pub discount_amount: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub total: Money,
    /// Number of packs the trader entered.
    pub pack_qty: i64,
    /// Base units in one pack (1 for loose items).
    pub units_per_pack: i64,
    pub final_price: Option<Money>,
    pub original_price: Option<Money>,
}

impl CartItem {
    /// Creates a line from a variant with initial totals.
    pub fn from_variant(variant: &ProductVariant, quantity: i64) -> Self {
        let mut item = CartItem {
            variant_id: variant.id,
            variant: variant.clone(),
            quantity,
            unit_price: variant.price,
            discount_rate: DiscountRate::zero(),
            discount_amount: Money::zero(),
            tax_rate: variant.tax_rate(),
            tax_amount: Money::zero(),
            total: Money::zero(),
            pack_qty: 1,
            units_per_pack: 1,
            final_price: Some(variant.price),
            original_price: Some(variant.price),
        };
        item.recompute();
        item
    }

    /// The price this line is charged at.
    #[inline]
    pub fn price_used(&self) -> Money {
        self.final_price.unwrap_or(self.unit_price)
    }

    /// Price × quantity, before discount and tax.
    pub fn line_subtotal(&self) -> Money {
        self.price_used().multiply_quantity(self.quantity)
    }

    /// Recomputes discount, tax and total from price, quantity and rates.
    ///
    /// ## Rules
    /// ```text
    /// subtotal = price_used × qty
    /// discount = subtotal × rate        if rate > 0
    ///          = stored discount_amount otherwise (capped at subtotal)
    /// after    = subtotal − discount
    /// tax      = after × tax_rate
    /// total    = after + tax
    /// ```
    pub fn recompute(&mut self) {
        let subtotal = self.line_subtotal();
        let discount = if self.discount_rate.is_zero() {
            self.discount_amount.min(subtotal).max(Money::zero())
        } else {
            subtotal.discount_portion(self.discount_rate)
        };
        let after_discount = subtotal - discount;

        self.discount_amount = discount;
        self.tax_amount = after_discount.calculate_tax(self.tax_rate);
        self.total = after_discount + self.tax_amount;
    }

    fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;
        self.quantity = quantity;
        self.recompute();
        Ok(())
    }
}

/// A partial line edit. `None` fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItemUpdate {
    pub quantity: Option<i64>,
    pub discount_rate: Option<DiscountRate>,
    pub discount_amount: Option<Money>,
    pub final_price: Option<Money>,
    pub tax_rate: Option<TaxRate>,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - At most one line per `variant_id` (adding again increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
/// - Lines keep insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    items: Vec<CartItem>,
    pack_mode: PackQuantityMode,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn with_pack_mode(pack_mode: PackQuantityMode) -> Self {
        Cart {
            items: Vec::new(),
            pack_mode,
        }
    }

    pub fn pack_mode(&self) -> PackQuantityMode {
        self.pack_mode
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, variant_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.variant_id == variant_id)
    }

    fn get_mut(&mut self, variant_id: i64) -> CoreResult<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|i| i.variant_id == variant_id)
            .ok_or(CoreError::ItemNotInCart(variant_id))
    }

    /// Adds a variant or increases the quantity of its existing line.
    ///
    /// ## Behavior
    /// - Existing line: quantity += `quantity`, totals recomputed
    /// - New line: price, final price and original price all start at the
    ///   variant's price; tax rate comes from the parent product
    ///
    /// ## Errors
    /// - `Validation` for a non-positive quantity or a full cart
    /// - `QuantityTooLarge` when the line would exceed the maximum
    pub fn add_to_cart(&mut self, variant: &ProductVariant, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        validate_price_cents(variant.price.cents())?;

        if let Ok(item) = self.get_mut(variant.id) {
            let new_qty = item.quantity + quantity;
            return item.set_quantity(new_qty);
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: crate::MAX_CART_ITEMS,
        })?;
        self.items.push(CartItem::from_variant(variant, quantity));
        Ok(())
    }

    /// Adds one pack of `units_per_pack` base units.
    ///
    /// The line remembers the pack size so a later `update_pack_quantity`
    /// in absolute mode can turn a pack count back into units.
    pub fn add_pack(&mut self, variant: &ProductVariant, units_per_pack: i64) -> CoreResult<()> {
        validate_quantity(units_per_pack)?;
        self.add_to_cart(variant, units_per_pack)?;

        let item = self.get_mut(variant.id)?;
        item.units_per_pack = units_per_pack;
        item.pack_qty = (item.quantity / units_per_pack).max(1);
        Ok(())
    }

    /// Merges a partial update into a line and recomputes it.
    ///
    /// Setting `discount_rate` to zero without an explicit
    /// `discount_amount` clears the discount, rather than leaving the amount
    /// computed from the previous rate behind.
    pub fn update_cart_item(&mut self, variant_id: i64, update: CartItemUpdate) -> CoreResult<()> {
        if let Some(qty) = update.quantity {
            validate_quantity(qty)?;
        }
        if let Some(rate) = update.discount_rate {
            validate_rate_bps("discount_rate", rate.bps())?;
        }
        if let Some(rate) = update.tax_rate {
            validate_rate_bps("tax_rate", rate.bps())?;
        }
        if let Some(amount) = update.discount_amount {
            validate_price_cents(amount.cents())?;
        }
        if let Some(price) = update.final_price {
            validate_price_cents(price.cents())?;
        }

        let item = self.get_mut(variant_id)?;

        if let Some(qty) = update.quantity {
            item.quantity = qty;
        }
        if let Some(rate) = update.discount_rate {
            item.discount_rate = rate;
            if rate.is_zero() && update.discount_amount.is_none() {
                item.discount_amount = Money::zero();
            }
        }
        if let Some(amount) = update.discount_amount {
            item.discount_amount = amount;
        }
        if let Some(price) = update.final_price {
            item.final_price = Some(price);
        }
        if let Some(rate) = update.tax_rate {
            item.tax_rate = rate;
        }

        item.recompute();
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_from_cart(&mut self, variant_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.variant_id != variant_id);
        self.items.len() != before
    }

    pub fn increment_quantity(&mut self, variant_id: i64) -> CoreResult<()> {
        let item = self.get_mut(variant_id)?;
        let new_qty = item.quantity + 1;
        item.set_quantity(new_qty)
    }

    /// Decreases a line by one; a line at quantity 1 is removed.
    pub fn decrement_quantity(&mut self, variant_id: i64) -> CoreResult<()> {
        let item = self.get_mut(variant_id)?;
        if item.quantity <= 1 {
            self.remove_from_cart(variant_id);
            return Ok(());
        }
        let new_qty = item.quantity - 1;
        item.set_quantity(new_qty)
    }

    /// Sets a negotiated price. `original_price` is never touched so the
    /// reduction stays visible.
    pub fn update_wholesale_price(&mut self, variant_id: i64, price: Money) -> CoreResult<()> {
        validate_price_cents(price.cents())?;
        let item = self.get_mut(variant_id)?;
        item.final_price = Some(price);
        item.unit_price = price;
        item.recompute();
        Ok(())
    }

    /// Sets the pack count and derives the unit quantity per [`PackQuantityMode`].
    pub fn update_pack_quantity(&mut self, variant_id: i64, pack_qty: i64) -> CoreResult<()> {
        validate_pack_quantity(pack_qty)?;
        let mode = self.pack_mode;
        let item = self.get_mut(variant_id)?;

        let multiplier = match mode {
            PackQuantityMode::Absolute => item.units_per_pack,
            PackQuantityMode::Compounding => item.pack_qty.max(1),
        };
        let quantity = pack_qty.saturating_mul(multiplier);

        item.set_quantity(quantity)?;
        item.pack_qty = pack_qty;
        Ok(())
    }

    /// Empties the cart. The pack mode is session configuration and stays.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
