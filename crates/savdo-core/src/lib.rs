//! # savdo-core: Pure Business Logic for Savdo POS
//!
//! This crate is the **heart** of the Savdo storefront client. It holds the
//! cart state machine and the scan/voice input pipeline as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Savdo POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 savdo-terminal (keyboard wedge)                 │   │
//! │  │    keystrokes ──► scan ──► cart ──► totals ──► checkout         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ savdo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │ scanner  │ │smart_scan│ │  voice   │ │ catalog  │         │   │
//! │  │   │ keys→scan│ │ packs    │ │ "5 ta..."│ │ SKU match│         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │   cart   │ │ pricing  │ │   view   │ │ checkout │         │   │
//! │  │   │ CartItem │ │ totals   │ │ per type │ │ request  │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 savdo-client (REST backend)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ProductVariant, Customer, BusinessType, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - The cart aggregate
//! - [`pricing`] - Derived totals, service charge, discount percent
//! - [`scanner`] - Keyboard-wedge barcode detector
//! - [`smart_scan`] - Label payloads and pack detection
//! - [`catalog`] - SKU and barcode matching over a variant list
//! - [`voice`] - Spoken command parsing
//! - [`view`] - Checkout view per business type
//! - [`checkout`] - Pre-submit validation and request building
//! - [`label`] / [`receipt`] - Printable payloads
//!
//! ## Example Usage
//!
//! ```rust
//! use savdo_core::cart::Cart;
//! use savdo_core::pricing::CartTotals;
//! use savdo_core::types::BusinessType;
//! # use savdo_core::{Money, ProductVariant, VariantAttributes};
//! # let coffee = ProductVariant {
//! #     id: 7, product_id: 1, sku: "LATTE".into(),
//! #     price: Money::from_major(20), cost_price: Money::from_major(8),
//! #     stock_quantity: 50, attributes: VariantAttributes::default(),
//! #     barcode_aliases: vec![], product: None,
//! # };
//!
//! let mut cart = Cart::new();
//! cart.add_to_cart(&coffee, 2).unwrap();
//!
//! let totals = CartTotals::compute(&cart, Some(BusinessType::Cafe));
//! // 2 × 20.00 plus the 10% service charge
//! assert_eq!(totals.total, Money::from_major(44));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod label;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod scanner;
pub mod smart_scan;
pub mod types;
pub mod validation;
pub mod view;
pub mod voice;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartItemUpdate, PackQuantityMode};
pub use error::{CheckoutError, CoreError, CoreResult, ValidationError, ViewError, VoiceError};
pub use money::Money;
pub use pricing::CartTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Wholesale lines are counted in base units, so a few dozen packs of 24
/// already run into the hundreds. The cap still catches a stuck key.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Maximum unit price, in minor units (10 billion major units).
///
/// A full cart of [`MAX_CART_ITEMS`] lines at this price and
/// [`MAX_ITEM_QUANTITY`] each, taxed and service-charged, stays inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;

/// Hospitality service charge, in basis points (10%).
pub const SERVICE_CHARGE_BPS: u32 = 1_000;
